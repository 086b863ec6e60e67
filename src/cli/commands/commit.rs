use crate::cli::{Command, Context, GlobalOptions, SpecArgs};
use crate::error::CliError;
use crate::git::CommitOrchestrator;
use crate::input::{confirmer, parse_commit_spec};
use crate::logger;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct CommitCommand {
    #[structopt(help = "Commit spec 'type,scope,description[,body]'")]
    spec: Option<String>,

    #[structopt(flatten)]
    fields: SpecArgs,

    #[structopt(short, long, help = "Commit without asking for confirmation")]
    yes: bool,

    #[structopt(
        long,
        default_value = "text",
        possible_values = &["text", "json"],
        help = "Output format of the summary"
    )]
    output: String,
}

impl Command for CommitCommand {
    fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let ctx = Context::load(global)?;
        let spec = parse_commit_spec(
            &self.fields.fields(),
            self.spec.as_deref(),
            &ctx.settings.commit_scopes,
        )?;
        log::debug!("Parsed commit spec: {:?}", spec);

        let confirm = confirmer(self.yes);
        let orchestrator = CommitOrchestrator::new(&ctx.repo, confirm.as_ref(), ctx.settings.remote.as_str());
        let outcomes = orchestrator.run(&spec)?;

        if self.output == "json" {
            let json = serde_json::to_string_pretty(&outcomes)
                .map_err(|e| CliError::Generic(format!("Failed to serialize summary: {}", e)))?;
            println!("{}", json);
        } else if !outcomes.is_empty() {
            logger::info(&format!("{} group(s) committed:", outcomes.len()));
            for outcome in &outcomes {
                let subject = outcome.message.lines().next().unwrap_or_default();
                logger::info(&format!("  [{}] {}", outcome.group, subject));
            }
        }
        Ok(())
    }
}
