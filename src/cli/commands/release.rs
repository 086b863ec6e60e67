use super::proceed;
use crate::cli::{Command, Context, GlobalOptions, SpecArgs};
use crate::error::CliError;
use crate::input::parse_release_request;
use crate::logger;
use crate::release::ReleaseManager;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct ReleaseCommand {
    #[structopt(help = "Release spec 'type,scope,description[,body]' or a 'type(scope): title' line")]
    spec: Option<String>,

    #[structopt(flatten)]
    fields: SpecArgs,

    #[structopt(long = "no-tag", help = "Merge without creating a version tag")]
    no_tag: bool,

    #[structopt(short, long, help = "Skip the confirmation prompt")]
    yes: bool,
}

impl Command for ReleaseCommand {
    fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let ctx = Context::load(global)?;
        let request = parse_release_request(
            &self.fields.fields(),
            self.spec.as_deref(),
            &ctx.settings.release_scopes,
        )?;

        let manager = ReleaseManager::new(&ctx.repo, &ctx.settings);
        manager.check_preconditions()?;

        logger::info(&format!("Release title: {}", request.title));
        let prompt = format!(
            "Merge '{}' into '{}'{}?",
            ctx.settings.staging_branch,
            ctx.settings.release_branch,
            if self.no_tag { "" } else { " and tag it" }
        );
        if !proceed(self.yes, &prompt)? {
            return Ok(());
        }

        let outcome = manager.release(&request, !self.no_tag)?;
        logger::success(&format!(
            "Released {} commit(s) at {}{}",
            outcome.released.len(),
            &outcome.merge_commit[..7.min(outcome.merge_commit.len())],
            outcome
                .tag
                .as_deref()
                .map(|t| format!(" as {}", t))
                .unwrap_or_default()
        ));
        Ok(())
    }
}
