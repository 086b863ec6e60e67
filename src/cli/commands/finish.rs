use super::proceed;
use crate::cli::{Command, Context, GlobalOptions};
use crate::error::CliError;
use crate::git::BranchWorkflow;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct FinishCommand {
    #[structopt(short, long, help = "Skip the confirmation prompt")]
    yes: bool,
}

impl Command for FinishCommand {
    fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let ctx = Context::load(global)?;
        let mut workflow = BranchWorkflow::start(&ctx.repo, &ctx.settings)?;
        let branch = workflow.state().branch().to_string();

        let prompt = format!(
            "Sync '{}', merge it into '{}' and delete it?",
            branch, ctx.settings.staging_branch
        );
        if !proceed(self.yes, &prompt)? {
            return Ok(());
        }

        workflow.sync()?;
        workflow.finish()
    }
}
