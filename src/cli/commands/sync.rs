use super::proceed;
use crate::cli::{Command, Context, GlobalOptions};
use crate::error::CliError;
use crate::git::BranchWorkflow;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct SyncCommand {
    #[structopt(short, long, help = "Skip the confirmation prompt")]
    yes: bool,
}

impl Command for SyncCommand {
    fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let ctx = Context::load(global)?;
        let mut workflow = BranchWorkflow::start(&ctx.repo, &ctx.settings)?;

        let prompt = format!(
            "Merge '{}' into '{}' and push it?",
            ctx.settings.staging_branch,
            workflow.state().branch()
        );
        if !proceed(self.yes, &prompt)? {
            return Ok(());
        }
        workflow.sync()
    }
}
