use super::proceed;
use crate::cli::{Command, Context, GlobalOptions};
use crate::error::CliError;
use crate::git::{ReleaseClassifier, TagRebuilder};
use crate::logger;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct RetagCommand {
    #[structopt(
        long = "include",
        number_of_values = 1,
        help = "Treat this commit id as a release commit (repeatable)"
    )]
    include: Vec<String>,

    #[structopt(short, long, help = "Skip the confirmation prompt")]
    yes: bool,
}

impl Command for RetagCommand {
    fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let ctx = Context::load(global)?;
        let classifier = ReleaseClassifier::from_settings(&ctx.settings, &self.include)?;
        let rebuilder = TagRebuilder::new(&ctx.repo, &ctx.settings, classifier);
        rebuilder.check_preconditions()?;

        let (local, remote) = rebuilder.obsolete_tags()?;
        logger::warning(&format!(
            "This deletes {} local and {} remote tag(s) and force-pushes new ones to '{}'",
            local.len(),
            remote.len(),
            ctx.settings.remote
        ));
        if !proceed(self.yes, "Rebuild release tags?")? {
            return Ok(());
        }

        for release in rebuilder.rebuild()? {
            logger::info(&format!("{} {}", release.tag(), release.subject));
        }
        Ok(())
    }
}
