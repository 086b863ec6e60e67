pub mod commands;

use self::commands::{commit, finish, release, retag, sync};
use crate::config::{load_settings, Settings};
use crate::error::CliError;
use crate::git::GitRepo;
use crate::input::SpecFields;
use std::env;
use std::path::PathBuf;
use structopt::StructOpt;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
}

/// The repository a command acts on and its settings.
pub struct Context {
    pub repo: GitRepo,
    pub settings: Settings,
}

impl Context {
    pub fn load(global: &GlobalOptions) -> Result<Self, CliError> {
        let repo = GitRepo::discover(env::current_dir()?)?;
        let settings = load_settings(global.config.as_deref(), repo.root())?;
        log::debug!("Settings: {:?}", settings);
        Ok(Context { repo, settings })
    }
}

pub trait Command {
    fn execute(&self, global: &GlobalOptions) -> Result<(), CliError>;
}

/// Structured commit-spec flags, mutually exclusive with a positional spec.
#[derive(Debug, StructOpt, Default, Clone)]
pub struct SpecArgs {
    #[structopt(short = "t", long = "type", help = "Commit type (feat, fix, refactor, chore, docs, test, style, perf)")]
    pub commit_type: Option<String>,

    #[structopt(short, long, help = "Commit scope")]
    pub scope: Option<String>,

    #[structopt(short, long, help = "Description; separate several with '|'")]
    pub description: Option<String>,

    #[structopt(short, long, help = "Commit body")]
    pub body: Option<String>,
}

impl SpecArgs {
    pub fn fields(&self) -> SpecFields {
        SpecFields {
            commit_type: self.commit_type.clone(),
            scope: self.scope.clone(),
            description: self.description.clone(),
            body: self.body.clone(),
        }
    }
}

#[derive(StructOpt)]
pub enum CliCommand {
    #[structopt(about = "Commit and push changes grouped by directory")]
    Commit(commit::CommitCommand),
    #[structopt(about = "Merge the staging branch into the current feature branch")]
    Sync(sync::SyncCommand),
    #[structopt(about = "Sync, then merge the feature branch into staging and delete it")]
    Finish(finish::FinishCommand),
    #[structopt(about = "Merge staging into the release branch and tag the release")]
    Release(release::ReleaseCommand),
    #[structopt(about = "Rebuild v0.0.N tags from release commits on the release branch")]
    Retag(retag::RetagCommand),
}

impl CliCommand {
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        match self {
            CliCommand::Commit(cmd) => cmd.execute(global),
            CliCommand::Sync(cmd) => cmd.execute(global),
            CliCommand::Finish(cmd) => cmd.execute(global),
            CliCommand::Release(cmd) => cmd.execute(global),
            CliCommand::Retag(cmd) => cmd.execute(global),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_flags_parse() {
        let args = SpecArgs::from_iter_safe(["spec", "-t", "feat", "-s", "dag", "-d", "A|B", "-b", "why"])
            .unwrap();
        let fields = args.fields();
        assert_eq!(fields.commit_type.as_deref(), Some("feat"));
        assert_eq!(fields.scope.as_deref(), Some("dag"));
        assert_eq!(fields.description.as_deref(), Some("A|B"));
        assert_eq!(fields.body.as_deref(), Some("why"));
    }

    #[test]
    fn test_no_flags_is_empty() {
        let args = SpecArgs::from_iter_safe(["spec"]).unwrap();
        assert!(args.fields().is_empty());
    }
}
