mod branch;
mod commit;
mod group;
mod pipeline;
mod repository;
mod tag;

pub use branch::{BranchState, BranchWorkflow};
pub use commit::{display_scope, format_commit_message, format_subject};
pub use group::{
    group_key, group_paths, plan_commits, preview_lines, CommitOrchestrator, CommitOutcome,
    PlannedCommit,
};
pub use pipeline::{OnFailure, Pipeline, PipelineReport, Step};
pub use repository::{ChangeStatus, FileChange, GitRepo, LogEntry};
pub use tag::{
    classify_releases, compare_versions, ensure_new_tag, latest_version_tag, next_release_tag,
    ReleaseClassifier, ReleaseCommit, TagRebuilder,
};
