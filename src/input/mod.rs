pub mod prompts;
pub mod spec;
pub mod validation;

pub use prompts::{confirmer, AssumeYes, Confirm, InteractiveConfirm};
pub use spec::{
    parse_commit_spec, parse_release_request, CommitSpec, CommitType, ReleaseRequest, SpecFields,
};
