use super::validation::is_affirmative;
use crate::error::CliError;
use inquire::Text;

/// Blocking yes/no gate in front of mutating steps.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Result<bool, CliError>;
}

/// Asks on the terminal. Anything other than an affirmative answer declines.
pub struct InteractiveConfirm;

impl Confirm for InteractiveConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool, CliError> {
        let answer = Text::new(&format!("{} (y/N)", prompt))
            .prompt()
            .map_err(|e| CliError::InputError(e.to_string()))?;
        Ok(is_affirmative(&answer))
    }
}

/// Used for `--yes` and in automated contexts.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, prompt: &str) -> Result<bool, CliError> {
        log::debug!("Auto-confirming: {}", prompt);
        Ok(true)
    }
}

pub fn confirmer(assume_yes: bool) -> Box<dyn Confirm> {
    if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(InteractiveConfirm)
    }
}
