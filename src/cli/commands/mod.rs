pub mod commit;
pub mod finish;
pub mod release;
pub mod retag;
pub mod sync;

use crate::error::CliError;
use crate::input::confirmer;
use crate::logger;

/// Asks before mutating unless `assume_yes`. Logs the abort on decline.
pub(crate) fn proceed(assume_yes: bool, prompt: &str) -> Result<bool, CliError> {
    let confirmed = confirmer(assume_yes).confirm(prompt)?;
    if !confirmed {
        logger::info("Aborted, no changes were made");
    }
    Ok(confirmed)
}
