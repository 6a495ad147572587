//! Sanity check of a downloaded profile before the engine gets it.

use crate::error::{Error, Result};

use std::path::Path;
use tokio::fs;

/// Check that the artifact at `path` looks like a profile: non-empty UTF-8 text.
///
/// Parsing the directives is left to the engine.
pub async fn validate_profile(path: &Path) -> Result<()> {
    let bytes = fs::read(path).await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::ConfigParse(format!("{} is empty", path.display())));
    }
    if std::str::from_utf8(&bytes).is_err() {
        return Err(Error::ConfigParse(format!(
            "{} is not a text profile",
            path.display()
        )));
    }
    Ok(())
}
