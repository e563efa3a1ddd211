use anyhow::Result;

use crate::models::version::BuildInfo;

/// Prints build information, as text or pretty JSON.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn show(json: bool) -> Result<()> {
    let info = BuildInfo::current();
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{info}");
    }
    Ok(())
}
