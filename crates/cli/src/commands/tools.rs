//! Operation discovery commands.

use webmcp_tools::commerce_registry;

use super::CliError;

/// Print the registered operations.
///
/// # Errors
///
/// Returns an error if the registry cannot be built or serialized.
pub fn list(json: bool) -> Result<(), CliError> {
    let registry = commerce_registry()?;

    if json {
        println!("{}", serde_json::to_string_pretty(registry.list())?);
        return Ok(());
    }

    for op in registry.list() {
        let marker = if op.requires_confirmation { " (confirm)" } else { "" };
        println!("{:<22}{}{marker}", op.name, op.description);
    }
    Ok(())
}

/// Print one operation's descriptor.
///
/// # Errors
///
/// Returns [`CliError::UnknownOperation`] if no operation has this name.
pub fn describe(name: &str) -> Result<(), CliError> {
    let registry = commerce_registry()?;
    let descriptor = registry
        .describe(name)
        .map_err(|_| CliError::UnknownOperation(name.to_string()))?;

    println!("{}", serde_json::to_string_pretty(descriptor)?);
    Ok(())
}
