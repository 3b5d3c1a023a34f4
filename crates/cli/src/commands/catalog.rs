//! Catalog file validation.

use std::path::Path;

use webmcp_tools::{CatalogError, CatalogSeed};

use super::CliError;

/// Parse and validate a catalog file, printing every problem found.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or fails
/// validation.
pub fn check(path: &Path) -> Result<(), CliError> {
    let seed = CatalogSeed::from_path(path)?;
    let problems = seed.validate();

    if problems.is_empty() {
        println!(
            "{}: {} categories, {} products, currency {}",
            path.display(),
            seed.categories.len(),
            seed.products.len(),
            seed.currency.code()
        );
        return Ok(());
    }

    for problem in &problems {
        println!("{}: {problem}", path.display());
    }
    Err(CatalogError::Invalid(problems).into())
}
