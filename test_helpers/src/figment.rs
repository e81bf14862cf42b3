//! Helpers for running configuration tests inside a [`figment::Jail`].
//!
//! A jail gives each test a scratch working directory and isolates the
//! environment variables it sets, so `mergecat.toml` discovery and
//! `MERGECAT_*` overrides can be exercised without touching the real process
//! state.

use std::path::Path;

use anyhow::{Result, anyhow};

/// Executes `f` inside a [`figment::Jail`], returning the closure's output.
///
/// # Errors
///
/// Returns an error if the jail cannot be created or the closure fails.
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|j| {
        output = Some(f(j)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Writes each `(name, contents)` pair into the jail directory, creating
/// parent directories as needed.
///
/// # Errors
///
/// Returns the first directory or file creation failure.
pub fn write_files(jail: &figment::Jail, files: &[(&str, &str)]) -> figment::error::Result<()> {
    for (name, contents) in files {
        if let Some(parent) = Path::new(name).parent()
            && !parent.as_os_str().is_empty()
        {
            jail.create_dir(parent)?;
        }
        jail.create_file(name, contents)?;
    }
    Ok(())
}

/// Converts any displayable error into a [`figment::Error`] so jail closures
/// can use `?` on non-figment results.
#[expect(
    clippy::needless_pass_by_value,
    reason = "used as a map_err adapter, which passes errors by value"
)]
pub fn figment_error<E: ToString>(err: E) -> figment::Error {
    figment::Error::from(err.to_string())
}
