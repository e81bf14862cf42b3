//! Library interface for the `mergecat` command.
//!
//! `mergecat 'override.json|base.yaml'` loads its configuration, builds a
//! [`mergefs::MergeFs`] over local directories, and writes the merged YAML to
//! stdout or to the file named by `--output`.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

use std::io::Write;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::cli::Args;
use crate::config::MergecatConfig;
use crate::error::CliError;

/// Run `mergecat` for `args`, writing to `stdout` unless `--output` is set.
///
/// # Errors
///
/// Returns a [`CliError`] when configuration, the merge, or the write fails.
pub fn run(args: &Args, stdout: &mut impl Write) -> Result<(), CliError> {
    let config = MergecatConfig::load(args)?;
    let fs = config.merge_fs()?;
    tracing::debug!(path = %args.path, aliases = fs.aliases().len(), "merging");
    let merged = fs.read_to_vec(&args.path)?;

    match &args.output {
        Some(path) => write_output(path, &merged),
        None => stdout
            .write_all(&merged)
            .and_then(|()| stdout.flush())
            .map_err(|source| CliError::Io {
                path: "<stdout>".into(),
                source,
            }),
    }
}

/// Write `bytes` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`CliError::Io`] when the parent directory cannot be opened or
/// the file cannot be written.
pub fn write_output(path: &Utf8Path, bytes: &[u8]) -> Result<(), CliError> {
    let io_err = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        io_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "output path has no file name",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_err)?;
    dir.write(file_name, bytes).map_err(io_err)?;
    tracing::debug!(%path, bytes = bytes.len(), "wrote merged document");
    Ok(())
}
