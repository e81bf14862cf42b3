//! Command-line interface definitions for `mergecat`.

use camino::Utf8PathBuf;
use clap::Parser;

/// Parsed CLI arguments for `mergecat`.
#[derive(Debug, Clone, Parser)]
#[command(name = "mergecat")]
#[command(about = "Print the deep merge of several JSON, YAML or TOML sources")]
#[command(version)]
pub struct Args {
    /// Sources to merge, separated by `|`; earlier sources win.
    #[arg(value_name = "a|b|...")]
    pub path: String,
    /// Configuration file (defaults to `mergecat.toml` when present).
    #[arg(long, value_name = "path")]
    pub config: Option<Utf8PathBuf>,
    /// Directory serving relative source paths.
    #[arg(long, value_name = "dir")]
    pub root: Option<Utf8PathBuf>,
    /// Register an alias (repeatable).
    #[arg(long = "alias", value_name = "name=url", value_parser = parse_alias)]
    pub aliases: Vec<(String, String)>,
    /// Write the merged document here instead of stdout.
    #[arg(long, short, value_name = "path")]
    pub output: Option<Utf8PathBuf>,
}

/// Parse a `name=url` alias flag.
///
/// # Errors
///
/// Returns a message when `=` is missing or either side is empty.
pub fn parse_alias(raw: &str) -> Result<(String, String), String> {
    let Some((name, url)) = raw.split_once('=') else {
        return Err(format!("expected name=url, got '{raw}'"));
    };
    let name = name.trim();
    if name.is_empty() || url.is_empty() {
        return Err(format!("alias name and url must be non-empty in '{raw}'"));
    }
    Ok((name.to_owned(), url.to_owned()))
}
