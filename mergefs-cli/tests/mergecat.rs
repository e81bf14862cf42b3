//! Integration tests for `mergecat` configuration layering and output.
//!
//! Each test runs inside a `figment::Jail`, which provides a scratch working
//! directory and isolates `MERGECAT_*` environment variables.
use anyhow::{Result, anyhow, ensure};
use camino::Utf8PathBuf;
use clap::Parser;
use mergecat::cli::Args;
use mergecat::config::MergecatConfig;
use mergecat::error::CliError;
use rstest::rstest;
use test_helpers::figment::{figment_error, with_jail, write_files};

const BASE: &str = "name: base\nport: 80\nlog:\n  level: info\n";
const OVERRIDE: &str = r#"{"port": 8080, "log": {"format": "json"}}"#;
const MERGED: &str = "log:\n  format: json\n  level: info\nname: base\nport: 8080\n";

fn args(argv: &[&str]) -> figment::error::Result<Args> {
    Args::try_parse_from(std::iter::once("mergecat").chain(argv.iter().copied()))
        .map_err(figment_error)
}

fn run(argv: &[&str]) -> figment::error::Result<String> {
    let mut out = Vec::new();
    mergecat::run(&args(argv)?, &mut out).map_err(figment_error)?;
    String::from_utf8(out).map_err(figment_error)
}

#[rstest]
fn merges_relative_sources_from_working_directory() -> Result<()> {
    let out = with_jail(|j| {
        write_files(j, &[("base.yaml", BASE), ("override.json", OVERRIDE)])?;
        run(&["override.json|base.yaml"])
    })?;
    ensure!(out == MERGED, "unexpected output:\n{out}");
    Ok(())
}

#[rstest]
fn config_file_aliases_resolve() -> Result<()> {
    let out = with_jail(|j| {
        write_files(
            j,
            &[
                ("conf/base.yaml", BASE),
                ("conf/override.data", OVERRIDE),
                (
                    "mergecat.toml",
                    concat!(
                        "root = \"conf\"\n",
                        "[aliases]\n",
                        "base = { url = \"base.yaml\" }\n",
                        "over = { url = \"override.data\", type = \"application/json\" }\n",
                    ),
                ),
            ],
        )?;
        run(&["over|base"])
    })?;
    ensure!(out == MERGED, "unexpected output:\n{out}");
    Ok(())
}

#[rstest]
#[case::config_only(None, None, "from-config")]
#[case::env_beats_config(Some("from-env"), None, "from-env")]
#[case::cli_beats_env(Some("from-env"), Some("from-cli"), "from-cli")]
fn root_follows_layer_precedence(
    #[case] env_root: Option<&str>,
    #[case] cli_root: Option<&str>,
    #[case] expected: &str,
) -> Result<()> {
    let config = with_jail(|j| {
        j.create_file("mergecat.toml", "root = \"from-config\"\n")?;
        if let Some(root) = env_root {
            j.set_env("MERGECAT_ROOT", root);
        }
        let mut argv = vec!["a|b"];
        if let Some(root) = cli_root {
            argv.extend(["--root", root]);
        }
        MergecatConfig::load(&args(&argv)?).map_err(figment_error)
    })?;
    ensure!(config.root == Utf8PathBuf::from(expected), "root was {}", config.root);
    Ok(())
}

#[rstest]
fn alias_flags_override_configured_aliases() -> Result<()> {
    let out = with_jail(|j| {
        write_files(
            j,
            &[
                ("base.yaml", BASE),
                ("override.json", OVERRIDE),
                ("other.json", r#"{"name": "other"}"#),
                ("mergecat.toml", "[aliases]\nover = { url = \"override.json\" }\n"),
            ],
        )?;
        run(&["--alias", "over=other.json", "over|base.yaml"])
    })?;
    ensure!(
        out == "log:\n  level: info\nname: other\nport: 80\n",
        "unexpected output:\n{out}"
    );
    Ok(())
}

#[rstest]
fn file_scheme_is_served_from_file_root() -> Result<()> {
    let out = with_jail(|j| {
        write_files(j, &[("srv/base.yaml", BASE), ("override.json", OVERRIDE)])?;
        let root = j.directory().join("srv");
        j.set_env("MERGECAT_FILE_ROOT", root.display());
        run(&["override.json|file:///base.yaml"])
    })?;
    ensure!(out == MERGED, "unexpected output:\n{out}");
    Ok(())
}

#[rstest]
fn output_flag_writes_a_file() -> Result<()> {
    let (stdout, written) = with_jail(|j| {
        write_files(j, &[("base.yaml", BASE), ("override.json", OVERRIDE)])?;
        j.create_dir("out")?;
        let stdout = run(&["-o", "out/merged.yaml", "override.json|base.yaml"])?;
        let written = std::fs::read_to_string(j.directory().join("out/merged.yaml"))
            .map_err(figment_error)?;
        Ok((stdout, written))
    })?;
    ensure!(stdout.is_empty(), "stdout should be empty when --output is set");
    ensure!(written == MERGED, "unexpected file contents:\n{written}");
    Ok(())
}

#[rstest]
fn missing_explicit_config_is_an_error() -> Result<()> {
    let err = with_jail(|_| {
        Ok(MergecatConfig::load(&args(&["--config", "absent.toml", "a|b"])?).err())
    })?
    .ok_or_else(|| anyhow!("missing config should fail"))?;
    ensure!(matches!(err, CliError::MissingConfig(_)), "unexpected error: {err}");
    Ok(())
}

#[rstest]
#[case::single_source("base.yaml", "need at least 2 datasources")]
#[case::missing_source("base.yaml|absent.json", "absent.json")]
#[case::unknown_scheme("base.yaml|s3://bucket/key.json", "no filesystem registered for scheme \"s3\"")]
fn merge_failures_surface_as_errors(#[case] path: &str, #[case] expected: &str) -> Result<()> {
    let err = with_jail(|j| {
        j.create_file("base.yaml", BASE)?;
        let mut out = Vec::new();
        Ok(mergecat::run(&args(&[path])?, &mut out).err())
    })?
    .ok_or_else(|| anyhow!("{path} should fail"))?;
    ensure!(matches!(err, CliError::Merge(_)), "unexpected error variant: {err:?}");
    ensure!(err.to_string().contains(expected), "unexpected error: {err}");
    Ok(())
}
