//! Datasources and aliases shared by merge filesystem tests.

use mergefs::{Alias, AliasRegistry, MemoryBackend, MergeResult};

/// JSON source, stored at `tmp/jsonfile.json`.
pub const JSON_SOURCE: &str = r#"{"hello": "world"}"#;

/// YAML source, stored at `tmp/yamlfile.yaml`.
pub const YAML_SOURCE: &str = "hello: earth\ngoodnight: moon\n";

/// Merge of [`JSON_SOURCE`] over [`YAML_SOURCE`].
pub const JSON_OVER_YAML: &str = "goodnight: moon\nhello: world\n";

/// Backend holding the JSON, YAML, text and array sources under `tmp/`.
#[must_use]
pub fn datasources() -> MemoryBackend {
    MemoryBackend::new()
        .with_file("tmp/jsonfile.json", JSON_SOURCE)
        .with_file("tmp/yamlfile.yaml", YAML_SOURCE)
        .with_file("tmp/textfile.txt", "some text")
        .with_file("tmp/array.json", "[1, 2, 3]")
}

/// Aliases covering the common resolution paths.
///
/// - `bar` and `baz` name the JSON and YAML sources;
/// - `foo` is a nested merge of the two;
/// - `badscheme` uses a scheme nothing serves;
/// - `badtype` forces an unsupported content type;
/// - `array` decodes to a list.
///
/// # Errors
///
/// Returns an error if an alias address fails to parse.
pub fn aliases() -> MergeResult<AliasRegistry> {
    let mut registry = AliasRegistry::new();
    for (name, address) in [
        ("foo", "merge:file:///tmp/jsonfile.json|file:///tmp/yamlfile.yaml"),
        ("bar", "file:///tmp/jsonfile.json"),
        ("baz", "file:///tmp/yamlfile.yaml"),
        ("badscheme", "bad:///scheme.json"),
        ("badtype", "file:///tmp/textfile.txt?type=foo/bar"),
        ("array", "file:///tmp/array.json?type=application%2Farray%2Bjson"),
    ] {
        registry.register(name, Alias::parse(address)?);
    }
    Ok(registry)
}
