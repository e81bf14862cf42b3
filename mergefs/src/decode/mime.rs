//! Content-type constants and extension-based inference.

use camino::Utf8Path;

/// JSON documents.
pub const JSON: &str = "application/json";
/// JSON documents whose top level is an array.
pub const JSON_ARRAY: &str = "application/array+json";
/// YAML documents.
pub const YAML: &str = "application/yaml";
/// TOML documents.
pub const TOML: &str = "application/toml";
/// Comma-separated values.
pub const CSV: &str = "text/csv";
/// Plain text.
pub const TEXT: &str = "text/plain";
/// dotenv-style key/value files.
pub const ENV: &str = "application/x-env";
/// XML documents.
pub const XML: &str = "application/xml";

const EXTENSIONS: &[(&str, &str)] = &[
    ("csv", CSV),
    ("env", ENV),
    ("json", JSON),
    ("toml", TOML),
    ("txt", TEXT),
    ("xml", XML),
    ("yaml", YAML),
    ("yml", YAML),
];

/// Infer a content type from the extension of `path`.
///
/// Matching is case-insensitive. Returns `None` for unknown or missing
/// extensions.
///
/// ```
/// use mergefs::decode::mime::type_by_extension;
///
/// assert_eq!(type_by_extension("conf/app.YML"), Some("application/yaml"));
/// assert_eq!(type_by_extension("README"), None);
/// ```
#[must_use]
pub fn type_by_extension(path: &str) -> Option<&'static str> {
    let ext = Utf8Path::new(path).extension()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, content_type)| *content_type)
}

/// Strip parameters and normalise case, mapping YAML aliases to [`YAML`].
///
/// ```
/// use mergefs::decode::mime::essence;
///
/// assert_eq!(essence("Application/JSON; charset=utf-8"), "application/json");
/// assert_eq!(essence("text/x-yaml"), "application/yaml");
/// ```
#[must_use]
pub fn essence(content_type: &str) -> String {
    let base = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match base.as_str() {
        "application/x-yaml" | "text/yaml" | "text/x-yaml" => YAML.to_owned(),
        _ => base,
    }
}
