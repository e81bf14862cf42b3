//! YAML decoding backed by `serde-saphyr`.

use serde_saphyr::Options;

use crate::{Document, MergeError, document::Mapping, document::Scalar};

use super::mime::YAML;

/// Parse YAML using strict boolean semantics so `yes` and `on` stay strings.
///
/// A stream with no content, or whose only document is null, decodes to an
/// empty mapping.
pub(super) fn decode_yaml(data: &str) -> Result<Document, MergeError> {
    if !has_content(data) {
        return Ok(Document::Map(Mapping::new()));
    }
    let doc: Document = serde_saphyr::from_str_with_options(
        data,
        Options {
            strict_booleans: true,
            ..Options::default()
        },
    )
    .map_err(|err| MergeError::decode(YAML, err.to_string()))?;
    match doc {
        Document::Scalar(Scalar::Null) => Ok(Document::Map(Mapping::new())),
        other => Ok(other),
    }
}

/// True when some line is more than blank space, a comment, a directive or
/// a document marker.
fn has_content(data: &str) -> bool {
    data.lines().map(str::trim).any(|line| {
        !(line.is_empty()
            || line.starts_with('#')
            || line.starts_with('%')
            || is_marker(line, "---")
            || is_marker(line, "..."))
    })
}

fn is_marker(line: &str, marker: &str) -> bool {
    line.strip_prefix(marker)
        .is_some_and(|rest| rest.is_empty() || rest.trim_start().starts_with('#'))
}
