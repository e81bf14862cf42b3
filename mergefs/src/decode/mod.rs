//! Content-type driven decoding of source bytes into [`Document`]s.
//!
//! Supported formats are JSON, YAML and TOML. The `yaml` and `toml` features
//! must be enabled for those formats to be decoded.

pub mod mime;
#[cfg(feature = "yaml")]
mod yaml;

use crate::{Document, MergeError};

/// Decode `data` according to `content_type`.
///
/// Parameters on the content type (`; charset=...`) are ignored. Decoding
/// does not check the shape of the result: a JSON array decodes to a
/// [`Document::List`] and is only rejected if it is later merged.
///
/// # Errors
///
/// Returns [`MergeError::UnsupportedType`] for unknown content types or
/// formats whose feature is disabled, and [`MergeError::Decode`] when the data
/// is malformed.
///
/// # Examples
///
/// ```
/// use mergefs::decode::decode;
///
/// let doc = decode(br#"{"hello": "world"}"#, "application/json")?;
/// assert_eq!(doc.kind(), "map");
/// # Ok::<_, mergefs::MergeError>(())
/// ```
pub fn decode(data: &[u8], content_type: &str) -> Result<Document, MergeError> {
    let essence = mime::essence(content_type);
    match essence.as_str() {
        mime::JSON | mime::JSON_ARRAY => decode_json(data),
        mime::YAML => {
            #[cfg(feature = "yaml")]
            {
                yaml::decode_yaml(utf8(data, mime::YAML)?)
            }
            #[cfg(not(feature = "yaml"))]
            {
                Err(feature_disabled(content_type, "yaml"))
            }
        }
        mime::TOML => {
            #[cfg(feature = "toml")]
            {
                decode_toml(utf8(data, mime::TOML)?)
            }
            #[cfg(not(feature = "toml"))]
            {
                Err(feature_disabled(content_type, "toml"))
            }
        }
        _ => Err(MergeError::UnsupportedType {
            content_type: content_type.to_owned(),
        }),
    }
}

fn decode_json(data: &[u8]) -> Result<Document, MergeError> {
    let value: serde_json::Value = serde_json::from_slice(data)?;
    Ok(Document::from(value))
}

#[cfg(feature = "toml")]
fn decode_toml(data: &str) -> Result<Document, MergeError> {
    let table: toml::Table = toml::from_str(data).map_err(|e| MergeError::decode(mime::TOML, e))?;
    Ok(Document::from(table))
}

#[cfg(any(feature = "yaml", feature = "toml"))]
fn utf8<'a>(data: &'a [u8], content_type: &str) -> Result<&'a str, MergeError> {
    std::str::from_utf8(data).map_err(|e| MergeError::decode(content_type, e))
}

#[cfg(any(not(feature = "yaml"), not(feature = "toml")))]
fn feature_disabled(content_type: &str, feature: &str) -> MergeError {
    MergeError::UnsupportedType {
        content_type: format!("{content_type} (enable the '{feature}' feature)"),
    }
}

#[cfg(all(test, feature = "yaml", feature = "toml"))]
mod tests {
    use super::*;
    use crate::{doc, document::Scalar};
    use rstest::rstest;

    #[rstest]
    #[case(br#"{"one": false, "two": 2}"#.as_slice(), mime::JSON)]
    #[case(b"one: false\ntwo: 2\n".as_slice(), mime::YAML)]
    #[case(b"one: false\ntwo: 2\n".as_slice(), "text/yaml")]
    #[case(b"one = false\ntwo = 2\n".as_slice(), mime::TOML)]
    #[case(br#"{"one": false, "two": 2}"#.as_slice(), "application/json; charset=utf-8")]
    fn decodes_supported_formats(#[case] data: &[u8], #[case] content_type: &str) {
        let doc = decode(data, content_type).expect("data should decode");
        assert_eq!(doc, doc!({"one": false, "two": 2}));
    }

    #[test]
    fn json_arrays_decode_as_lists() {
        let doc = decode(br#"["hello", "world"]"#, mime::JSON_ARRAY).expect("array decodes");
        assert_eq!(doc, doc!(["hello", "world"]));
    }

    #[rstest]
    #[case("foo/bar")]
    #[case("text/plain")]
    #[case("")]
    fn rejects_unsupported_types(#[case] content_type: &str) {
        let err = decode(b"plain text...", content_type).expect_err("type is unsupported");
        assert_eq!(
            err.to_string(),
            format!("data of type {content_type:?} not yet supported")
        );
    }

    #[rstest]
    #[case(b"{".as_slice(), mime::JSON)]
    #[case(b"a = [".as_slice(), mime::TOML)]
    #[case(b"a: [".as_slice(), mime::YAML)]
    fn reports_malformed_data(#[case] data: &[u8], #[case] content_type: &str) {
        let err = decode(data, content_type).expect_err("data is malformed");
        assert!(matches!(err, MergeError::Decode { .. }), "got {err:?}");
    }

    #[test]
    fn yaml_yes_remains_a_string() {
        let doc = decode(b"recipient: yes\n", mime::YAML).expect("yaml decodes");
        let map = doc.as_map().expect("yaml decodes to a map");
        assert_eq!(map.get("recipient"), Some(&Document::string("yes")));
    }

    #[rstest]
    #[case::blank(b"\n".as_slice())]
    #[case::comment_only(b"# nothing here\n".as_slice())]
    #[case::bare_marker(b"---\n".as_slice())]
    #[case::marker_and_end(b"--- # header\n...\n".as_slice())]
    #[case::explicit_null(b"~\n".as_slice())]
    fn contentless_yaml_is_an_empty_map(#[case] data: &[u8]) {
        let doc = decode(data, mime::YAML).expect("contentless yaml decodes");
        assert_eq!(doc, doc!({}));
    }

    #[test]
    fn yaml_non_finite_floats_survive() {
        let doc = decode(b"x: .inf\ny: -.inf\nz: .nan\n", mime::YAML).expect("yaml decodes");
        let map = doc.as_map().expect("yaml decodes to a map");
        assert_eq!(map.get("x"), Some(&Document::Scalar(Scalar::Float(f64::INFINITY))));
        assert_eq!(
            map.get("y"),
            Some(&Document::Scalar(Scalar::Float(f64::NEG_INFINITY)))
        );
        assert!(
            matches!(map.get("z"), Some(Document::Scalar(Scalar::Float(f))) if f.is_nan()),
            "got {:?}",
            map.get("z")
        );
    }

    #[test]
    fn toml_floats_stay_floats() {
        let doc = decode(b"pi = 3.5\n", mime::TOML).expect("toml decodes");
        let map = doc.as_map().expect("toml decodes to a map");
        assert_eq!(map.get("pi"), Some(&Document::Scalar(Scalar::Float(3.5))));
    }
}
