//! Canonical block-style YAML encoder.
//!
//! Output is deterministic: mapping keys are emitted in ascending order at
//! every level and each nesting level is indented by two spaces. Strings are
//! written plain unless they would read back as a different value, in which
//! case they are double-quoted.

use crate::{Document, document::Mapping, document::Scalar};

const INDENT: usize = 2;

/// Serialise `doc` as block-style YAML.
///
/// # Examples
///
/// ```
/// use mergefs::{doc, encode::encode};
///
/// let out = encode(&doc!({"z": "last", "a": {"b": [1, 2]}}));
/// assert_eq!(out, b"a:\n  b:\n    - 1\n    - 2\nz: last\n");
/// ```
#[must_use]
pub fn encode(doc: &Document) -> Vec<u8> {
    let mut writer = YamlWriter::default();
    writer.document(doc);
    writer.finish().into_bytes()
}

#[derive(Default)]
struct YamlWriter {
    buffer: String,
}

impl YamlWriter {
    fn finish(self) -> String {
        self.buffer
    }

    fn document(&mut self, doc: &Document) {
        match doc {
            Document::Map(map) if !map.is_empty() => self.map_entries(map, 0, false),
            Document::List(items) if !items.is_empty() => self.list_items(items, 0, false),
            other => {
                self.inline(other);
                self.buffer.push('\n');
            }
        }
    }

    fn pad(&mut self, indent: usize) {
        self.buffer.extend(std::iter::repeat_n(' ', indent));
    }

    /// Write mapping entries at `indent`. When `continues_line` is set the
    /// first entry follows a `- ` already on the current line.
    fn map_entries(&mut self, map: &Mapping, indent: usize, continues_line: bool) {
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 || !continues_line {
                self.pad(indent);
            }
            self.string(key);
            self.after_key(value, indent);
        }
    }

    fn list_items(&mut self, items: &[Document], indent: usize, continues_line: bool) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 || !continues_line {
                self.pad(indent);
            }
            self.buffer.push_str("- ");
            self.item(item, indent + INDENT);
        }
    }

    fn after_key(&mut self, value: &Document, indent: usize) {
        match value {
            Document::Map(map) if !map.is_empty() => {
                self.buffer.push_str(":\n");
                self.map_entries(map, indent + INDENT, false);
            }
            Document::List(items) if !items.is_empty() => {
                self.buffer.push_str(":\n");
                self.list_items(items, indent + INDENT, false);
            }
            other => {
                self.buffer.push_str(": ");
                self.inline(other);
                self.buffer.push('\n');
            }
        }
    }

    /// Write a sequence item whose `- ` marker is already on the line.
    fn item(&mut self, item: &Document, indent: usize) {
        match item {
            Document::Map(map) if !map.is_empty() => self.map_entries(map, indent, true),
            Document::List(items) if !items.is_empty() => self.list_items(items, indent, true),
            other => {
                self.inline(other);
                self.buffer.push('\n');
            }
        }
    }

    /// Write a value that fits on one line: a scalar or an empty collection.
    fn inline(&mut self, value: &Document) {
        match value {
            Document::Scalar(scalar) => self.scalar(scalar),
            Document::Map(_) => self.buffer.push_str("{}"),
            Document::List(_) => self.buffer.push_str("[]"),
        }
    }

    fn scalar(&mut self, scalar: &Scalar) {
        match scalar {
            Scalar::Null => self.buffer.push_str("null"),
            Scalar::Bool(b) => self.buffer.push_str(if *b { "true" } else { "false" }),
            Scalar::Integer(i) => self.buffer.push_str(&i.to_string()),
            Scalar::Float(f) => self.buffer.push_str(&format_float(*f)),
            Scalar::String(s) => self.string(s),
        }
    }

    fn string(&mut self, s: &str) {
        if needs_quotes(s) {
            quote_into(s, &mut self.buffer);
        } else {
            self.buffer.push_str(s);
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_owned()
    } else if f.is_infinite() {
        let inf = if f.is_sign_negative() { "-.inf" } else { ".inf" };
        inf.to_owned()
    } else {
        format!("{f:?}")
    }
}

const RESERVED: &[&str] = &[
    "~", "null", "true", "false", "yes", "no", "on", "off", "y", "n",
];

const LEADING_INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
    '`',
];

/// Returns `true` when `s` cannot be written as a plain scalar.
fn needs_quotes(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return true;
    };
    let lower = s.to_ascii_lowercase();
    first.is_whitespace()
        || s.ends_with(char::is_whitespace)
        || LEADING_INDICATORS.contains(&first)
        || RESERVED.contains(&lower.as_str())
        || looks_numeric(&lower)
        || s.contains(": ")
        || s.contains(" #")
        || s.ends_with(':')
        || s.chars().any(|ch| ch.is_control() || ch == '\u{feff}')
}

fn looks_numeric(lower: &str) -> bool {
    let unsigned = lower.trim_start_matches(['-', '+']);
    lower.parse::<f64>().is_ok()
        || matches!(unsigned, ".inf" | ".nan")
        || unsigned.starts_with("0x")
        || unsigned.starts_with("0o")
}

fn quote_into(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() || c == '\u{feff}' => {
                out.push_str(&format!("\\u{:04X}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
