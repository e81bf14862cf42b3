//! Generic structured documents produced by the decoders.

use std::collections::BTreeMap;

/// Mapping type used by [`Document::Map`]; iteration is ordered by key.
pub type Mapping = BTreeMap<String, Document>;

/// A leaf value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer wide enough for every signed and unsigned 64-bit value.
    Integer(i128),
    /// Floating-point number.
    Float(f64),
    /// Text.
    String(String),
}

/// A decoded structured document.
#[derive(Clone, Debug, PartialEq)]
pub enum Document {
    /// A leaf value.
    Scalar(Scalar),
    /// An ordered sequence.
    List(Vec<Document>),
    /// A string-keyed mapping.
    Map(Mapping),
}

impl Document {
    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Borrow the mapping if this is a [`Document::Map`].
    #[must_use]
    pub const fn as_map(&self) -> Option<&Mapping> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Convenience constructor for a string scalar.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }
}

impl From<Scalar> for Document {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<Mapping> for Document {
    fn from(value: Mapping) -> Self {
        Self::Map(value)
    }
}

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(number_scalar(&n)),
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

fn number_scalar(n: &serde_json::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Integer(i128::from(i))
    } else if let Some(u) = n.as_u64() {
        Scalar::Integer(i128::from(u))
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

#[cfg(feature = "toml")]
impl From<toml::Value> for Document {
    fn from(value: toml::Value) -> Self {
        use toml::Value;
        match value {
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Integer(i) => Self::Scalar(Scalar::Integer(i128::from(i))),
            Value::Float(f) => Self::Scalar(Scalar::Float(f)),
            Value::Boolean(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Datetime(dt) => Self::Scalar(Scalar::String(dt.to_string())),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Table(table) => Self::from(table),
        }
    }
}

#[cfg(feature = "toml")]
impl From<toml::Table> for Document {
    fn from(table: toml::Table) -> Self {
        Self::Map(
            table
                .into_iter()
                .map(|(key, value)| (key, Self::from(value)))
                .collect(),
        )
    }
}

/// Deserialises any self-describing format straight into a [`Document`].
///
/// Non-finite floats survive, unlike a round trip through
/// `serde_json::Value`.
impl<'de> serde::Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> serde::de::Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a structured document")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Document, E> {
        Ok(Document::Scalar(Scalar::Bool(v)))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Document, E> {
        Ok(Document::Scalar(Scalar::Integer(i128::from(v))))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Document, E> {
        Ok(Document::Scalar(Scalar::Integer(i128::from(v))))
    }

    fn visit_i128<E>(self, v: i128) -> Result<Document, E> {
        Ok(Document::Scalar(Scalar::Integer(v)))
    }

    fn visit_u128<E: serde::de::Error>(self, v: u128) -> Result<Document, E> {
        i128::try_from(v)
            .map(|i| Document::Scalar(Scalar::Integer(i)))
            .map_err(|_| E::custom(format!("integer {v} is out of range")))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Document, E> {
        Ok(Document::Scalar(Scalar::Float(v)))
    }

    fn visit_str<E>(self, v: &str) -> Result<Document, E> {
        Ok(Document::string(v))
    }

    fn visit_string<E>(self, v: String) -> Result<Document, E> {
        Ok(Document::string(v))
    }

    fn visit_unit<E>(self) -> Result<Document, E> {
        Ok(Document::Scalar(Scalar::Null))
    }

    fn visit_none<E>(self) -> Result<Document, E> {
        Ok(Document::Scalar(Scalar::Null))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Document, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde::Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Document, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Document::List(items))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Document, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = Mapping::new();
        while let Some((key, value)) = access.next_entry::<String, Document>()? {
            map.insert(key, value);
        }
        Ok(Document::Map(map))
    }
}

/// Build a [`Document`] from a JSON literal.
///
/// Primarily useful in tests and examples.
///
/// ```
/// use mergefs::{Document, doc};
///
/// let d = doc!({"a": {"b": 1}});
/// assert_eq!(d.kind(), "map");
/// ```
#[macro_export]
macro_rules! doc {
    ($($json:tt)+) => {
        $crate::Document::from($crate::__private::serde_json::json!($($json)+))
    };
}
