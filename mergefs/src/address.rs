//! Resource addresses and their parsing rules.
//!
//! Addresses take one of three shapes:
//!
//! - `scheme://authority/path?query` for hierarchical sources;
//! - `scheme:opaque` for schemes whose payload is not a path;
//! - a bare relative path, which carries the empty scheme.
//!
//! `merge:` addresses are always opaque so that a nested merge path can hold
//! `|` separators and per-part queries without being split here.

use std::fmt;

use crate::{MergeError, MergeResult};

/// Scheme handled by the merge filesystem itself.
pub const MERGE_SCHEME: &str = "merge";

/// Query parameter overriding content-type inference.
pub const TYPE_PARAM: &str = "type";

/// A parsed resource address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    raw: String,
    scheme: String,
    authority: Option<String>,
    path: String,
    query: Vec<(String, String)>,
}

impl Address {
    /// Parse `input` into an address.
    ///
    /// A leading `./` on a relative path is dropped so that `./a.json` and
    /// `a.json` name the same resource.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::InvalidAddress`] when `input` is empty or the
    /// scheme contains characters outside `[A-Za-z0-9+.-]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mergefs::Address;
    ///
    /// let addr = Address::parse("file:///tmp/data.txt?type=application/json")?;
    /// assert_eq!(addr.scheme(), "file");
    /// assert_eq!(addr.path(), "/tmp/data.txt");
    /// assert_eq!(addr.content_type(), Some("application/json"));
    /// # Ok::<_, std::sync::Arc<mergefs::MergeError>>(())
    /// ```
    pub fn parse(input: &str) -> MergeResult<Self> {
        if input.is_empty() {
            return Err(MergeError::invalid_address(input, "address is empty").into());
        }
        let Some((scheme, rest)) = split_scheme(input) else {
            return Ok(Self::relative(input));
        };
        if !is_valid_scheme(scheme) {
            return Err(MergeError::invalid_address(input, "scheme is malformed").into());
        }
        let scheme = scheme.to_ascii_lowercase();
        if scheme == MERGE_SCHEME {
            let nested = rest.strip_prefix("//").unwrap_or(rest);
            return Ok(Self {
                raw: input.to_owned(),
                scheme,
                authority: None,
                path: nested.to_owned(),
                query: Vec::new(),
            });
        }

        let (before_query, query) = split_query(rest);
        let (authority, path) = match before_query.strip_prefix("//") {
            Some(hier) => {
                let (auth, path) = hier
                    .find('/')
                    .map_or((hier, ""), |idx| hier.split_at(idx));
                (Some(auth.to_owned()), decode_path(path))
            }
            None => (None, before_query.to_owned()),
        };
        Ok(Self {
            raw: input.to_owned(),
            scheme,
            authority: authority.filter(|auth| !auth.is_empty()),
            path,
            query,
        })
    }

    fn relative(input: &str) -> Self {
        let (before_query, query) = split_query(input);
        let mut path = before_query;
        while let Some(stripped) = path.strip_prefix("./") {
            path = stripped;
        }
        Self {
            raw: input.to_owned(),
            scheme: String::new(),
            authority: None,
            path: decode_path(path),
            query,
        }
    }

    /// Scheme in lower case; empty for relative addresses.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Authority (host and optional port), if one was given.
    #[must_use]
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Path component, or the opaque payload for `merge:` addresses.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` when the address has no scheme.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.scheme.is_empty()
    }

    /// First value of the query parameter `name`, percent-decoded.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Content type requested through the `type` query parameter.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.query_param(TYPE_PARAM).filter(|ct| !ct.is_empty())
    }

    /// The address exactly as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for Address {
    type Err = std::sync::Arc<MergeError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split `input` at the first `:` when it precedes any `/`, `?` or `#`.
///
/// Single-letter schemes are treated as Windows drive letters and left as
/// relative paths.
fn split_scheme(input: &str) -> Option<(&str, &str)> {
    let idx = input.find([':', '/', '?', '#'])?;
    if input.as_bytes().get(idx) != Some(&b':') || idx < 2 {
        return None;
    }
    Some((input.get(..idx)?, input.get(idx + 1..)?))
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

fn split_query(input: &str) -> (&str, Vec<(String, String)>) {
    match input.split_once('?') {
        Some((head, query)) => (head, parse_query(query)),
        None => (input, Vec::new()),
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (
                percent_decode(key, Plus::Space),
                percent_decode(value, Plus::Space),
            )
        })
        .collect()
}

/// How `+` is treated while percent-decoding.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Plus {
    /// Form encoding: `+` is a space.
    Space,
    /// Path encoding: `+` is itself.
    Literal,
}

fn decode_path(path: &str) -> String {
    percent_decode(path, Plus::Literal)
}

/// Decode `%XX` escapes. Malformed escapes are kept verbatim.
fn percent_decode(input: &str, plus: Plus) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while let Some(&byte) = bytes.get(i) {
        match byte {
            b'+' if plus == Plus::Space => out.push(b' '),
            b'%' => {
                let decoded = bytes
                    .get(i + 1..i + 3)
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(value) = decoded {
                    out.push(value);
                    i += 3;
                    continue;
                }
                out.push(byte);
            }
            _ => out.push(byte),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
