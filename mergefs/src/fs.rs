//! The merge filesystem entry point.

use std::sync::Arc;

use crate::address::MERGE_SCHEME;
use crate::backend::{SchemeMux, SourceReader};
use crate::decode::mime;
use crate::file::{MergeFile, SubFile};
use crate::{Address, AliasRegistry, MergeError, MergeResult};

/// Separator between the parts of a merge request.
pub const PART_SEPARATOR: char = '|';

/// Minimum number of parts a merge request must name.
pub const MIN_PARTS: usize = 2;

/// Deepest chain of `merge:` sources a request may expand into.
pub const MAX_NESTING: usize = 16;

/// Filesystem whose files are deep merges of other resources.
///
/// `open("override|base")` resolves each `|`-separated part through the alias
/// registry, opens it via the scheme multiplexer, and returns a [`MergeFile`]
/// that merges the parts on first read. Earlier parts take priority.
///
/// The registry and multiplexer are shared read-only, so one `MergeFs` can
/// serve concurrent requests.
///
/// # Examples
///
/// ```
/// use std::io::Read;
/// use mergefs::{AliasRegistry, MergeFs, SchemeMux, backend::MemoryBackend};
///
/// let backend = MemoryBackend::new()
///     .with_file("over.json", r#"{"name": "override"}"#)
///     .with_file("base.yaml", "name: base\nport: 80\n");
/// let fs = MergeFs::new(SchemeMux::new().with_default(backend), AliasRegistry::new());
///
/// let mut out = String::new();
/// fs.open("over.json|base.yaml")?.read_to_string(&mut out)?;
/// assert_eq!(out, "name: override\nport: 80\n");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct MergeFs {
    mux: Arc<SchemeMux>,
    aliases: Arc<AliasRegistry>,
}

/// A request part after alias substitution.
struct ResolvedPart {
    address: Address,
    content_type: Option<String>,
}

impl MergeFs {
    /// Build a filesystem over `mux` and `aliases`.
    #[must_use]
    pub fn new(mux: SchemeMux, aliases: AliasRegistry) -> Self {
        Self::from_shared(Arc::new(mux), Arc::new(aliases))
    }

    /// Build a filesystem over already shared collaborators.
    #[must_use]
    pub const fn from_shared(mux: Arc<SchemeMux>, aliases: Arc<AliasRegistry>) -> Self {
        Self { mux, aliases }
    }

    /// The alias registry consulted by [`Self::open`].
    #[must_use]
    pub fn aliases(&self) -> &AliasRegistry {
        &self.aliases
    }

    /// The scheme multiplexer consulted by [`Self::open`].
    #[must_use]
    pub fn mux(&self) -> &SchemeMux {
        &self.mux
    }

    /// Open the merge of the `|`-separated sources in `path`.
    ///
    /// Every source is opened before this returns, but none is read. Content
    /// types are resolved here and only checked when the file is read.
    ///
    /// # Errors
    ///
    /// - [`MergeError::TooFewSources`] when `path` names fewer than two parts;
    /// - [`MergeError::InvalidAddress`] for an empty or malformed part, or
    ///   when `merge:` sources nest deeper than [`MAX_NESTING`];
    /// - [`MergeError::NoFilesystem`] when a part's scheme has no backend;
    /// - [`MergeError::Source`] when a backend cannot open a part. Missing
    ///   resources, including relative parts with no default backend, satisfy
    ///   [`MergeError::is_not_found`].
    pub fn open(&self, path: &str) -> MergeResult<MergeFile> {
        self.open_at(path, 0)
    }

    fn open_at(&self, path: &str, depth: usize) -> MergeResult<MergeFile> {
        let parts: Vec<&str> = path.split(PART_SEPARATOR).collect();
        if parts.len() < MIN_PARTS {
            return Err(MergeError::TooFewSources { count: parts.len() }.into());
        }

        let mut sources = Vec::with_capacity(parts.len());
        for part in parts {
            let resolved = self.resolve(part)?;
            let reader = self.open_source(&resolved.address, depth)?;
            let content_type = Self::content_type(&resolved);
            tracing::debug!(
                part,
                address = %resolved.address,
                content_type = content_type.as_deref().unwrap_or(""),
                "opened merge source"
            );
            sources.push(SubFile::new(resolved.address.as_str(), reader, content_type));
        }
        Ok(MergeFile::new(path, sources))
    }

    /// Open `path` and read the whole merged document.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::open`] or from materialising the merge.
    pub fn read_to_vec(&self, path: &str) -> MergeResult<Vec<u8>> {
        let mut file = self.open(path)?;
        file.contents().map(<[u8]>::to_vec)
    }

    fn resolve(&self, part: &str) -> MergeResult<ResolvedPart> {
        if part.is_empty() {
            return Err(MergeError::invalid_address(part, "empty datasource in merge request").into());
        }
        if let Some(alias) = self.aliases.lookup(part) {
            return Ok(ResolvedPart {
                address: alias.address().clone(),
                content_type: alias.content_type().map(str::to_owned),
            });
        }
        Ok(ResolvedPart {
            address: Address::parse(part)?,
            content_type: None,
        })
    }

    fn open_source(&self, address: &Address, depth: usize) -> MergeResult<SourceReader> {
        if address.scheme() == MERGE_SCHEME {
            if depth >= MAX_NESTING {
                return Err(MergeError::invalid_address(
                    address.as_str(),
                    format!("merge sources nested more than {MAX_NESTING} deep"),
                )
                .into());
            }
            let nested = self.open_at(address.path(), depth + 1)?;
            return Ok(Box::new(nested));
        }
        let Some(backend) = self.mux.resolve(address.scheme()) else {
            return Err(Arc::new(if address.is_relative() {
                MergeError::source(
                    address.as_str(),
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "no filesystem registered for relative paths",
                    ),
                )
            } else {
                MergeError::NoFilesystem {
                    scheme: address.scheme().to_owned(),
                }
            }));
        };
        backend
            .open(address)
            .map_err(|e| Arc::new(MergeError::source(address.as_str(), e)))
    }

    /// Resolve the content type for a part.
    ///
    /// Priority: `type` query parameter, then the alias binding, then the
    /// path extension. Nested merges always produce YAML.
    fn content_type(part: &ResolvedPart) -> Option<String> {
        let address = &part.address;
        if address.scheme() == MERGE_SCHEME {
            return Some(mime::YAML.to_owned());
        }
        address
            .content_type()
            .or(part.content_type.as_deref())
            .or_else(|| mime::type_by_extension(address.path()))
            .map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Alias;
    use crate::backend::MemoryBackend;
    use rstest::{fixture, rstest};

    const JSON: &str = r#"{"hello": "world"}"#;
    const YAML: &str = "hello: earth\ngoodnight: moon\n";
    const MERGED: &str = "goodnight: moon\nhello: world\n";

    fn files() -> MemoryBackend {
        MemoryBackend::new()
            .with_file("tmp/jsonfile.json", JSON)
            .with_file("tmp/yamlfile.yaml", YAML)
            .with_file("tmp/textfile.txt", "some text")
            .with_file("tmp/array.json", "[1, 2, 3]")
    }

    fn alias(registry: &mut AliasRegistry, name: &str, address: &str) {
        let parsed = Alias::parse(address).expect("test alias parses");
        registry.register(name, parsed);
    }

    #[fixture]
    fn fs() -> MergeFs {
        let mut mux = SchemeMux::new().with_default(files());
        mux.register("file", files());
        let mut aliases = AliasRegistry::new();
        alias(&mut aliases, "foo", "merge:file:///tmp/jsonfile.json|file:///tmp/yamlfile.yaml");
        alias(&mut aliases, "bar", "file:///tmp/jsonfile.json");
        alias(&mut aliases, "baz", "file:///tmp/yamlfile.yaml");
        alias(&mut aliases, "badscheme", "bad:///scheme.json");
        alias(&mut aliases, "badtype", "file:///tmp/textfile.txt?type=foo/bar");
        alias(&mut aliases, "array", "file:///tmp/array.json?type=application%2Farray%2Bjson");
        MergeFs::new(mux, aliases)
    }

    fn read(fs: &MergeFs, path: &str) -> MergeResult<String> {
        let bytes = fs.read_to_vec(path)?;
        Ok(String::from_utf8(bytes).expect("merge output is UTF-8"))
    }

    #[rstest]
    #[case::root("/")]
    #[case::single_part("just/one/part")]
    fn rejects_single_sources(fs: MergeFs, #[case] path: &str) {
        let err = fs.open(path).expect_err("one source cannot be merged");
        assert!(matches!(&*err, MergeError::TooFewSources { count: 1 }));
        assert!(err.to_string().contains("need at least 2 datasources to merge"));
    }

    #[rstest]
    #[case::leading("|bar")]
    #[case::middle("bar||baz")]
    fn rejects_empty_parts(fs: MergeFs, #[case] path: &str) {
        let err = fs.open(path).expect_err("empty part is invalid");
        assert!(matches!(&*err, MergeError::InvalidAddress { .. }));
    }

    #[rstest]
    #[case::absolute("file:///tmp/jsonfile.json|file:///tmp/yamlfile.yaml")]
    #[case::aliases("bar|baz")]
    #[case::relative("tmp/jsonfile.json|baz")]
    #[case::dot_relative("./tmp/jsonfile.json|baz")]
    fn merges_with_left_priority(fs: MergeFs, #[case] path: &str) -> MergeResult<()> {
        assert_eq!(read(&fs, path)?, MERGED);
        Ok(())
    }

    #[rstest]
    fn duplicate_parts_are_opened_independently(fs: MergeFs) -> MergeResult<()> {
        assert_eq!(read(&fs, "bar|bar")?, "hello: world\n");
        Ok(())
    }

    #[rstest]
    fn output_is_deterministic(fs: MergeFs) -> MergeResult<()> {
        let first = fs.read_to_vec("foo|baz|tmp/jsonfile.json")?;
        let second = fs.read_to_vec("foo|baz|tmp/jsonfile.json")?;
        assert_eq!(first, second);
        Ok(())
    }

    #[rstest]
    fn reversed_order_flips_priority(fs: MergeFs) -> MergeResult<()> {
        assert_eq!(read(&fs, "baz|bar")?, "goodnight: moon\nhello: earth\n");
        Ok(())
    }

    #[rstest]
    fn unregistered_scheme_is_reported(fs: MergeFs) {
        let err = fs
            .open("file:///tmp/jsonfile.json|badscheme")
            .expect_err("bad scheme has no backend");
        assert_eq!(err.to_string(), "no filesystem registered for scheme \"bad\"");
    }

    #[rstest]
    fn missing_source_is_not_found(fs: MergeFs) {
        let err = fs
            .open("file:///tmp/jsonfile.json|file:///tmp/missing.json")
            .expect_err("missing source");
        assert!(err.is_not_found(), "got {err}");
    }

    #[test]
    fn relative_parts_need_a_default_backend() {
        let mut mux = SchemeMux::new();
        mux.register("file", files());
        let fs = MergeFs::new(mux, AliasRegistry::new());
        for path in ["a|b", "bogusalias|file:///tmp/jsonfile.json"] {
            let err = fs.open(path).expect_err("no default backend");
            assert!(err.is_not_found(), "{path}: got {err}");
        }
    }

    #[rstest]
    fn type_errors_surface_on_read_not_open(fs: MergeFs) -> MergeResult<()> {
        let mut file = fs.open("badtype|bar")?;
        let err = file.contents().expect_err("foo/bar has no decoder");
        assert_eq!(err.to_string(), "data of type \"foo/bar\" not yet supported");
        Ok(())
    }

    #[rstest]
    fn non_map_sources_fail_on_read(fs: MergeFs) -> MergeResult<()> {
        let mut file = fs.open("bar|array")?;
        let err = file.contents().expect_err("arrays cannot be merged");
        assert!(err.to_string().contains("can only merge maps"), "got {err}");
        Ok(())
    }

    #[rstest]
    fn query_type_overrides_extension(fs: MergeFs) -> MergeResult<()> {
        let out = read(&fs, "bar|file:///tmp/yamlfile.yaml?type=application/yaml")?;
        assert_eq!(out, MERGED);
        Ok(())
    }

    #[rstest]
    fn alias_type_applies_when_query_is_absent() -> MergeResult<()> {
        let backend = MemoryBackend::new()
            .with_file("a.data", r#"{"a": 1}"#)
            .with_file("b.json", r#"{"b": 2}"#);
        let mut aliases = AliasRegistry::new();
        aliases.register("a", Alias::parse("a.data")?.with_content_type("application/json"));
        let fs = MergeFs::new(SchemeMux::new().with_default(backend), aliases);
        assert_eq!(read(&fs, "a|b.json")?, "a: 1\nb: 2\n");
        Ok(())
    }

    #[test]
    fn self_referencing_merge_alias_is_cut_off() {
        let mut aliases = AliasRegistry::new();
        alias(&mut aliases, "loop", "merge:loop|base.json");
        let backend = MemoryBackend::new().with_file("base.json", "{}");
        let fs = MergeFs::new(SchemeMux::new().with_default(backend), aliases);
        let err = fs.open("loop|base.json").expect_err("recursion must stop");
        assert!(err.to_string().contains("nested more than"), "got {err}");
    }

    #[rstest]
    fn nested_merge_aliases_merge_recursively(fs: MergeFs) -> MergeResult<()> {
        let backend_extra = MemoryBackend::new().with_file("extra.toml", "extra = true\n");
        let mut mux = fs.mux().clone();
        mux.register("mem", backend_extra);
        let nested = MergeFs::from_shared(Arc::new(mux), Arc::new(fs.aliases().clone()));
        assert_eq!(
            read(&nested, "mem:///extra.toml|foo")?,
            "extra: true\ngoodnight: moon\nhello: world\n"
        );
        Ok(())
    }

    #[rstest]
    fn nested_merges_keep_non_finite_floats(fs: MergeFs) -> MergeResult<()> {
        let floats = MemoryBackend::new()
            .with_file("inf.toml", "x = inf\ny = -inf\n")
            .with_file("empty.json", "{}");
        let mut mux = fs.mux().clone();
        mux.register("mem", floats);
        let mut aliases = fs.aliases().clone();
        alias(&mut aliases, "floats", "merge:mem:///inf.toml|mem:///empty.json");
        let nested = MergeFs::from_shared(Arc::new(mux), Arc::new(aliases));

        let direct = read(&nested, "mem:///inf.toml|mem:///empty.json")?;
        assert_eq!(direct, "x: .inf\n\"y\": -.inf\n");
        assert_eq!(read(&nested, "floats|mem:///empty.json")?, direct);
        Ok(())
    }

    #[rstest]
    #[case::comment_only("# nothing yet\n")]
    #[case::bare_marker("---\n")]
    fn contentless_yaml_sources_merge_as_empty_maps(
        fs: MergeFs,
        #[case] contents: &str,
    ) -> MergeResult<()> {
        let mut mux = fs.mux().clone();
        mux.register("mem", MemoryBackend::new().with_file("blank.yaml", contents));
        let with_blank = MergeFs::from_shared(Arc::new(mux), Arc::new(fs.aliases().clone()));
        assert_eq!(read(&with_blank, "mem:///blank.yaml|bar")?, "hello: world\n");
        assert_eq!(read(&with_blank, "bar|mem:///blank.yaml")?, "hello: world\n");
        Ok(())
    }
}
