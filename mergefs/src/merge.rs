//! Deep-merge of decoded documents.

use crate::{Document, MergeError, document::Mapping};

/// Merge `documents`, highest priority first, into one mapping.
///
/// The fold starts from the last (lowest-priority) document and overlays each
/// earlier document in turn with [`merge_mapping`].
///
/// # Errors
///
/// Returns [`MergeError::NotAMap`] when any document is not a mapping, and
/// [`MergeError::EmptyMerge`] when `documents` is empty.
///
/// # Examples
///
/// ```
/// use mergefs::{doc, merge::merge};
///
/// let merged = merge(vec![doc!({"a": 2}), doc!({"a": 1, "b": 1})])?;
/// assert_eq!(merged, doc!({"a": 2, "b": 1}));
/// # Ok::<_, mergefs::MergeError>(())
/// ```
pub fn merge(documents: Vec<Document>) -> Result<Document, MergeError> {
    let mut maps = documents
        .into_iter()
        .map(|doc| match doc {
            Document::Map(map) => Ok(map),
            other => Err(MergeError::NotAMap { kind: other.kind() }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut acc = maps.pop().ok_or(MergeError::EmptyMerge)?;
    while let Some(overlay) = maps.pop() {
        merge_mapping(&mut acc, overlay);
    }
    Ok(Document::Map(acc))
}

/// Overlay `overlay` onto `base` in place.
///
/// Behaviour:
/// - keys missing from `base` are copied from `overlay`;
/// - when both values are mappings they merge recursively;
/// - otherwise the overlay value replaces the base value wholesale, so lists
///   and scalars never merge with mappings.
///
/// Keys present only in `base` are left untouched.
pub fn merge_mapping(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        let Some(existing) = base.get_mut(&key) else {
            base.insert(key, value);
            continue;
        };
        match (existing, value) {
            (Document::Map(existing), Document::Map(incoming)) => {
                merge_mapping(existing, incoming);
            }
            (existing, incoming) => *existing = incoming,
        }
    }
}
