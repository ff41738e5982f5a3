//! Content-derived entity tags.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::Result;

/// A strong entity tag, stored in its quoted header form:
/// `"<kind>-<length>-<sha256 hex>"`.
///
/// The tag is a pure function of the kind and the representation bytes, so
/// equal representations always produce equal tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityTag(String);

impl EntityTag {
    /// Computes the tag of a byte representation.
    pub fn from_bytes(kind: &str, bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(format!("\"{kind}-{}-{}\"", bytes.len(), hex::encode(digest)))
    }

    /// Computes the tag of the JSON representation of a value.
    pub fn for_json<T: Serialize + ?Sized>(kind: &str, value: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::from_bytes(kind, &bytes))
    }

    /// Returns the quoted header form of the tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits an `If-Match` / `If-None-Match` header value into candidate
    /// tags in the same form as [`EntityTag::as_str`].
    ///
    /// Whitespace is trimmed and a `W/` weakness prefix is ignored. Empty
    /// entries are skipped.
    pub fn candidates(header: &str) -> impl Iterator<Item = &str> {
        header
            .split(',')
            .map(str::trim)
            .map(|tag| tag.strip_prefix("W/").unwrap_or(tag))
            .filter(|tag| !tag.is_empty())
    }
}

impl std::fmt::Display for EntityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A representation together with its entity tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged<T> {
    pub tag: EntityTag,
    pub payload: T,
}

impl<T> Tagged<T> {
    /// Pairs a payload with a precomputed tag.
    pub fn new(tag: EntityTag, payload: T) -> Self {
        Self { tag, payload }
    }
}

impl<T: Serialize> Tagged<T> {
    /// Tags a payload with the fingerprint of its JSON representation.
    pub fn json(kind: &str, payload: T) -> Result<Self> {
        let tag = EntityTag::for_json(kind, &payload)?;
        Ok(Self { tag, payload })
    }
}
