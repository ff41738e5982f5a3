use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a cart.
///
/// Ids are assigned by an injected generator and are expected to be strictly
/// positive. The type itself does not enforce positivity so that ids decoded
/// from external input can still be looked up (and simply not found).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(i64);

impl CartId {
    /// Creates a cart ID from a raw integer.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw integer value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Returns true if the ID is strictly positive.
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl std::fmt::Display for CartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CartId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<CartId> for i64 {
    fn from(id: CartId) -> Self {
        id.0
    }
}

impl FromStr for CartId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// Article code (SKU) identifying a catalog article and a cart line item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleCode(String);

impl ArticleCode {
    /// Creates an article code from a string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the article code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArticleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ArticleCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ArticleCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ArticleCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ArticleCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}
