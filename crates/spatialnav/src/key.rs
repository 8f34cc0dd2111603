use std::{borrow::Borrow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::error::{Error, Result};

new_key_type! {
    /// Opaque identifier for a node stored in the registry arena.
    pub struct NodeId;
}

/// Prefix for keys the engine generates itself.
const GENERATED_PREFIX: &str = "sn:focusable-item-";

/// Return true if the full key is acceptable as an explicit focus key.
pub fn valid_focus_key(key: &str) -> bool {
    !key.is_empty() && key.trim() == key && !key.chars().any(char::is_control)
}

/// A focus key: the public, stable name of a registered node.
///
/// Keys are unique among simultaneously live nodes of one engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FocusKey(String);

impl FocusKey {
    /// Create a key, returning an error if it is empty, padded with
    /// whitespace, or contains control characters.
    pub fn new(key: &str) -> Result<Self> {
        if !valid_focus_key(key) {
            return Err(Error::InvalidKey(key.into()));
        }
        Ok(Self(key.to_string()))
    }

    /// The key assigned to the `n`th node registered without one.
    pub(crate) fn generated(n: u64) -> Self {
        Self(format!("{GENERATED_PREFIX}{n}"))
    }

    /// Wrap an arbitrary string for error reporting.
    pub(crate) fn raw(key: &str) -> Self {
        Self(key.to_string())
    }

    /// Was this key generated by the engine?
    pub fn is_generated(&self) -> bool {
        self.0.starts_with(GENERATED_PREFIX)
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FocusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FocusKey {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for FocusKey {
    type Error = Error;
    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for FocusKey {
    type Error = Error;
    fn try_from(s: String) -> Result<Self> {
        if !valid_focus_key(&s) {
            return Err(Error::InvalidKey(s));
        }
        Ok(Self(s))
    }
}

impl From<FocusKey> for String {
    fn from(k: FocusKey) -> Self {
        k.0
    }
}

impl Borrow<str> for FocusKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FocusKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for FocusKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<str> for FocusKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        assert!(FocusKey::new("menu-1").is_ok());
        assert!(FocusKey::new("sn:focusable-item-3").is_ok());
        assert_eq!(FocusKey::new(""), Err(Error::InvalidKey("".into())));
        assert!(FocusKey::new(" padded").is_err());
        assert!(FocusKey::new("tab\there").is_err());
    }

    #[test]
    fn generated() {
        let k = FocusKey::generated(7);
        assert_eq!(k, "sn:focusable-item-7");
        assert!(k.is_generated());
        assert!(!FocusKey::new("menu").map(|k| k.is_generated()).unwrap_or(true));
    }
}
