//! Player key parsing

use std::fmt;

use super::CacheError;

/// Separator between the player name and tag
pub const KEY_SEPARATOR: char = '#';

/// A validated `Name#Tag` player identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerKey {
    name: String,
    tag: String,
}

impl PlayerKey {
    /// Parses a `Name#Tag` string
    ///
    /// Surrounding whitespace is ignored. The key must contain exactly one
    /// separator with a non-empty name before it and a non-empty tag after it.
    pub fn parse(raw: &str) -> Result<Self, CacheError> {
        let trimmed = raw.trim();
        let invalid = || CacheError::InvalidKey(trimmed.to_string());

        let (name, tag) = trimmed.split_once(KEY_SEPARATOR).ok_or_else(invalid)?;
        if name.is_empty() || tag.is_empty() || tag.contains(KEY_SEPARATOR) {
            return Err(invalid());
        }

        Ok(Self {
            name: name.to_string(),
            tag: tag.to_string(),
        })
    }

    /// Player name, the part before the separator
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Player tag, the part after the separator
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// File stem safe to use inside the cache directory
    ///
    /// Distinct keys always yield distinct stems.
    pub fn file_stem(&self) -> String {
        encode_stem(&self.to_string())
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, KEY_SEPARATOR, self.tag)
    }
}

/// Encodes `raw` as a file stem using only `[A-Za-z0-9_-]`
///
/// ASCII letters, digits and `-` pass through. Every other byte, `_`
/// included, becomes `_` followed by two uppercase hex digits, so the
/// mapping is reversible and never produces a path separator.
pub(crate) fn encode_stem(raw: &str) -> String {
    let mut stem = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("_{:02X}", byte));
        }
    }
    stem
}
