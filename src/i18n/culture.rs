//! Culture type: a validated language-tag identity.
//!
//! A `Culture` is parsed with `unic-langid`, so `en_us`, `EN-us` and `en-US` are
//! the same culture. It is only constructible for languages listed in the
//! [`CultureRegistry`], which keeps decorative header text such as "Key" or
//! "Comment" from being mistaken for a language.

use crate::error::{Result, StoreError};
use crate::i18n::{CultureInfo, CultureRegistry};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;
use unic_langid::LanguageIdentifier;

static BRACKETED_REGEX: OnceLock<Regex> = OnceLock::new();

/// A validated culture.
///
/// Equality, hashing and ordering are by normalized tag.
#[derive(Debug, Clone)]
pub struct Culture {
    id: LanguageIdentifier,
    tag: String,
}

impl Culture {
    /// Resolve free text to a culture.
    ///
    /// If the text ends with a single `(...)` group, the group's content is the
    /// candidate tag ("Svenska (sv)" resolves to `sv`). Otherwise the whole text
    /// is the candidate, unless `bracketed_only` is set.
    ///
    /// # Errors
    /// `StoreError::InvalidCultureTag` when the candidate does not name a known
    /// culture.
    pub fn resolve(text: &str, bracketed_only: bool) -> Result<Culture> {
        Self::resolve_or_default(text, bracketed_only)
            .ok_or_else(|| StoreError::InvalidCultureTag(text.trim().to_string()))
    }

    /// Same as [`Culture::resolve`], returning `None` instead of failing.
    pub fn resolve_or_default(text: &str, bracketed_only: bool) -> Option<Culture> {
        let text = text.trim();
        let candidate = match bracketed_tag(text) {
            Some(inner) => inner,
            None if bracketed_only => return None,
            None => text,
        };
        Self::from_tag(candidate)
    }

    fn from_tag(tag: &str) -> Option<Culture> {
        if tag.is_empty() {
            return None;
        }
        let id: LanguageIdentifier = tag.parse().ok()?;
        if !CultureRegistry::get().is_known(id.language.as_str()) {
            return None;
        }
        Some(Self::from_id(id))
    }

    fn from_id(id: LanguageIdentifier) -> Culture {
        let tag = id.to_string();
        Culture { id, tag }
    }

    /// Normalized tag (e.g., "en-US").
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The next less specific culture: variants are dropped first, then the
    /// region, then the script. A bare language has no parent.
    pub fn parent(&self) -> Option<Culture> {
        let mut id = self.id.clone();
        if id.variants().next().is_some() {
            id.clear_variants();
        } else if id.region.is_some() {
            id.region = None;
        } else if id.script.is_some() {
            id.script = None;
        } else {
            return None;
        }
        Some(Self::from_id(id))
    }

    /// The bare language ("en-US" reduces to "en").
    pub fn two_letter(&self) -> Culture {
        Self::from_id(LanguageIdentifier::from_parts(
            self.id.language,
            None,
            None,
            &[],
        ))
    }

    /// Whether this culture carries no script, region or variant.
    pub fn is_neutral(&self) -> bool {
        self.parent().is_none()
    }

    /// Registry metadata for this culture's language.
    pub fn info(&self) -> Option<&'static CultureInfo> {
        CultureRegistry::get().get_by_code(self.id.language.as_str())
    }

    /// Text written into the header cell of a new language column.
    pub fn header_label(&self, decorate: bool) -> String {
        match self.info() {
            Some(info) if decorate => format!("{} ({})", info.native_name, self.tag),
            _ => self.tag.clone(),
        }
    }
}

fn bracketed_tag(text: &str) -> Option<&str> {
    let regex =
        BRACKETED_REGEX.get_or_init(|| Regex::new(r"\(\s*([^()]*?)\s*\)\s*$").unwrap());
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

impl PartialEq for Culture {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for Culture {}

impl Hash for Culture {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
    }
}

impl PartialOrd for Culture {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Culture {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tag.cmp(&other.tag)
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

impl FromStr for Culture {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Culture::resolve(s, false)
    }
}

impl Serialize for Culture {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag)
    }
}

impl<'de> Deserialize<'de> for Culture {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Culture::resolve(&tag, false).map_err(serde::de::Error::custom)
    }
}
