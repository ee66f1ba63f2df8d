//! Composite keys: ordered parts joined by a single separator character.
//!
//! A part containing the separator cannot be told apart from two parts, and a
//! squeezed key cannot be split back into its original arity. Both are accepted
//! limitations of the grid layout.

/// Composes, decomposes and squeezes keys, and recognises glossary keys.
#[derive(Debug, Clone)]
pub struct KeyCodec {
    separator: char,
    glossary_tag: String,
}

impl KeyCodec {
    pub fn new(separator: char, glossary_tag: impl Into<String>) -> Self {
        Self {
            separator,
            glossary_tag: glossary_tag.into(),
        }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn glossary_tag(&self) -> &str {
        &self.glossary_tag
    }

    /// Join parts with the separator, without a trailing separator.
    pub fn compose<S: AsRef<str>>(&self, parts: &[S]) -> String {
        let mut key = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                key.push(self.separator);
            }
            key.push_str(part.as_ref());
        }
        key
    }

    /// Split a key into its parts. Always yields at least one part.
    pub fn decompose(&self, key: &str) -> Vec<String> {
        key.split(self.separator).map(str::to_string).collect()
    }

    /// Fit `parts` into `target_len` slots.
    ///
    /// When there are more parts than slots, the first `target_len - 1` parts are
    /// kept and the rest are joined with the separator into the last slot. Keys
    /// that already fit are returned unchanged.
    pub fn squeeze(&self, parts: &[String], target_len: usize) -> Vec<String> {
        if target_len == 0 || parts.len() <= target_len {
            return parts.to_vec();
        }
        let (head, tail) = parts.split_at(target_len - 1);
        let mut squeezed = head.to_vec();
        squeezed.push(self.compose(tail));
        squeezed
    }

    /// Key assigned to the `sequence`-th glossary row of a read pass.
    pub fn glossary_key(&self, sequence: usize) -> String {
        format!("{}{}", self.glossary_tag, sequence)
    }

    /// Whether a row's first cell marks it as a glossary row.
    pub fn is_glossary_cell(&self, cell: &str) -> bool {
        !self.glossary_tag.is_empty() && cell == self.glossary_tag
    }

    /// Whether a key was produced by [`KeyCodec::glossary_key`].
    pub fn is_glossary_key(&self, key: &str) -> bool {
        if self.glossary_tag.is_empty() {
            return false;
        }
        key.strip_prefix(self.glossary_tag.as_str())
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> KeyCodec {
        KeyCodec::new(':', "GLOSSARY")
    }

    fn parts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // ==================== compose / decompose Tests ====================

    #[test]
    fn test_compose_no_trailing_separator() {
        assert_eq!(codec().compose(&["Window", "Title"]), "Window:Title");
        assert_eq!(codec().compose(&["single"]), "single");
    }

    #[test]
    fn test_compose_keeps_empty_parts() {
        assert_eq!(codec().compose(&["a", "", "c"]), "a::c");
    }

    #[test]
    fn test_decompose_splits_on_separator() {
        assert_eq!(codec().decompose("a:b:c"), parts(&["a", "b", "c"]));
        assert_eq!(codec().decompose("plain"), parts(&["plain"]));
        assert_eq!(codec().decompose(""), parts(&[""]));
    }

    // ==================== squeeze Tests ====================

    #[test]
    fn test_squeeze_joins_overflow_into_last_slot() {
        let squeezed = codec().squeeze(&parts(&["a", "b", "c", "d"]), 2);
        assert_eq!(squeezed, parts(&["a", "b:c:d"]));
    }

    #[test]
    fn test_squeeze_to_single_slot() {
        let squeezed = codec().squeeze(&parts(&["a", "b", "c"]), 1);
        assert_eq!(squeezed, parts(&["a:b:c"]));
    }

    #[test]
    fn test_squeeze_leaves_fitting_keys_alone() {
        let original = parts(&["a", "b"]);
        assert_eq!(codec().squeeze(&original, 2), original);
        assert_eq!(codec().squeeze(&original, 5), original);
    }

    #[test]
    fn test_squeeze_preserves_composed_key() {
        let codec = codec();
        let original = parts(&["w", "x", "y", "z"]);
        let squeezed = codec.squeeze(&original, 3);
        assert_eq!(codec.compose(&squeezed), codec.compose(&original));
    }

    #[test]
    fn test_squeeze_custom_separator() {
        let codec = KeyCodec::new('|', "GLOSSARY");
        let squeezed = codec.squeeze(&parts(&["a", "b", "c", "d"]), 2);
        assert_eq!(squeezed, parts(&["a", "b|c|d"]));
    }

    // ==================== Glossary Tests ====================

    #[test]
    fn test_glossary_key_sequence() {
        assert_eq!(codec().glossary_key(0), "GLOSSARY0");
        assert_eq!(codec().glossary_key(12), "GLOSSARY12");
    }

    #[test]
    fn test_is_glossary_key() {
        let codec = codec();
        assert!(codec.is_glossary_key("GLOSSARY0"));
        assert!(codec.is_glossary_key("GLOSSARY42"));
        assert!(!codec.is_glossary_key("GLOSSARY"));
        assert!(!codec.is_glossary_key("GLOSSARYx"));
        assert!(!codec.is_glossary_key("GLOSSARY:Title"));
        assert!(!codec.is_glossary_key("Window:Title"));
    }

    #[test]
    fn test_is_glossary_cell() {
        let codec = codec();
        assert!(codec.is_glossary_cell("GLOSSARY"));
        assert!(!codec.is_glossary_cell("GLOSSARY1"));
        assert!(!codec.is_glossary_cell("glossary"));
    }

    #[test]
    fn test_empty_glossary_tag_disables_glossary() {
        let codec = KeyCodec::new(':', "");
        assert!(!codec.is_glossary_key("12"));
        assert!(!codec.is_glossary_cell(""));
    }
}
