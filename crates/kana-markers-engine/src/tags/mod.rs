//! # Tag Vocabulary
//!
//! A tag definition owns its delimiter pair and the kind of conversion its
//! inner text receives. The scanner never hardcodes `{hg}` or `{/kk}`; it
//! reads delimiters from the [`TagSet`] it is handed.
//!
//! ## Types
//!
//! - **`Conversion`**: closed set of transliterations (hiragana, katakana, kana)
//! - **`TagDefinition`**: name + `open`/`close` delimiters + conversion
//! - **`TagSet`**: validated, ordered list; order is the tie-break order
//! - **`oracle`**: the `Oracle` seam and the `wana_kana` backed default

pub mod oracle;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use oracle::{ConvertError, Oracle, WanaKana};

static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("tag name pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("invalid tag name {0:?}: expected a letter followed by letters, digits, '_' or '-'")]
    InvalidName(String),

    #[error("tag {0:?} has an empty delimiter")]
    EmptyDelimiter(String),

    #[error("tag {0:?} is defined more than once")]
    DuplicateName(String),
}

/// The transliteration a tag asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conversion {
    /// Romaji to hiragana only.
    Hiragana,
    /// Romaji to katakana only.
    Katakana,
    /// Romaji to kana, uppercase romaji producing katakana.
    Kana,
}

/// One marker kind: `{name}…{/name}` by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDefinition {
    name: String,
    open: String,
    close: String,
    conversion: Conversion,
}

impl TagDefinition {
    /// Builds a tag with the standard `{name}` / `{/name}` delimiters.
    pub fn new(name: impl Into<String>, conversion: Conversion) -> Result<Self, TagError> {
        let name = name.into();
        let open = format!("{{{name}}}");
        let close = format!("{{/{name}}}");
        Self::with_delimiters(name, open, close, conversion)
    }

    /// Builds a tag with arbitrary, non-empty delimiters.
    pub fn with_delimiters(
        name: impl Into<String>,
        open: impl Into<String>,
        close: impl Into<String>,
        conversion: Conversion,
    ) -> Result<Self, TagError> {
        let name = name.into();
        if !TAG_NAME.is_match(&name) {
            return Err(TagError::InvalidName(name));
        }
        let open = open.into();
        let close = close.into();
        if open.is_empty() || close.is_empty() {
            return Err(TagError::EmptyDelimiter(name));
        }
        Ok(Self {
            name,
            open,
            close,
            conversion,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub fn conversion(&self) -> Conversion {
        self.conversion
    }
}

/// Ordered tag vocabulary. Position in the set breaks ties between spans
/// that start at the same offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<TagDefinition>,
}

impl TagSet {
    pub fn new(tags: Vec<TagDefinition>) -> Result<Self, TagError> {
        for (i, tag) in tags.iter().enumerate() {
            if tags[..i].iter().any(|earlier| earlier.name == tag.name) {
                return Err(TagError::DuplicateName(tag.name.clone()));
            }
        }
        Ok(Self { tags })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagDefinition> {
        self.tags.iter()
    }

    pub fn get(&self, name: &str) -> Option<&TagDefinition> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// Position of the named tag in the set.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.tags.iter().position(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for TagSet {
    /// `hg` (hiragana), `kk` (katakana), `hk` (kana), in that order.
    fn default() -> Self {
        let builtin = [
            ("hg", Conversion::Hiragana),
            ("kk", Conversion::Katakana),
            ("hk", Conversion::Kana),
        ];
        Self {
            tags: builtin
                .into_iter()
                .map(|(name, conversion)| TagDefinition {
                    open: format!("{{{name}}}"),
                    close: format!("{{/{name}}}"),
                    name: name.to_string(),
                    conversion,
                })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a TagDefinition;
    type IntoIter = std::slice::Iter<'a, TagDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_set_has_three_tags_in_order() {
        let tags = TagSet::default();
        let names: Vec<_> = tags.iter().map(TagDefinition::name).collect();
        assert_eq!(names, ["hg", "kk", "hk"]);
        assert_eq!(tags.get("kk").unwrap().open(), "{kk}");
        assert_eq!(tags.get("kk").unwrap().close(), "{/kk}");
        assert_eq!(tags.get("hk").unwrap().conversion(), Conversion::Kana);
    }

    #[test]
    fn new_derives_brace_delimiters() {
        let tag = TagDefinition::new("ruby", Conversion::Hiragana).unwrap();
        assert_eq!(tag.open(), "{ruby}");
        assert_eq!(tag.close(), "{/ruby}");
    }

    #[rstest]
    #[case("")]
    #[case("1hg")]
    #[case("h g")]
    #[case("hg}")]
    #[case("{hg")]
    fn rejects_bad_names(#[case] name: &str) {
        assert_eq!(
            TagDefinition::new(name, Conversion::Kana),
            Err(TagError::InvalidName(name.to_string()))
        );
    }

    #[test]
    fn rejects_empty_delimiters() {
        let err = TagDefinition::with_delimiters("x", "", "]", Conversion::Kana).unwrap_err();
        assert_eq!(err, TagError::EmptyDelimiter("x".to_string()));
    }

    #[test]
    fn rejects_duplicate_names() {
        let a = TagDefinition::new("hg", Conversion::Hiragana).unwrap();
        let b = TagDefinition::new("hg", Conversion::Katakana).unwrap();
        assert_eq!(
            TagSet::new(vec![a, b]),
            Err(TagError::DuplicateName("hg".to_string()))
        );
    }

    #[test]
    fn index_of_follows_configured_order() {
        let tags = TagSet::new(vec![
            TagDefinition::new("kk", Conversion::Katakana).unwrap(),
            TagDefinition::new("hg", Conversion::Hiragana).unwrap(),
        ])
        .unwrap();
        assert_eq!(tags.index_of("kk"), Some(0));
        assert_eq!(tags.index_of("hg"), Some(1));
        assert_eq!(tags.index_of("hk"), None);
    }
}
