//! In-memory section/attribute store
//!
//! Sections are kept in an insertion-ordered map keyed by their exact header
//! text. Attributes inside a section are keyed case-insensitively but keep the
//! casing they were defined with.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Header of the implicit section that holds pairs defined before any header
pub const DEFAULT_SECTION: &str = "[Default]";

/// What happens to an attribute's position when its key is defined again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverridePolicy {
    /// Remove the old entry and append the new one at the end of the section
    #[default]
    MoveToEnd,
    /// Keep the original position and overwrite key casing and value
    InPlace,
}

/// A single key/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Key as written by the last definition
    pub key: String,
    /// Value, trimmed of surrounding whitespace when parsed
    pub value: String,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A named group of attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    attributes: IndexMap<String, Attribute>,
}

// Upper-casing first keeps keys like `straße` equal to their saved `STRASSE`.
fn fold_key(key: &str) -> String {
    key.to_uppercase().to_lowercase()
}

impl Section {
    /// Create an empty section with the given header text
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Header text, brackets included
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a value by key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(&fold_key(key))
            .map(|attr| attr.value.as_str())
    }

    /// Look up the full attribute by key (case-insensitive)
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.get(&fold_key(key))
    }

    /// Check whether a key is defined (case-insensitive)
    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(&fold_key(key))
    }

    /// Define or override an attribute, returning the previous value
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        policy: OverridePolicy,
    ) -> Option<String> {
        let attr = Attribute::new(key, value);
        let folded = fold_key(&attr.key);

        match policy {
            OverridePolicy::MoveToEnd => {
                let previous = self.attributes.shift_remove(&folded);
                self.attributes.insert(folded, attr);
                previous.map(|old| old.value)
            }
            OverridePolicy::InPlace => self.attributes.insert(folded, attr).map(|old| old.value),
        }
    }

    /// Attributes in section order
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// True when the section has no attributes
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<'a> IntoIterator for &'a Section {
    type Item = &'a Attribute;
    type IntoIter = indexmap::map::Values<'a, String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.values()
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len()))?;
        for attr in self.attributes.values() {
            map.serialize_entry(&attr.key, &attr.value)?;
        }
        map.end()
    }
}

/// Which branch a [`Store::set`] call took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The key existed in the section and was overridden
    Replaced,
    /// The section existed and the key was appended
    Appended,
    /// The section was created with the key as its first attribute
    CreatedSection,
}

/// Ordered collection of sections plus the raw text log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    sections: IndexMap<String, Section>,
    raw_lines: Vec<String>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact-match section lookup
    pub fn get_section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Look up a value by section header and key
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.get_section(section).and_then(|s| s.get(key))
    }

    /// Get a section for writing, appending it if it does not exist yet
    pub fn section_mut_or_insert(&mut self, name: &str) -> &mut Section {
        self.sections
            .entry(name.to_string())
            .or_insert_with(|| Section::new(name))
    }

    /// Define or override an attribute
    ///
    /// A blank section name targets [`DEFAULT_SECTION`].
    pub fn set(
        &mut self,
        section: &str,
        key: &str,
        value: &str,
        policy: OverridePolicy,
    ) -> SetOutcome {
        let name = if section.trim().is_empty() {
            DEFAULT_SECTION
        } else {
            section
        };

        match self.sections.get_mut(name) {
            Some(existing) if existing.contains_key(key) => {
                existing.set(key, value, policy);
                SetOutcome::Replaced
            }
            Some(existing) => {
                existing.set(key, value, policy);
                SetOutcome::Appended
            }
            None => {
                let mut created = Section::new(name);
                created.set(key, value, policy);
                self.sections.insert(name.to_string(), created);
                SetOutcome::CreatedSection
            }
        }
    }

    /// Sections in store order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when no section exists
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Every meaningful line read so far, comments stripped
    pub fn raw_lines(&self) -> &[String] {
        &self.raw_lines
    }

    pub(crate) fn push_raw_line(&mut self, line: &str) {
        self.raw_lines.push(line.to_string());
    }
}

impl Serialize for Store {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for (name, section) in &self.sections {
            map.serialize_entry(name, section)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(section: &Section) -> Vec<&str> {
        section.iter().map(|a| a.key.as_str()).collect()
    }

    #[test]
    fn test_section_lookup_is_case_insensitive() {
        let mut section = Section::new("[Network]");
        section.set("Host", "localhost", OverridePolicy::MoveToEnd);

        assert_eq!(section.get("host"), Some("localhost"));
        assert_eq!(section.get("HOST"), Some("localhost"));
        assert_eq!(section.attribute("hOsT").unwrap().key, "Host");
    }

    #[test]
    fn test_fold_matches_upper_cased_key() {
        let mut section = Section::new("[Addr]");
        section.set("straße", "Hauptstraße 1", OverridePolicy::MoveToEnd);

        assert_eq!(section.get("STRASSE"), Some("Hauptstraße 1"));
        assert_eq!(section.get("Straße"), Some("Hauptstraße 1"));

        section.set("STRASSE", "Ringstraße 2", OverridePolicy::MoveToEnd);
        assert_eq!(section.len(), 1);
        assert_eq!(section.get("straße"), Some("Ringstraße 2"));
    }

    #[test]
    fn test_override_move_to_end() {
        let mut section = Section::new("[A]");
        section.set("one", "1", OverridePolicy::MoveToEnd);
        section.set("two", "2", OverridePolicy::MoveToEnd);
        section.set("three", "3", OverridePolicy::MoveToEnd);

        let previous = section.set("ONE", "uno", OverridePolicy::MoveToEnd);

        assert_eq!(previous, Some("1".to_string()));
        assert_eq!(keys(&section), vec!["two", "three", "ONE"]);
        assert_eq!(section.get("one"), Some("uno"));
        assert_eq!(section.len(), 3);
    }

    #[test]
    fn test_override_in_place() {
        let mut section = Section::new("[A]");
        section.set("one", "1", OverridePolicy::InPlace);
        section.set("two", "2", OverridePolicy::InPlace);

        section.set("One", "uno", OverridePolicy::InPlace);

        assert_eq!(keys(&section), vec!["One", "two"]);
        assert_eq!(section.get("one"), Some("uno"));
    }

    #[test]
    fn test_store_set_branches() {
        let mut store = Store::new();

        assert_eq!(
            store.set("[Network]", "host", "a", OverridePolicy::MoveToEnd),
            SetOutcome::CreatedSection
        );
        assert_eq!(
            store.set("[Network]", "port", "80", OverridePolicy::MoveToEnd),
            SetOutcome::Appended
        );
        assert_eq!(
            store.set("[Network]", "HOST", "b", OverridePolicy::MoveToEnd),
            SetOutcome::Replaced
        );

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("[Network]", "host"), Some("b"));
        assert_eq!(store.get_section("[Network]").unwrap().len(), 2);
    }

    #[test]
    fn test_store_blank_section_is_default() {
        let mut store = Store::new();
        store.set("", "timeout", "30", OverridePolicy::MoveToEnd);
        store.set("   ", "retries", "3", OverridePolicy::MoveToEnd);

        let default = store.get_section(DEFAULT_SECTION).unwrap();
        assert_eq!(default.get("timeout"), Some("30"));
        assert_eq!(default.get("retries"), Some("3"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_section_names_are_exact() {
        let mut store = Store::new();
        store.set("[Network]", "host", "a", OverridePolicy::MoveToEnd);

        assert!(store.get_section("[network]").is_none());
        assert!(store.get_section("Network").is_none());
        assert!(store.get_section("[Network]").is_some());
    }

    #[test]
    fn test_section_mut_or_insert_keeps_order() {
        let mut store = Store::new();
        store.section_mut_or_insert("[B]");
        store.section_mut_or_insert("[A]");
        store.section_mut_or_insert("[B]");

        let names: Vec<&str> = store.sections().map(|s| s.name()).collect();
        assert_eq!(names, vec!["[B]", "[A]"]);
    }

    #[test]
    fn test_serialize_preserves_order() {
        let mut store = Store::new();
        store.set("[Z]", "Second", "2", OverridePolicy::MoveToEnd);
        store.set("[Z]", "first", "1", OverridePolicy::MoveToEnd);
        store.set("[A]", "k", "v", OverridePolicy::MoveToEnd);

        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"[Z]":{"Second":"2","first":"1"},"[A]":{"k":"v"}}"#);
    }
}
