//! User record entity
//!
//! A flat, insertion-ordered field map produced from one user properties page.
//! The requested identifier is always stored under [`QUERIED_USER_ID`] and can
//! not be clobbered by fields parsed out of the page.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Opaque identifier supplied by the caller. Duplicates within a batch are allowed.
pub type Identifier = String;

/// Key under which the requested identifier is stored in every record
pub const QUERIED_USER_ID: &str = "queried_user_id";

/// Mapping from field name to field value for a single queried user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    identifier: Identifier,
    fields: Vec<(String, String)>,
}

impl UserRecord {
    /// Create a record holding only the queried identifier
    pub fn new(identifier: impl Into<Identifier>) -> Self {
        Self {
            identifier: identifier.into(),
            fields: Vec::new(),
        }
    }

    /// The identifier this record was requested for
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Insert or overwrite a parsed field.
    ///
    /// Returns `false` when the key is the protected [`QUERIED_USER_ID`] key,
    /// in which case the record is left untouched.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if key == QUERIED_USER_ID {
            return false;
        }
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        true
    }

    /// Merge key/value pairs positionally. The shorter side bounds the zip,
    /// so extra keys or values are silently dropped.
    ///
    /// Returns the number of pairs zipped (including any that hit the protected key).
    pub fn merge_zipped<K, V>(&mut self, keys: K, values: V) -> usize
    where
        K: IntoIterator,
        K::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let mut zipped = 0;
        for (key, value) in keys.into_iter().zip(values) {
            self.insert(key, value);
            zipped += 1;
        }
        zipped
    }

    /// Look up a field, including the queried identifier
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == QUERIED_USER_ID {
            return Some(&self.identifier);
        }
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All keys in insertion order, starting with [`QUERIED_USER_ID`]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(QUERIED_USER_ID).chain(self.fields.iter().map(|(k, _)| k.as_str()))
    }

    /// All key/value pairs in insertion order, starting with [`QUERIED_USER_ID`]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once((QUERIED_USER_ID, self.identifier.as_str()))
            .chain(self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Number of entries, counting the queried identifier
    pub fn len(&self) -> usize {
        self.fields.len() + 1
    }

    /// A record always carries its identifier, so it is never empty
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Number of fields merged from the page, excluding the identifier
    pub fn parsed_field_count(&self) -> usize {
        self.fields.len()
    }
}

impl Serialize for UserRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
