//! String key/value attributes attached to models and collections.
//!
//! A host persists these with its scene, so everything the landmark layer
//! needs to survive a save/reload cycle is written here as a string.

use hashbrown::HashMap;

/// Attribute keys written by this crate.
pub mod keys {
    /// JSON landmark description document (on a collection).
    pub const LANDMARK_DESCRIPTION: &str = "landmarkDescription";
    /// Id of the model a collection is connected to.
    pub const CONNECTED_MODEL_ID: &str = "connectedModelID";
    /// Name of the current harden snapshot (on a model and its collection).
    pub const HARDEN_MODEL_ID: &str = "hardenModelID";
    /// ROI array name (on a collection).
    pub const ARRAY_NAME: &str = "arrayName";
    /// `"true"` once the mesh has been cleaned (on a model and its collection).
    pub const IS_CLEAN: &str = "isClean";
    /// Last propagation mode used (on a collection).
    pub const TYPE_OF_PROPAGATION: &str = "typeOfPropagation";
    /// JSON list of model ids last propagated to (on a collection).
    pub const MODEL_TO_PROP_LIST: &str = "modelToPropList";

    /// Every key this crate owns on a collection.
    pub const COLLECTION_KEYS: [&str; 7] = [
        LANDMARK_DESCRIPTION,
        CONNECTED_MODEL_ID,
        HARDEN_MODEL_ID,
        ARRAY_NAME,
        IS_CLEAN,
        TYPE_OF_PROPAGATION,
        MODEL_TO_PROP_LIST,
    ];
}

/// Anything that carries string attributes.
pub trait AttributeStore {
    /// Read an attribute.
    fn attribute(&self, key: &str) -> Option<&str>;

    /// Write an attribute, replacing any previous value.
    fn set_attribute(&mut self, key: &str, value: String);

    /// Remove an attribute, returning its value.
    fn remove_attribute(&mut self, key: &str) -> Option<String>;

    /// Read a boolean attribute.
    ///
    /// Accepts `"true"`/`"True"` and the older single-quoted object form
    /// `{'isClean': true}` keyed by `key`. Anything else is `false`.
    fn flag(&self, key: &str) -> bool {
        self.attribute(key).is_some_and(|raw| parse_flag(key, raw))
    }

    /// Write a boolean attribute.
    fn set_flag(&mut self, key: &str, value: bool) {
        self.set_attribute(key, value.to_string());
    }
}

fn parse_flag(key: &str, raw: &str) -> bool {
    match raw.trim() {
        "true" | "True" => true,
        wrapped if wrapped.starts_with('{') => {
            serde_json::from_str::<serde_json::Value>(&wrapped.replace('\'', "\""))
                .ok()
                .and_then(|doc| doc.get(key).and_then(serde_json::Value::as_bool))
                .unwrap_or(false)
        }
        _ => false,
    }
}

/// Plain in-memory attribute map.
///
/// # Example
///
/// ```
/// use mesh_landmarks::{AttributeStore, Attributes};
///
/// let mut attrs = Attributes::new();
/// attrs.set_flag("isClean", true);
/// assert!(attrs.flag("isClean"));
/// assert_eq!(attrs.attribute("isClean"), Some("true"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: HashMap<String, String>,
}

impl Attributes {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no attributes are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(key, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl AttributeStore for Attributes {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn set_attribute(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }

    fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replace_remove() {
        let mut attrs = Attributes::new();
        attrs.set_attribute(keys::ARRAY_NAME, "a_ROI".to_owned());
        attrs.set_attribute(keys::ARRAY_NAME, "b_ROI".to_owned());
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.attribute(keys::ARRAY_NAME), Some("b_ROI"));

        assert_eq!(attrs.remove_attribute(keys::ARRAY_NAME).as_deref(), Some("b_ROI"));
        assert!(attrs.is_empty());
    }

    #[test]
    fn flags_accept_python_spelling() {
        let mut attrs = Attributes::new();
        assert!(!attrs.flag(keys::IS_CLEAN));
        attrs.set_attribute(keys::IS_CLEAN, "True".to_owned());
        assert!(attrs.flag(keys::IS_CLEAN));
        attrs.set_flag(keys::IS_CLEAN, false);
        assert!(!attrs.flag(keys::IS_CLEAN));
    }

    #[test]
    fn flags_decode_quoted_object_form() {
        let mut attrs = Attributes::new();
        attrs.set_attribute(keys::IS_CLEAN, "{'isClean': true}".to_owned());
        assert!(attrs.flag(keys::IS_CLEAN));

        attrs.set_attribute(keys::IS_CLEAN, "{'isClean': false}".to_owned());
        assert!(!attrs.flag(keys::IS_CLEAN));

        // Another key inside the object does not count.
        attrs.set_attribute(keys::IS_CLEAN, "{'other': true}".to_owned());
        assert!(!attrs.flag(keys::IS_CLEAN));

        attrs.set_attribute(keys::IS_CLEAN, "{'isClean': tru".to_owned());
        assert!(!attrs.flag(keys::IS_CLEAN));
    }
}
