//! Named per-vertex scalar arrays.
//!
//! A mesh carries any number of [`ScalarArray`]s keyed by name. Adding an
//! array whose name is already present replaces it in place, so rebuilding
//! an ROI mask never leaves a stale copy behind.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named scalar value per vertex.
///
/// # Example
///
/// ```
/// use mesh_types::ScalarArray;
///
/// let roi = ScalarArray::filled("model_ROI", 4, 0.0);
/// assert_eq!(roi.len(), 4);
/// assert_eq!(roi.get(2), Some(0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScalarArray {
    name: String,
    values: Vec<f64>,
}

impl ScalarArray {
    /// Create an array from values.
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Create an array of `len` copies of `value`.
    #[must_use]
    pub fn filled(name: impl Into<String>, len: usize, value: f64) -> Self {
        Self::new(name, vec![value; len])
    }

    /// Array name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the array, keeping its values.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the array holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a vertex index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Set the value at a vertex index. Out-of-range indices are ignored.
    ///
    /// Returns `true` if the value was written.
    pub fn set(&mut self, index: usize, value: f64) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// All values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Indices whose value is not zero.
    pub fn nonzero_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, _)| i)
    }
}

/// The set of named arrays attached to a mesh's vertices.
///
/// Insertion order is preserved. One array may be flagged as the active
/// scalars, which is what a host would colour the surface by.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointData {
    arrays: Vec<ScalarArray>,
    active: Option<String>,
}

impl PointData {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arrays: Vec::new(),
            active: None,
        }
    }

    /// Number of arrays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Whether no arrays are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Look up an array by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScalarArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Whether an array with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Attach an array, replacing any array with the same name.
    ///
    /// Returns the replaced array, if there was one.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{PointData, ScalarArray};
    ///
    /// let mut data = PointData::new();
    /// assert!(data.insert(ScalarArray::filled("roi", 3, 0.0)).is_none());
    /// let old = data.insert(ScalarArray::filled("roi", 3, 1.0));
    /// assert!(old.is_some());
    /// assert_eq!(data.len(), 1);
    /// ```
    pub fn insert(&mut self, array: ScalarArray) -> Option<ScalarArray> {
        if let Some(slot) = self.arrays.iter_mut().find(|a| a.name == array.name) {
            return Some(std::mem::replace(slot, array));
        }
        self.arrays.push(array);
        None
    }

    /// Detach an array by name.
    pub fn remove(&mut self, name: &str) -> Option<ScalarArray> {
        let pos = self.arrays.iter().position(|a| a.name == name)?;
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        Some(self.arrays.remove(pos))
    }

    /// Drop every array.
    pub fn clear(&mut self) {
        self.arrays.clear();
        self.active = None;
    }

    /// Mark an array as the active scalars.
    ///
    /// Returns `false` (and changes nothing) if no such array exists.
    pub fn set_active(&mut self, name: &str) -> bool {
        if self.contains(name) {
            self.active = Some(name.to_owned());
            true
        } else {
            false
        }
    }

    /// The active array, if any.
    #[must_use]
    pub fn active(&self) -> Option<&ScalarArray> {
        self.active.as_deref().and_then(|name| self.get(name))
    }

    /// Iterate over all arrays.
    pub fn iter(&self) -> impl Iterator<Item = &ScalarArray> {
        self.arrays.iter()
    }
}
