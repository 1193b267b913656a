//! Landmarks and landmark collections.

use std::fmt;

use mesh_transform::{Transform3D, harden_points};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AttributeStore, Attributes};

/// Stable landmark id, independent of the landmark's position in its
/// collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkId(String);

impl LandmarkId {
    /// Wrap an id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LandmarkId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for LandmarkId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A user-placed named point.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    /// Stable id.
    pub id: LandmarkId,
    /// Display label.
    pub label: String,
    /// Position in the collection's own coordinates.
    pub position: Point3<f64>,
}

/// An ordered list of landmarks with stable ids.
///
/// Ids are `"<collection id>_<n>"` with `n` taken from a counter that never
/// goes back, so an id is never reused after a removal. Labels default to
/// `"<collection name>-<n>"`.
///
/// # Example
///
/// ```
/// use mesh_landmarks::LandmarkCollection;
/// use mesh_types::Point3;
///
/// let mut points = LandmarkCollection::new("fid1", "F");
/// let a = points.add(Point3::new(0.0, 0.0, 0.0));
/// let b = points.add(Point3::new(1.0, 0.0, 0.0));
/// points.remove(&a);
/// let c = points.add(Point3::new(2.0, 0.0, 0.0));
///
/// assert_eq!(b.as_str(), "fid1_1");
/// assert_eq!(c.as_str(), "fid1_2");
/// assert_eq!(points.get(&c).map(|l| l.label.as_str()), Some("F-3"));
/// ```
#[derive(Debug, Clone)]
pub struct LandmarkCollection {
    id: String,
    name: String,
    landmarks: Vec<Landmark>,
    next_id: u64,
    transform: Option<Transform3D>,
    attributes: Attributes,
}

impl LandmarkCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            landmarks: Vec::new(),
            next_id: 0,
            transform: None,
            attributes: Attributes::new(),
        }
    }

    /// Collection id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of landmarks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    /// Whether the collection has no landmarks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Append a landmark with the default label.
    pub fn add(&mut self, position: Point3<f64>) -> LandmarkId {
        let label = format!("{}-{}", self.name, self.next_id + 1);
        self.add_labeled(label, position)
    }

    /// Append a landmark with an explicit label.
    pub fn add_labeled(&mut self, label: impl Into<String>, position: Point3<f64>) -> LandmarkId {
        let id = LandmarkId(format!("{}_{}", self.id, self.next_id));
        self.next_id += 1;
        self.landmarks.push(Landmark {
            id: id.clone(),
            label: label.into(),
            position,
        });
        id
    }

    /// Remove a landmark.
    pub fn remove(&mut self, id: &LandmarkId) -> Option<Landmark> {
        let index = self.index_of(id)?;
        Some(self.landmarks.remove(index))
    }

    /// Position of a landmark in the list.
    #[must_use]
    pub fn index_of(&self, id: &LandmarkId) -> Option<usize> {
        self.landmarks.iter().position(|l| &l.id == id)
    }

    /// Look up a landmark.
    #[must_use]
    pub fn get(&self, id: &LandmarkId) -> Option<&Landmark> {
        self.landmarks.iter().find(|l| &l.id == id)
    }

    /// Look up a landmark mutably.
    pub fn get_mut(&mut self, id: &LandmarkId) -> Option<&mut Landmark> {
        self.landmarks.iter_mut().find(|l| &l.id == id)
    }

    /// A landmark's position.
    #[must_use]
    pub fn position(&self, id: &LandmarkId) -> Option<Point3<f64>> {
        self.get(id).map(|l| l.position)
    }

    /// Move a landmark. Returns `false` if the id is unknown.
    pub fn set_position(&mut self, id: &LandmarkId, position: Point3<f64>) -> bool {
        match self.get_mut(id) {
            Some(landmark) => {
                landmark.position = position;
                true
            }
            None => false,
        }
    }

    /// First landmark carrying `label`.
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<&Landmark> {
        self.landmarks.iter().find(|l| l.label == label)
    }

    /// Iterate over landmarks in order.
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }

    /// Landmark ids in order.
    #[must_use]
    pub fn ids(&self) -> Vec<LandmarkId> {
        self.landmarks.iter().map(|l| l.id.clone()).collect()
    }

    /// Transform the host applies on top of the stored positions.
    #[must_use]
    pub fn transform(&self) -> Option<&Transform3D> {
        self.transform.as_ref()
    }

    /// Place the collection under a transform, or clear it.
    pub fn set_transform(&mut self, transform: Option<Transform3D>) {
        self.transform = transform;
    }

    /// Whether a non-identity transform is applied.
    #[must_use]
    pub fn is_under_transform(&self) -> bool {
        self.transform.is_some_and(|t| !t.is_identity())
    }

    /// Apply the transform to every position and drop it.
    ///
    /// Returns `true` if anything was hardened.
    pub fn harden_transform(&mut self) -> bool {
        let Some(transform) = self.transform.take() else {
            return false;
        };
        let positions: Vec<Point3<f64>> = self.landmarks.iter().map(|l| l.position).collect();
        let hardened = harden_points(&positions, Some(&transform));
        for (landmark, position) in self.landmarks.iter_mut().zip(hardened) {
            landmark.position = position;
        }
        debug!(collection = %self.id, landmarks = self.landmarks.len(), "Hardened collection transform");
        true
    }

    /// Attribute map.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl AttributeStore for LandmarkCollection {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.attribute(key)
    }

    fn set_attribute(&mut self, key: &str, value: String) {
        self.attributes.set_attribute(key, value);
    }

    fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.remove_attribute(key)
    }
}
