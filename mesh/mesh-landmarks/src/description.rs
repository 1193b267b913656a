//! Per-landmark descriptions and their persisted form.
//!
//! A collection's descriptions are stored as one JSON document in its
//! `landmarkDescription` attribute:
//!
//! ```json
//! {"version": 1, "landmarks": {"F_0": {
//!     "landmarkLabel": "F-1",
//!     "ROIradius": 2.0,
//!     "projection": {"isProjected": true, "closestPointIndex": 35},
//!     "midPoint": {"isMidPoint": false, "Point1": null, "Point2": null,
//!                  "definedByThisMarkup": []}}}}
//! ```
//!
//! Older documents are a bare id-to-description map with every double
//! quote replaced by a single quote; [`LandmarkDescriptions::from_json`]
//! reads both. Writing always produces the versioned form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{LandmarkError, LandmarkId, LandmarkResult};

/// Version written by [`LandmarkDescriptions::to_json`].
pub const DESCRIPTION_VERSION: u32 = 1;

/// Surface projection state of a landmark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Whether the landmark is pinned to the surface.
    #[serde(rename = "isProjected")]
    pub is_projected: bool,

    /// Vertex of the current harden snapshot the landmark is pinned to.
    #[serde(rename = "closestPointIndex", default)]
    pub closest_point_index: Option<u32>,
}

/// Midpoint relationships of a landmark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidPoint {
    /// Whether this landmark is kept at the mean of two others.
    #[serde(rename = "isMidPoint")]
    pub is_mid_point: bool,

    /// First parent.
    #[serde(rename = "Point1", default)]
    pub point1: Option<LandmarkId>,

    /// Second parent.
    #[serde(rename = "Point2", default)]
    pub point2: Option<LandmarkId>,

    /// Midpoints that have this landmark as a parent.
    #[serde(rename = "definedByThisMarkup", default)]
    pub defined_by_this_markup: Vec<LandmarkId>,
}

/// Everything tracked about one landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkDescription {
    /// Display label.
    #[serde(rename = "landmarkLabel")]
    pub label: String,

    /// ROI radius as entered by the user; see [`hop_count`](Self::hop_count).
    #[serde(rename = "ROIradius", default)]
    pub roi_radius: f64,

    /// Projection state.
    #[serde(default)]
    pub projection: Projection,

    /// Midpoint state.
    #[serde(rename = "midPoint", default)]
    pub mid_point: MidPoint,
}

impl LandmarkDescription {
    /// A plain landmark with radius 0.
    #[must_use]
    pub fn new(label: impl Into<String>, is_projected: bool) -> Self {
        Self {
            label: label.into(),
            roi_radius: 0.0,
            projection: Projection {
                is_projected,
                closest_point_index: None,
            },
            mid_point: MidPoint::default(),
        }
    }

    /// Number of rings to expand around the projected vertex.
    ///
    /// Zero for a non-positive radius. Otherwise the first ring is always
    /// taken and the radius is truncated: `0.4 -> 1`, `2.9 -> 2`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_landmarks::LandmarkDescription;
    ///
    /// let mut d = LandmarkDescription::new("F-1", true);
    /// assert_eq!(d.hop_count(), 0);
    /// d.roi_radius = 0.4;
    /// assert_eq!(d.hop_count(), 1);
    /// d.roi_radius = 2.9;
    /// assert_eq!(d.hop_count(), 2);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn hop_count(&self) -> u32 {
        if self.roi_radius.is_nan() || self.roi_radius <= 0.0 {
            return 0;
        }
        // `as` saturates, so huge radii clamp to u32::MAX.
        (self.roi_radius.trunc() as u32).max(1)
    }

    /// Whether this landmark is a midpoint.
    #[must_use]
    pub fn is_midpoint(&self) -> bool {
        self.mid_point.is_mid_point
    }

    /// Both parents, if this is a midpoint with both recorded.
    #[must_use]
    pub fn parents(&self) -> Option<(&LandmarkId, &LandmarkId)> {
        if !self.mid_point.is_mid_point {
            return None;
        }
        Some((self.mid_point.point1.as_ref()?, self.mid_point.point2.as_ref()?))
    }

    /// Clear the projection and the radius.
    pub fn unproject(&mut self) {
        self.projection = Projection::default();
        self.roi_radius = 0.0;
    }

    /// Turn a midpoint back into an ordinary landmark.
    pub fn demote_midpoint(&mut self) {
        self.mid_point.is_mid_point = false;
        self.mid_point.point1 = None;
        self.mid_point.point2 = None;
    }
}

#[derive(Serialize, Deserialize)]
struct DescriptionDocument {
    version: u32,
    landmarks: BTreeMap<LandmarkId, LandmarkDescription>,
}

/// All descriptions of one collection, keyed by landmark id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkDescriptions {
    entries: BTreeMap<LandmarkId, LandmarkDescription>,
}

impl LandmarkDescriptions {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` has an entry.
    #[must_use]
    pub fn contains(&self, id: &LandmarkId) -> bool {
        self.entries.contains_key(id)
    }

    /// Look up an entry.
    #[must_use]
    pub fn get(&self, id: &LandmarkId) -> Option<&LandmarkDescription> {
        self.entries.get(id)
    }

    /// Look up an entry mutably.
    pub fn get_mut(&mut self, id: &LandmarkId) -> Option<&mut LandmarkDescription> {
        self.entries.get_mut(id)
    }

    /// Look up an entry, failing with [`LandmarkError::UnknownLandmark`].
    ///
    /// # Errors
    ///
    /// See above.
    pub fn require(&self, id: &LandmarkId) -> LandmarkResult<&LandmarkDescription> {
        self.entries
            .get(id)
            .ok_or_else(|| LandmarkError::UnknownLandmark(id.clone()))
    }

    /// Mutable counterpart of [`require`](Self::require).
    ///
    /// # Errors
    ///
    /// Fails with [`LandmarkError::UnknownLandmark`].
    pub fn require_mut(&mut self, id: &LandmarkId) -> LandmarkResult<&mut LandmarkDescription> {
        self.entries
            .get_mut(id)
            .ok_or_else(|| LandmarkError::UnknownLandmark(id.clone()))
    }

    /// Insert or replace an entry.
    pub fn insert(
        &mut self,
        id: LandmarkId,
        description: LandmarkDescription,
    ) -> Option<LandmarkDescription> {
        self.entries.insert(id, description)
    }

    /// Remove an entry.
    pub fn remove(&mut self, id: &LandmarkId) -> Option<LandmarkDescription> {
        self.entries.remove(id)
    }

    /// Iterate in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&LandmarkId, &LandmarkDescription)> {
        self.entries.iter()
    }

    /// Iterate mutably in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&LandmarkId, &mut LandmarkDescription)> {
        self.entries.iter_mut()
    }

    /// Id of the first entry carrying `label`.
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<&LandmarkId> {
        self.entries
            .iter()
            .find(|(_, d)| d.label == label)
            .map(|(id, _)| id)
    }

    /// Encode as a versioned JSON document.
    ///
    /// # Errors
    ///
    /// Fails only if serialization itself fails.
    pub fn to_json(&self) -> LandmarkResult<String> {
        let document = DescriptionDocument {
            version: DESCRIPTION_VERSION,
            landmarks: self.entries.clone(),
        };
        Ok(serde_json::to_string(&document)?)
    }

    /// Decode a versioned document or a legacy single-quoted map.
    ///
    /// # Errors
    ///
    /// Returns [`LandmarkError::Description`] for malformed input and
    /// [`LandmarkError::UnsupportedDescriptionVersion`] for a newer version.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_landmarks::{LandmarkDescriptions, LandmarkId};
    ///
    /// let legacy = "{'F_0': {'landmarkLabel': 'F-1', 'ROIradius': 0, \
    ///     'projection': {'isProjected': false, 'closestPointIndex': null}, \
    ///     'midPoint': {'isMidPoint': false, 'Point1': null, 'Point2': null, \
    ///     'definedByThisMarkup': []}}}";
    /// let descriptions = LandmarkDescriptions::from_json(legacy).unwrap();
    /// assert_eq!(descriptions.get(&LandmarkId::from("F_0")).unwrap().label, "F-1");
    ///
    /// let again = LandmarkDescriptions::from_json(&descriptions.to_json().unwrap()).unwrap();
    /// assert_eq!(again, descriptions);
    /// ```
    pub fn from_json(input: &str) -> LandmarkResult<Self> {
        let value: Value = match serde_json::from_str(input) {
            Ok(value) => value,
            Err(first) => serde_json::from_str(&input.replace('\'', "\""))
                .map_err(|_| LandmarkError::Description(first))?,
        };

        let versioned = value
            .as_object()
            .is_some_and(|o| o.contains_key("version") && o.contains_key("landmarks"));

        if versioned {
            let document: DescriptionDocument = serde_json::from_value(value)?;
            if document.version != DESCRIPTION_VERSION {
                return Err(LandmarkError::UnsupportedDescriptionVersion {
                    found: document.version,
                    expected: DESCRIPTION_VERSION,
                });
            }
            return Ok(Self {
                entries: document.landmarks,
            });
        }

        Ok(Self {
            entries: serde_json::from_value(value)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn id(s: &str) -> LandmarkId {
        LandmarkId::from(s)
    }

    #[test]
    fn hop_count_edges() {
        let mut d = LandmarkDescription::new("a", true);
        for (radius, hops) in [(-1.0, 0), (0.0, 0), (0.2, 1), (1.0, 1), (1.999, 1), (3.0, 3)] {
            d.roi_radius = radius;
            assert_eq!(d.hop_count(), hops, "radius {radius}");
        }
        d.roi_radius = f64::NAN;
        assert_eq!(d.hop_count(), 0);
    }

    #[test]
    fn wire_names_match_persisted_format() {
        let mut descriptions = LandmarkDescriptions::new();
        let mut d = LandmarkDescription::new("F-1", true);
        d.projection.closest_point_index = Some(35);
        d.roi_radius = 2.0;
        descriptions.insert(id("F_0"), d);

        let json = descriptions.to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let entry = &value["landmarks"]["F_0"];

        assert_eq!(value["version"], 1);
        assert_eq!(entry["landmarkLabel"], "F-1");
        assert_eq!(entry["ROIradius"], 2.0);
        assert_eq!(entry["projection"]["isProjected"], true);
        assert_eq!(entry["projection"]["closestPointIndex"], 35);
        assert_eq!(entry["midPoint"]["isMidPoint"], false);
        assert!(entry["midPoint"]["Point1"].is_null());
        assert_eq!(entry["midPoint"]["definedByThisMarkup"], serde_json::json!([]));
    }

    #[test]
    fn legacy_midpoint_document() {
        let legacy = "{'a': {'landmarkLabel': 'A', 'ROIradius': 1.5, \
            'projection': {'isProjected': true, 'closestPointIndex': 9}, \
            'midPoint': {'isMidPoint': false, 'Point1': null, 'Point2': null, 'definedByThisMarkup': ['m']}}, \
            'b': {'landmarkLabel': 'B', 'ROIradius': 0, \
            'projection': {'isProjected': false, 'closestPointIndex': null}, \
            'midPoint': {'isMidPoint': false, 'Point1': null, 'Point2': null, 'definedByThisMarkup': ['m']}}, \
            'm': {'landmarkLabel': 'M', 'ROIradius': 0, \
            'projection': {'isProjected': false, 'closestPointIndex': null}, \
            'midPoint': {'isMidPoint': true, 'Point1': 'a', 'Point2': 'b', 'definedByThisMarkup': []}}}";

        let d = LandmarkDescriptions::from_json(legacy).unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(d.get(&id("a")).unwrap().hop_count(), 1);
        assert_eq!(d.get(&id("a")).unwrap().projection.closest_point_index, Some(9));
        assert_eq!(d.get(&id("m")).unwrap().parents(), Some((&id("a"), &id("b"))));
        assert_eq!(d.find_by_label("B"), Some(&id("b")));
    }

    #[test]
    fn newer_version_is_rejected() {
        let err = LandmarkDescriptions::from_json(r#"{"version": 7, "landmarks": {}}"#).unwrap_err();
        assert!(matches!(
            err,
            LandmarkError::UnsupportedDescriptionVersion { found: 7, expected: 1 }
        ));
    }

    #[test]
    fn garbage_is_a_description_error() {
        assert!(matches!(
            LandmarkDescriptions::from_json("{not json"),
            Err(LandmarkError::Description(_))
        ));
        assert!(matches!(
            LandmarkDescriptions::from_json("[1, 2]"),
            Err(LandmarkError::Description(_))
        ));
    }

    #[test]
    fn empty_legacy_map() {
        assert!(LandmarkDescriptions::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn demote_and_unproject() {
        let mut d = LandmarkDescription::new("m", true);
        d.mid_point.is_mid_point = true;
        d.mid_point.point1 = Some(id("a"));
        d.mid_point.point2 = Some(id("b"));
        d.projection.closest_point_index = Some(3);
        d.roi_radius = 2.0;

        d.demote_midpoint();
        assert!(d.parents().is_none());
        d.unproject();
        assert_eq!(d.projection, Projection::default());
        assert_eq!(d.roi_radius, 0.0);
    }
}
