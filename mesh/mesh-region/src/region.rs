//! Named vertex sets.

use hashbrown::HashSet;
use mesh_types::ScalarArray;

/// The vertices gathered around a collection's landmarks, under the name of
/// the array that will show them.
///
/// Order is irrelevant; [`sorted_vertices`](Self::sorted_vertices) gives a
/// stable view for comparisons.
///
/// # Example
///
/// ```
/// use mesh_region::MeshRegion;
///
/// let roi = MeshRegion::from_vertices("F_ROI", [10, 11, 12, 10]);
/// assert_eq!(roi.name(), "F_ROI");
/// assert_eq!(roi.vertex_count(), 3);
/// assert!(roi.contains_vertex(11));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshRegion {
    name: String,
    vertices: HashSet<u32>,
}

impl MeshRegion {
    /// Region with no vertices.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_vertices(name, [])
    }

    /// Region over `vertices`; duplicates collapse.
    #[must_use]
    pub fn from_vertices(name: impl Into<String>, vertices: impl IntoIterator<Item = u32>) -> Self {
        Self {
            name: name.into(),
            vertices: vertices.into_iter().collect(),
        }
    }

    /// Recover the region an ROI array encodes: every index with a non-zero
    /// value, named after the array.
    #[must_use]
    pub fn from_scalar_array(array: &ScalarArray) -> Self {
        Self::from_vertices(
            array.name(),
            array
                .nonzero_indices()
                .filter_map(|i| u32::try_from(i).ok()),
        )
    }

    /// Name of the array this region is written to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Membership test.
    #[must_use]
    pub fn contains_vertex(&self, vertex_index: u32) -> bool {
        self.vertices.contains(&vertex_index)
    }

    /// Number of distinct vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// True when no landmark contributed a vertex.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Members in ascending order.
    #[must_use]
    pub fn sorted_vertices(&self) -> Vec<u32> {
        let mut sorted: Vec<u32> = self.vertices.iter().copied().collect();
        sorted.sort_unstable();
        sorted
    }

    /// One value per vertex: `1.0` for members, `0.0` elsewhere. Members at
    /// or past `vertex_count` are dropped.
    #[must_use]
    pub fn to_mask(&self, vertex_count: usize) -> Vec<f64> {
        let mut mask = vec![0.0; vertex_count];
        for &v in &self.vertices {
            if let Some(slot) = mask.get_mut(v as usize) {
                *slot = 1.0;
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_region_keeps_name() {
        let region = MeshRegion::new("scan0_ROI");
        assert_eq!(region.name(), "scan0_ROI");
        assert!(region.is_empty());
        assert_eq!(region.sorted_vertices(), Vec::<u32>::new());
    }

    #[test]
    fn mask_drops_members_past_the_end() {
        let region = MeshRegion::from_vertices("roi", [1, 3, 9]);
        assert_eq!(region.to_mask(4), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn array_reads_back_as_region() {
        let array = ScalarArray::new("F_ROI", vec![0.0, 1.0, 0.0, 1.0]);
        let region = MeshRegion::from_scalar_array(&array);
        assert_eq!(region.name(), "F_ROI");
        assert_eq!(region.sorted_vertices(), vec![1, 3]);
        assert_eq!(region.to_mask(4), array.values());
    }
}
