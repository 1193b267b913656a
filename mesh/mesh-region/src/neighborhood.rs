//! Hop-count neighborhood expansion.
//!
//! Starting from a seed vertex, each hop adds the one-ring of every vertex
//! collected so far. After `k` hops the result is exactly the set of
//! vertices within `k` edges of the seed. Vertices in other connected
//! components are never reached.

use hashbrown::HashSet;
use tracing::debug;

use crate::{RegionError, RegionResult, VertexAdjacency};

/// Collect every vertex within `hop_count` edges of `seed`.
///
/// The seed itself is always part of the result; `hop_count == 0` returns
/// just the seed.
///
/// # Errors
///
/// Returns [`RegionError::InvalidVertexIndex`] if `seed` is not a vertex of
/// the graph.
///
/// # Example
///
/// ```
/// use mesh_region::{VertexAdjacency, expand_neighborhood, fixtures::uv_sphere};
///
/// let sphere = uv_sphere(100.0, 8, 8);
/// let adjacency = VertexAdjacency::from_mesh(&sphere);
///
/// let ring = expand_neighborhood(&adjacency, 9, 1).unwrap();
/// let mut ring: Vec<u32> = ring.into_iter().collect();
/// ring.sort_unstable();
/// assert_eq!(ring, vec![2, 3, 8, 9, 10, 15, 16]);
/// ```
pub fn expand_neighborhood(
    adjacency: &VertexAdjacency,
    seed: u32,
    hop_count: u32,
) -> RegionResult<HashSet<u32>> {
    if !adjacency.contains(seed) {
        return Err(RegionError::InvalidVertexIndex {
            index: seed,
            vertex_count: adjacency.vertex_count(),
        });
    }

    let mut result = HashSet::new();
    result.insert(seed);

    // Only the newest ring can contribute unseen vertices.
    let mut frontier = vec![seed];
    for _ in 0..hop_count {
        let mut next = Vec::new();
        for &v in &frontier {
            for &n in adjacency.neighbors(v) {
                if result.insert(n) {
                    next.push(n);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    debug!(seed, hop_count, size = result.len(), "Expanded neighborhood");

    Ok(result)
}

/// Union of the neighborhoods of several `(seed, hop_count)` pairs.
///
/// # Errors
///
/// Returns [`RegionError::InvalidVertexIndex`] for the first seed that is not
/// a vertex of the graph.
pub fn expand_neighborhoods(
    adjacency: &VertexAdjacency,
    seeds: impl IntoIterator<Item = (u32, u32)>,
) -> RegionResult<HashSet<u32>> {
    let mut result = HashSet::new();
    for (seed, hop_count) in seeds {
        result.extend(expand_neighborhood(adjacency, seed, hop_count)?);
    }
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fixtures::uv_sphere;
    use mesh_types::IndexedMesh;

    fn sorted(set: &HashSet<u32>) -> Vec<u32> {
        let mut v: Vec<u32> = set.iter().copied().collect();
        v.sort_unstable();
        v
    }

    fn sphere_adjacency() -> VertexAdjacency {
        VertexAdjacency::from_mesh(&uv_sphere(100.0, 8, 8))
    }

    #[test]
    fn one_hop_is_seed_plus_one_ring() {
        let adj = sphere_adjacency();
        let set = expand_neighborhood(&adj, 9, 1).unwrap();
        assert_eq!(sorted(&set), vec![2, 3, 8, 9, 10, 15, 16]);

        let mut ring: Vec<u32> = adj.neighbors(9).to_vec();
        ring.push(9);
        ring.sort_unstable();
        assert_eq!(sorted(&set), ring);
    }

    #[test]
    fn two_hops_around_35() {
        let adj = sphere_adjacency();
        let set = expand_neighborhood(&adj, 35, 2).unwrap();
        assert_eq!(
            sorted(&set),
            vec![
                21, 22, 23, 27, 28, 29, 30, 33, 34, 35, 36, 37, 40, 41, 42, 43, 47, 48, 49
            ]
        );
    }

    #[test]
    fn hops_two_and_three_around_9() {
        let adj = sphere_adjacency();
        assert_eq!(
            sorted(&expand_neighborhood(&adj, 9, 2).unwrap()),
            vec![0, 2, 3, 4, 8, 9, 10, 11, 14, 15, 16, 17, 21, 22, 23, 44, 45]
        );
        assert_eq!(
            sorted(&expand_neighborhood(&adj, 9, 3).unwrap()),
            vec![
                0, 2, 3, 4, 5, 8, 9, 10, 11, 12, 14, 15, 16, 17, 18, 20, 21, 22, 23, 24, 26,
                27, 28, 29, 30, 32, 38, 39, 44, 45, 46
            ]
        );
    }

    #[test]
    fn zero_hops_is_seed_only() {
        let adj = sphere_adjacency();
        assert_eq!(sorted(&expand_neighborhood(&adj, 4, 0).unwrap()), vec![4]);
    }

    #[test]
    fn large_hop_count_saturates_at_component() {
        let adj = sphere_adjacency();
        assert_eq!(expand_neighborhood(&adj, 0, 1000).unwrap().len(), 50);
    }

    #[test]
    fn disconnected_component_is_not_reached() {
        let mesh = IndexedMesh::from_raw(
            &[
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
                5.0, 0.0, 0.0, 6.0, 0.0, 0.0, 5.0, 1.0, 0.0,
            ],
            &[0, 1, 2, 3, 4, 5],
        );
        let adj = VertexAdjacency::from_mesh(&mesh);
        assert_eq!(sorted(&expand_neighborhood(&adj, 0, 5).unwrap()), vec![0, 1, 2]);
    }

    #[test]
    fn invalid_seed_is_an_error() {
        let adj = sphere_adjacency();
        let err = expand_neighborhood(&adj, 50, 1).unwrap_err();
        assert!(matches!(
            err,
            RegionError::InvalidVertexIndex {
                index: 50,
                vertex_count: 50
            }
        ));
    }

    #[test]
    fn union_of_seeds() {
        let adj = sphere_adjacency();
        let set = expand_neighborhoods(&adj, [(9, 1), (35, 0)]).unwrap();
        assert_eq!(sorted(&set), vec![2, 3, 8, 9, 10, 15, 16, 35]);
    }
}
