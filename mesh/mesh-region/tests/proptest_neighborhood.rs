//! Property-based tests for neighborhood expansion and ROI arrays.
//!
//! Run with: cargo test -p mesh-region -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used)]

use hashbrown::HashSet;
use mesh_region::{
    MeshRegion, PointLocator, VertexAdjacency, build_roi_array, expand_neighborhood,
};
use mesh_types::{IndexedMesh, Vertex};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_vertex() -> impl Strategy<Value = Vertex> {
    prop::array::uniform3(-100.0..100.0f64).prop_map(|[x, y, z]| Vertex::from_coords(x, y, z))
}

/// A mesh with valid face indices and at least one face.
fn arb_mesh() -> impl Strategy<Value = IndexedMesh> {
    (3usize..=40).prop_flat_map(|num_vertices| {
        prop::collection::vec(arb_vertex(), num_vertices).prop_flat_map(|verts| {
            let n = u32::try_from(verts.len()).unwrap();
            prop::collection::vec(prop::array::uniform3(0..n), 1..=60)
                .prop_map(move |faces| IndexedMesh::from_parts(verts.clone(), faces))
        })
    })
}

fn one_ring_closure(adjacency: &VertexAdjacency, set: &HashSet<u32>) -> HashSet<u32> {
    let mut out = set.clone();
    for &v in set {
        out.extend(adjacency.neighbors(v).iter().copied());
    }
    out
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_k_hops_is_closure_of_k_minus_one(mesh in arb_mesh(), seed_pick in any::<u32>(), k in 1u32..5) {
        let adjacency = VertexAdjacency::from_mesh(&mesh);
        let n = u32::try_from(mesh.vertices.len()).unwrap();
        let seed = seed_pick % n;

        let previous = expand_neighborhood(&adjacency, seed, k - 1).unwrap();
        let current = expand_neighborhood(&adjacency, seed, k).unwrap();

        prop_assert_eq!(current, one_ring_closure(&adjacency, &previous));
    }

    #[test]
    fn proptest_expansion_is_monotone_and_symmetric(mesh in arb_mesh(), seed_pick in any::<u32>(), k in 0u32..4) {
        let adjacency = VertexAdjacency::from_mesh(&mesh);
        let n = u32::try_from(mesh.vertices.len()).unwrap();
        let seed = seed_pick % n;

        let set = expand_neighborhood(&adjacency, seed, k).unwrap();
        let bigger = expand_neighborhood(&adjacency, seed, k + 1).unwrap();
        prop_assert!(set.contains(&seed));
        prop_assert!(set.is_subset(&bigger));

        // Hop distance is symmetric on an undirected graph.
        for &v in &set {
            let back = expand_neighborhood(&adjacency, v, k).unwrap();
            prop_assert!(back.contains(&seed));
        }
    }

    #[test]
    fn proptest_roi_array_is_idempotent(mesh in arb_mesh(), seed_pick in any::<u32>(), k in 0u32..3) {
        let adjacency = VertexAdjacency::from_mesh(&mesh);
        let n = u32::try_from(mesh.vertices.len()).unwrap();
        let set = expand_neighborhood(&adjacency, seed_pick % n, k).unwrap();
        let region = MeshRegion::from_vertices("roi", set.iter().copied());

        let a = build_roi_array(mesh.vertices.len(), &region);
        let b = build_roi_array(mesh.vertices.len(), &region);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.nonzero_indices().count(), set.len());
    }

    #[test]
    fn proptest_locator_finds_distance_zero_for_vertices(mesh in arb_mesh(), pick in any::<usize>()) {
        let locator = PointLocator::build(&mesh).unwrap();
        let i = pick % mesh.vertices.len();
        let hit = locator.closest(&mesh.vertices[i].position);

        // Random positions may coincide, so compare positions not indices.
        prop_assert!(hit.distance_squared.abs() < f64::EPSILON);
        prop_assert_eq!(&mesh.vertices[hit.index as usize], &mesh.vertices[i]);
    }
}
