//! Property-based tests for the description codec and midpoint upkeep.
//!
//! Run with: cargo test -p mesh-landmarks -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use approx::assert_relative_eq;
use mesh_landmarks::{
    AutoConfirm, HardenedMesh, LandmarkCollection, LandmarkConfig, LandmarkDescription,
    LandmarkDescriptions, LandmarkId, LandmarkLogic, MidPoint, Projection, SurfaceModel,
};
use mesh_region::fixtures::uv_sphere;
use mesh_types::Point3;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_id() -> impl Strategy<Value = LandmarkId> {
    (0u32..20).prop_map(|n| LandmarkId::new(format!("F_{n}")))
}

fn arb_description() -> impl Strategy<Value = LandmarkDescription> {
    (
        "[A-Za-z0-9 _-]{0,12}",
        0u32..40,
        any::<bool>(),
        prop::option::of(0u32..5000),
        any::<bool>(),
        prop::option::of(arb_id()),
        prop::option::of(arb_id()),
        prop::collection::vec(arb_id(), 0..4),
    )
        .prop_map(
            |(label, quarter_radius, is_projected, index, is_mid_point, p1, p2, dependents)| {
                LandmarkDescription {
                    label,
                    // Quarter steps stay exact through JSON.
                    roi_radius: f64::from(quarter_radius) * 0.25,
                    projection: Projection {
                        is_projected,
                        closest_point_index: index,
                    },
                    mid_point: MidPoint {
                        is_mid_point,
                        point1: p1,
                        point2: p2,
                        defined_by_this_markup: dependents,
                    },
                }
            },
        )
}

fn arb_descriptions() -> impl Strategy<Value = LandmarkDescriptions> {
    prop::collection::btree_map(arb_id(), arb_description(), 0..8).prop_map(|map| {
        let mut descriptions = LandmarkDescriptions::new();
        for (id, d) in map {
            descriptions.insert(id, d);
        }
        descriptions
    })
}

fn legacy_encoding(descriptions: &LandmarkDescriptions) -> String {
    let map: serde_json::Map<String, serde_json::Value> = descriptions
        .iter()
        .map(|(id, d)| (id.to_string(), serde_json::to_value(d).unwrap()))
        .collect();
    serde_json::to_string(&map).unwrap().replace('"', "'")
}

fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-50.0..50.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

// =============================================================================
// Codec properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn proptest_versioned_document_reads_back(descriptions in arb_descriptions()) {
        let json = descriptions.to_json().unwrap();
        let decoded = LandmarkDescriptions::from_json(&json).unwrap();
        prop_assert_eq!(&decoded, &descriptions);
        prop_assert_eq!(decoded.to_json().unwrap(), json);
    }

    #[test]
    fn proptest_legacy_document_reads_back(descriptions in arb_descriptions()) {
        let legacy = legacy_encoding(&descriptions);
        let decoded = LandmarkDescriptions::from_json(&legacy).unwrap();
        prop_assert_eq!(decoded, descriptions);
    }

    #[test]
    fn proptest_arbitrary_input_never_panics(input in ".{0,64}") {
        let _ = LandmarkDescriptions::from_json(&input);
    }

    #[test]
    fn proptest_hop_count_never_exceeds_radius(radius in 0.0..1000.0f64) {
        let mut d = LandmarkDescription::new("a", true);
        d.roi_radius = radius;
        let hops = f64::from(d.hop_count());
        prop_assert!(hops <= radius.max(1.0));
        prop_assert!(radius == 0.0 || hops >= 1.0);
    }
}

// =============================================================================
// Midpoint properties
// =============================================================================

struct Free {
    logic: LandmarkLogic,
    collection: LandmarkCollection,
    model: SurfaceModel,
    snapshot: HardenedMesh,
}

/// A connected collection whose landmarks are not pinned to the surface.
fn free_landmarks(points: &[Point3<f64>]) -> (Free, Vec<LandmarkId>) {
    let mut logic = LandmarkLogic::new(
        LandmarkConfig::unattended()
            .with_project_on_surface_by_default(false)
            .with_allow_midpoint_parents(true),
    );
    let mut collection = LandmarkCollection::new("F", "F");
    let ids = points.iter().map(|p| collection.add(*p)).collect();
    let mut model = SurfaceModel::new("m", "m", uv_sphere(100.0, 8, 8));
    let snapshot = logic.model_changed(&mut model);
    logic
        .connect(&mut collection, &mut model, &snapshot, &mut AutoConfirm(true))
        .unwrap();
    (
        Free {
            logic,
            collection,
            model,
            snapshot,
        },
        ids,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_midpoint_chain_tracks_parents(
        start in prop::collection::vec(arb_point(), 3),
        moves in prop::collection::vec((0usize..3, arb_point()), 1..6),
    ) {
        let (mut f, ids) = free_landmarks(&start);
        let m = f.logic
            .define_midpoint(&mut f.collection, &ids[0], &ids[1], false, &f.snapshot, &f.model)
            .unwrap();
        let mm = f.logic
            .define_midpoint(&mut f.collection, &m, &ids[2], false, &f.snapshot, &f.model)
            .unwrap();

        for (which, to) in moves {
            f.collection.set_position(&ids[which], to);
            f.logic
                .landmark_moved(&mut f.collection, &ids[which], &f.snapshot, &mut f.model)
                .unwrap();

            let p = |id: &LandmarkId| f.collection.position(id).unwrap();
            assert_relative_eq!(p(&m), nalgebra::center(&p(&ids[0]), &p(&ids[1])), epsilon = 1e-9);
            assert_relative_eq!(p(&mm), nalgebra::center(&p(&m), &p(&ids[2])), epsilon = 1e-9);
        }
    }
}
