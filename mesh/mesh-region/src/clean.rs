//! Mesh cleaning.
//!
//! Merges coincident vertices and drops faces and vertices that no longer
//! contribute to the surface. Vertex indices change, so every per-vertex
//! array on the mesh is discarded and any index held elsewhere (projected
//! landmarks, ROI sets) has to be re-derived afterwards.

use hashbrown::{HashMap, HashSet};
use mesh_types::IndexedMesh;
use nalgebra::Point3;
use tracing::{debug, info};

/// Parameters for [`clean_mesh`].
///
/// # Example
///
/// ```
/// use mesh_region::CleanParams;
///
/// let params = CleanParams::default().with_weld_epsilon(1e-6);
/// assert_eq!(params.weld_epsilon, 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanParams {
    /// Vertices closer than this are merged into one.
    ///
    /// Zero merges only exactly coincident vertices.
    /// Default: `1e-9`
    pub weld_epsilon: f64,

    /// Triangles whose area is at or below this are removed.
    ///
    /// Default: `0.0` (only exactly flat triangles)
    pub degenerate_area_threshold: f64,
}

impl Default for CleanParams {
    fn default() -> Self {
        Self {
            weld_epsilon: 1e-9,
            degenerate_area_threshold: 0.0,
        }
    }
}

impl CleanParams {
    /// Set the weld distance.
    #[must_use]
    pub const fn with_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.weld_epsilon = epsilon;
        self
    }

    /// Set the degenerate area threshold.
    #[must_use]
    pub const fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }
}

/// What [`clean_mesh`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    /// Vertices merged into an earlier coincident vertex.
    pub vertices_merged: usize,
    /// Faces dropped because welding collapsed them to an edge or a point.
    pub faces_collapsed: usize,
    /// Faces dropped for having (near) zero area.
    pub degenerate_faces_removed: usize,
    /// Vertices dropped because no face referenced them.
    pub unreferenced_vertices_removed: usize,
    /// Per-vertex arrays discarded.
    pub arrays_cleared: usize,
}

impl CleanSummary {
    /// Whether cleaning changed the mesh topology.
    #[must_use]
    pub fn changed_topology(&self) -> bool {
        self.vertices_merged > 0
            || self.faces_collapsed > 0
            || self.degenerate_faces_removed > 0
            || self.unreferenced_vertices_removed > 0
    }
}

/// Clean a mesh in place.
///
/// Steps, in order: weld coincident vertices, drop collapsed faces, drop
/// degenerate faces, compact unreferenced vertices, clear point data.
/// Faces referencing missing vertices are dropped as collapsed.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_region::{CleanParams, clean_mesh};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0)); // duplicate of 1
/// mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([3, 4, 2]);
///
/// let summary = clean_mesh(&mut mesh, &CleanParams::default());
/// assert_eq!(summary.vertices_merged, 1);
/// assert_eq!(mesh.vertices.len(), 4);
/// assert_eq!(mesh.faces[1], [1, 3, 2]);
/// ```
pub fn clean_mesh(mesh: &mut IndexedMesh, params: &CleanParams) -> CleanSummary {
    info!(
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "Starting mesh clean"
    );

    let mut summary = CleanSummary::default();

    let remap = weld_remap(mesh, params.weld_epsilon);
    summary.vertices_merged = remap
        .iter()
        .enumerate()
        .filter(|&(i, &target)| target as usize != i)
        .count();

    let before = mesh.faces.len();
    let vertex_count = mesh.vertices.len();
    mesh.faces.retain_mut(|face| {
        if face.iter().any(|&i| i as usize >= vertex_count) {
            return false;
        }
        for i in face.iter_mut() {
            *i = remap[*i as usize];
        }
        face[0] != face[1] && face[1] != face[2] && face[0] != face[2]
    });
    summary.faces_collapsed = before - mesh.faces.len();

    let before = mesh.faces.len();
    let threshold = params.degenerate_area_threshold;
    let vertices = &mesh.vertices;
    mesh.faces.retain(|face| {
        triangle_area(
            &vertices[face[0] as usize].position,
            &vertices[face[1] as usize].position,
            &vertices[face[2] as usize].position,
        ) > threshold
    });
    summary.degenerate_faces_removed = before - mesh.faces.len();

    summary.unreferenced_vertices_removed = compact_vertices(mesh);

    summary.arrays_cleared = mesh.point_data.len();
    mesh.point_data.clear();

    info!(
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        merged = summary.vertices_merged,
        collapsed = summary.faces_collapsed,
        degenerate = summary.degenerate_faces_removed,
        unreferenced = summary.unreferenced_vertices_removed,
        "Mesh clean complete"
    );

    summary
}

/// For each vertex, the index of the earliest vertex it merges into.
#[allow(clippy::cast_possible_truncation)]
fn weld_remap(mesh: &IndexedMesh, epsilon: f64) -> Vec<u32> {
    let n = mesh.vertices.len();
    let mut remap: Vec<u32> = (0..n).map(|i| i as u32).collect();

    if epsilon <= 0.0 {
        let mut first: HashMap<[u64; 3], u32> = HashMap::new();
        for (idx, vertex) in mesh.vertices.iter().enumerate() {
            let key = exact_key(&vertex.position);
            let canonical = *first.entry(key).or_insert(idx as u32);
            remap[idx] = canonical;
        }
        return remap;
    }

    let cell_size = epsilon * 2.0;
    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        spatial_hash
            .entry(pos_to_cell(&vertex.position, cell_size))
            .or_default()
            .push(idx as u32);
    }

    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        if remap[idx] as usize != idx {
            continue;
        }
        let cell = pos_to_cell(&vertex.position, cell_size);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) =
                        spatial_hash.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz))
                    else {
                        continue;
                    };
                    for &other in candidates {
                        let o = other as usize;
                        if o <= idx || remap[o] as usize != o {
                            continue;
                        }
                        if (vertex.position - mesh.vertices[o].position).norm() <= epsilon {
                            remap[o] = idx as u32;
                        }
                    }
                }
            }
        }
    }

    remap
}

#[allow(clippy::cast_possible_truncation)]
fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}

fn exact_key(pos: &Point3<f64>) -> [u64; 3] {
    // +0.0 and -0.0 are the same point.
    [pos.x + 0.0, pos.y + 0.0, pos.z + 0.0].map(f64::to_bits)
}

fn triangle_area(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    (b - a).cross(&(c - a)).norm() * 0.5
}

/// Drop vertices no face references and renumber the rest in order.
#[allow(clippy::cast_possible_truncation)]
fn compact_vertices(mesh: &mut IndexedMesh) -> usize {
    let original = mesh.vertices.len();
    let referenced: HashSet<u32> = mesh.faces.iter().flatten().copied().collect();
    if referenced.len() == original {
        return 0;
    }

    let mut new_index = vec![u32::MAX; original];
    let mut kept = Vec::with_capacity(referenced.len());
    for (old, vertex) in mesh.vertices.iter().enumerate() {
        if referenced.contains(&(old as u32)) {
            new_index[old] = kept.len() as u32;
            kept.push(vertex.clone());
        }
    }

    for face in &mut mesh.faces {
        for i in face.iter_mut() {
            *i = new_index[*i as usize];
        }
    }

    mesh.vertices = kept;
    debug!(removed = original - mesh.vertices.len(), "Compacted vertices");
    original - mesh.vertices.len()
}
