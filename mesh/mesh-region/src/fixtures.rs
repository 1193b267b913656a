//! Reference meshes for tests and examples.

use std::f64::consts::PI;

use mesh_types::{IndexedMesh, Vertex};

/// Latitude/longitude sphere centred at the origin.
///
/// Vertex 0 is the north pole and vertex 1 the south pole. The remaining
/// vertices follow longitude by longitude, each column running from the
/// ring nearest the north pole towards the south. Faces are the north cap,
/// then the south cap, then two triangles per band quad.
///
/// `theta_res` is the number of longitudes, `phi_res` the number of
/// latitude samples pole to pole (poles included). Both are clamped to at
/// least 3. With `8 x 8` the sphere has 50 vertices and 96 triangles.
///
/// # Example
///
/// ```
/// use mesh_region::fixtures::uv_sphere;
///
/// let sphere = uv_sphere(100.0, 8, 8);
/// assert_eq!(sphere.vertices.len(), 50);
/// assert_eq!(sphere.faces.len(), 96);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn uv_sphere(radius: f64, theta_res: u32, phi_res: u32) -> IndexedMesh {
    let theta_res = theta_res.max(3);
    let phi_res = phi_res.max(3);

    let ring_len = phi_res - 2;
    let base = ring_len * theta_res;
    let d_phi = PI / f64::from(phi_res - 1);
    let d_theta = 2.0 * PI / f64::from(theta_res);

    let mut mesh = IndexedMesh::with_capacity(
        (base + 2) as usize,
        (2 * theta_res + 2 * theta_res * (ring_len - 1)) as usize,
    );

    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, radius));
    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, -radius));

    for i in 0..theta_res {
        let theta = f64::from(i) * d_theta;
        for j in 1..phi_res - 1 {
            let phi = f64::from(j) * d_phi;
            let r = radius * phi.sin();
            mesh.vertices.push(Vertex::from_coords(
                r * theta.cos(),
                r * theta.sin(),
                radius * phi.cos(),
            ));
        }
    }

    // North cap.
    for i in 0..theta_res {
        mesh.faces
            .push([ring_len * i + 2, (ring_len * (i + 1)) % base + 2, 0]);
    }

    // South cap.
    let last = ring_len + 1;
    for i in 0..theta_res {
        mesh.faces
            .push([ring_len * i + last, 1, (ring_len * (i + 1)) % base + last]);
    }

    // Bands.
    for i in 0..theta_res {
        for j in 0..ring_len - 1 {
            let a = ring_len * i + j + 2;
            let c = (ring_len * (i + 1) + j) % base + 3;
            mesh.faces.push([a, a + 1, c]);
            mesh.faces.push([a, c, c - 1]);
        }
    }

    mesh
}
