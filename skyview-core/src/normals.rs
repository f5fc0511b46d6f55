/// Per-vertex normals from averaged face normals
use nalgebra::Vector3;

use crate::math::{cross, difference, try_normalize};

/// xyz of vertex `index` in a 4-component position array
fn position(positions: &[f32], index: u32) -> Vector3<f32> {
    let base = 4 * index as usize;
    Vector3::new(positions[base], positions[base + 1], positions[base + 2])
}

/// Face normal of the triangle `(v0, v1, v2)`.
///
/// Computed as `cross(v2 - v0, v1 - v0)`, which points outward for meshes
/// wound clockwise when seen from outside. Zero-area triangles yield `None`.
pub fn face_normal(
    v0: &Vector3<f32>,
    v1: &Vector3<f32>,
    v2: &Vector3<f32>,
) -> Option<Vector3<f32>> {
    try_normalize(&cross(&difference(v2, v0), &difference(v1, v0)))
}

/// Compute one unit normal per vertex, returned as a flat xyz array
/// index-aligned with `positions` (which holds 4 entries per vertex).
///
/// Each triangle adds its unit face normal to its three vertices, unweighted
/// by area or angle; the sums are normalized at the end. Degenerate triangles
/// contribute nothing, and a vertex with no usable triangle keeps a zero
/// normal instead of NaN.
///
/// Panics if an index points past the end of `positions`.
pub fn vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = positions.len() / 4;
    let mut sums = vec![Vector3::<f32>::zeros(); vertex_count];

    for tri in indices.chunks_exact(3) {
        let v0 = position(positions, tri[0]);
        let v1 = position(positions, tri[1]);
        let v2 = position(positions, tri[2]);
        if let Some(normal) = face_normal(&v0, &v1, &v2) {
            for &index in tri {
                sums[index as usize] += normal;
            }
        }
    }

    let mut normals = Vec::with_capacity(vertex_count * 3);
    for sum in &sums {
        let unit = try_normalize(sum).unwrap_or_else(Vector3::zeros);
        normals.extend_from_slice(&[unit.x, unit.y, unit.z]);
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::parse_obj;
    use approx::assert_relative_eq;

    fn normal_at(normals: &[f32], v: usize) -> Vector3<f32> {
        Vector3::new(normals[3 * v], normals[3 * v + 1], normals[3 * v + 2])
    }

    #[test]
    fn test_operand_order() {
        // clockwise when seen from +z
        let positions = [
            0.0, 0.0, 0.0, 1.0, //
            0.0, 1.0, 0.0, 1.0, //
            1.0, 0.0, 0.0, 1.0,
        ];
        let normals = vertex_normals(&positions, &[0, 1, 2]);
        for v in 0..3 {
            assert_relative_eq!(normal_at(&normals, v), Vector3::new(0.0, 0.0, 1.0));
        }

        // counter-clockwise from +z faces away
        let normals = vertex_normals(&positions, &[0, 2, 1]);
        assert_relative_eq!(normal_at(&normals, 0), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_shared_vertices_average_unweighted() {
        // a small and a large triangle meeting at a right angle along the x axis
        let positions = [
            0.0, 0.0, 0.0, 1.0, //
            1.0, 0.0, 0.0, 1.0, //
            0.0, 0.1, 0.0, 1.0, //
            0.0, 0.0, 5.0, 1.0,
        ];
        let normals = vertex_normals(&positions, &[0, 2, 1, 0, 1, 3]);
        let shared = normal_at(&normals, 0);
        let expected = Vector3::new(0.0, 1.0, 1.0).normalize();
        assert_relative_eq!(shared, expected, epsilon = 1e-6);
        assert_relative_eq!(normal_at(&normals, 2), Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(normal_at(&normals, 3), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_normals_are_unit_length() {
        let octahedron = "\
v 1 0 0
v -1 0 0
v 0 1 0
v 0 -1 0
v 0 0 1
v 0 0 -1
f 1 3 5
f 3 2 5
f 2 4 5
f 4 1 5
f 3 1 6
f 2 3 6
f 4 2 6
f 1 4 6
";
        let data = parse_obj("octahedron.obj", octahedron).unwrap();
        let normals = vertex_normals(&data.positions, &data.indices);
        assert_eq!(normals.len(), 6 * 3);
        for v in 0..6 {
            assert_relative_eq!(normal_at(&normals, v).norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_unreferenced_and_degenerate() {
        let positions = [
            0.0, 0.0, 0.0, 1.0, //
            1.0, 0.0, 0.0, 1.0, //
            2.0, 0.0, 0.0, 1.0, //
            9.0, 9.0, 9.0, 1.0,
        ];
        // collinear triangle, vertex 3 unused
        let normals = vertex_normals(&positions, &[0, 1, 2]);
        assert!(normals.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_small_scale_triangle() {
        // cross product length is 1e-8, well above zero
        let positions = [
            0.0, 0.0, 0.0, 1.0, //
            0.0, 1e-4, 0.0, 1.0, //
            1e-4, 0.0, 0.0, 1.0,
        ];
        let normals = vertex_normals(&positions, &[0, 1, 2]);
        for v in 0..3 {
            assert_relative_eq!(
                normal_at(&normals, v),
                Vector3::new(0.0, 0.0, 1.0),
                epsilon = 1e-6
            );
        }
    }
}
