use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

/// An indexed triangle mesh ready for rendering.
///
/// Built from STL triangle soup by welding vertices with identical bit
/// patterns, so adjacent faces share vertices and smooth shading works.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<Point3<f32>>,
    /// Per-vertex normals; empty until [`Geometry::compute_vertex_normals`]
    /// runs.
    pub normals: Vec<Vector3<f32>>,
    pub faces: Vec<[u32; 3]>,
}

impl Geometry {
    /// Build an indexed mesh from raw triangles, welding exact-duplicate
    /// vertices.
    pub fn from_triangles(triangles: &[[Point3<f32>; 3]]) -> Self {
        let mut positions: Vec<Point3<f32>> = Vec::new();
        let mut faces: Vec<[u32; 3]> = Vec::with_capacity(triangles.len());
        // Exact bit-pattern keys: welding is only for vertices that are
        // byte-identical in the source file.
        let mut seen: HashMap<[u32; 3], u32> = HashMap::new();

        for triangle in triangles {
            let mut face = [0u32; 3];
            for (slot, vertex) in face.iter_mut().zip(triangle) {
                let key = [
                    vertex.x.to_bits(),
                    vertex.y.to_bits(),
                    vertex.z.to_bits(),
                ];
                let index = *seen.entry(key).or_insert_with(|| {
                    positions.push(*vertex);
                    (positions.len() - 1) as u32
                });
                *slot = index;
            }
            faces.push(face);
        }

        Self {
            positions,
            normals: Vec::new(),
            faces,
        }
    }

    /// Compute smooth per-vertex normals from face normals.
    ///
    /// Accumulates the (area-weighted) cross product of each face into its
    /// three vertices, then normalizes. Normals carried by the source file
    /// are not trusted and are never read.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.positions.len()];

        for face in &self.faces {
            let v0 = &self.positions[face[0] as usize];
            let v1 = &self.positions[face[1] as usize];
            let v2 = &self.positions[face[2] as usize];

            let e1 = v1 - v0;
            let e2 = v2 - v0;
            let face_normal = e1.cross(&e2);

            for &idx in face {
                normals[idx as usize] += face_normal;
            }
        }

        for normal in &mut normals {
            let len = normal.norm();
            if len > 1e-10 {
                *normal /= len;
            }
            // Degenerate faces contribute nothing; an untouched vertex keeps
            // a zero normal.
        }

        self.normals = normals;
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}
