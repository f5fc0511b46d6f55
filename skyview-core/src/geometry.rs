/// Mesh objects, typed upload buffers and skybox partitioning
use nalgebra::{Point3, Vector3, Vector4};

use crate::normals::vertex_normals;
use crate::obj::ObjData;

/// A vertex as seen by a rasterizer: homogeneous position and unit normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector4<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn point(&self) -> Point3<f32> {
        Point3::new(self.position.x, self.position.y, self.position.z)
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

/// Flat data destined for one GPU buffer, with its layout next to it
#[derive(Debug, Clone, PartialEq)]
pub struct BufferData<T> {
    pub data: Vec<T>,
    /// Components per item (4 for positions, 3 for normals, ...)
    pub item_size: usize,
    /// Number of items, `data.len() / item_size`
    pub count: usize,
}

impl<T> BufferData<T> {
    pub fn new(data: Vec<T>, item_size: usize) -> Self {
        let count = if item_size == 0 { 0 } else { data.len() / item_size };
        Self {
            data,
            item_size,
            count,
        }
    }
}

/// Everything an external rasterizer needs to upload for one mesh
#[derive(Debug, Clone)]
pub struct MeshBuffers {
    pub positions: BufferData<f32>,
    pub indices: BufferData<u32>,
    pub normals: BufferData<f32>,
    pub tex_coords: Option<BufferData<f32>>,
}

/// A loaded mesh. Built once, never mutated while rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<f32>,
    indices: Vec<u32>,
    normals: Vec<f32>,
    tex_coords: Option<Vec<f32>>,
}

impl Mesh {
    /// Build a mesh from parsed data, deriving vertex normals.
    pub fn from_obj(data: ObjData) -> Self {
        let normals = vertex_normals(&data.positions, &data.indices);
        Self {
            positions: data.positions,
            indices: data.indices,
            normals,
            tex_coords: data.has_texture.then_some(data.tex_coords),
        }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn tex_coords(&self) -> Option<&[f32]> {
        self.tex_coords.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 4
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex(&self, index: u32) -> Vertex {
        let i = index as usize;
        let p = &self.positions[4 * i..4 * i + 4];
        let n = &self.normals[3 * i..3 * i + 3];
        Vertex {
            position: Vector4::new(p[0], p[1], p[2], p[3]),
            normal: Vector3::new(n[0], n[1], n[2]),
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).map(move |tri| Triangle {
            vertices: [self.vertex(tri[0]), self.vertex(tri[1]), self.vertex(tri[2])],
        })
    }

    pub fn buffers(&self) -> MeshBuffers {
        MeshBuffers {
            positions: BufferData::new(self.positions.clone(), 4),
            indices: BufferData::new(self.indices.clone(), 1),
            normals: BufferData::new(self.normals.clone(), 3),
            tex_coords: self
                .tex_coords
                .as_ref()
                .map(|tc| BufferData::new(tc.clone(), 2)),
        }
    }
}

/// The six skybox faces, in the order they are stored in the geometry file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkyboxFace {
    Front,
    Back,
    Top,
    Bottom,
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl SkyboxFace {
    pub const ALL: [SkyboxFace; 6] = [
        SkyboxFace::Front,
        SkyboxFace::Back,
        SkyboxFace::Top,
        SkyboxFace::Bottom,
        SkyboxFace::Right,
        SkyboxFace::Left,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Rotation applied to the face so its texture lands upright
    pub fn texture_rotation(self) -> (Axis, f32) {
        match self {
            SkyboxFace::Front => (Axis::Z, 180.0),
            SkyboxFace::Back => (Axis::Z, -90.0),
            SkyboxFace::Top => (Axis::Y, 0.0),
            SkyboxFace::Bottom => (Axis::Y, -90.0),
            SkyboxFace::Right => (Axis::X, 90.0),
            SkyboxFace::Left => (Axis::X, 180.0),
        }
    }
}

/// One skybox quad: 4 vertices, 2 triangles, 4 texture coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct SkyboxFaceMesh {
    pub positions: BufferData<f32>,
    pub indices: BufferData<u32>,
    pub tex_coords: BufferData<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkyboxGeometry {
    faces: Vec<SkyboxFaceMesh>,
}

impl SkyboxGeometry {
    /// Split a cube mesh into its six faces, rebasing each face's indices to `0..4`.
    ///
    /// The cube must list its 24 vertices, 12 triangles and 24 texture
    /// coordinates face by face, and each face's triangles must only
    /// reference that face's vertices.
    pub fn partition(data: &ObjData) -> Result<Self, String> {
        if data.vertex_count() != 24 {
            return Err(format!("expected 24 vertices, found {}", data.vertex_count()));
        }
        if data.triangle_count() != 12 {
            return Err(format!("expected 12 triangles, found {}", data.triangle_count()));
        }
        if data.tex_coords.len() != 48 {
            return Err(format!(
                "expected 24 texture coordinates, found {}",
                data.tex_coords.len() / 2
            ));
        }

        let mut faces = Vec::with_capacity(6);
        for f in 0..6 {
            let base = 4 * f as u32;
            let indices = data.indices[6 * f..6 * (f + 1)]
                .iter()
                .map(|&i| {
                    i.checked_sub(base)
                        .filter(|&local| local < 4)
                        .ok_or_else(|| format!("face {} references vertex {}", f, i + 1))
                })
                .collect::<Result<Vec<_>, _>>()?;
            faces.push(SkyboxFaceMesh {
                positions: BufferData::new(data.positions[16 * f..16 * (f + 1)].to_vec(), 4),
                indices: BufferData::new(indices, 1),
                tex_coords: BufferData::new(data.tex_coords[8 * f..8 * (f + 1)].to_vec(), 2),
            });
        }
        Ok(Self { faces })
    }

    pub fn face(&self, face: SkyboxFace) -> &SkyboxFaceMesh {
        &self.faces[face.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::parse_obj;

    const SKYBOX: &str = include_str!("../../assets/skybox.obj");

    #[test]
    fn test_mesh_from_obj() {
        let data = parse_obj("tri.obj", "v 0 0 0\nv 0 1 0\nv 1 0 0\nf 1 2 3\n").unwrap();
        let mesh = Mesh::from_obj(data);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.normals().len(), 9);
        assert!(mesh.tex_coords().is_none());

        let tri = mesh.triangles().next().unwrap();
        assert_eq!(tri.vertices[1].position, Vector4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(tri.vertices[2].normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_buffers_carry_layout() {
        let data = parse_obj("tri.obj", "v 0 0 0\nv 0 1 0\nv 1 0 0\nvt 0 0\nf 1 2 3\n").unwrap();
        let buffers = Mesh::from_obj(data).buffers();
        assert_eq!((buffers.positions.item_size, buffers.positions.count), (4, 3));
        assert_eq!((buffers.indices.item_size, buffers.indices.count), (1, 3));
        assert_eq!((buffers.normals.item_size, buffers.normals.count), (3, 3));
        let tex = buffers.tex_coords.unwrap();
        assert_eq!((tex.item_size, tex.count), (2, 1));
    }

    #[test]
    fn test_skybox_partition() {
        let data = parse_obj("skybox.obj", SKYBOX).unwrap();
        let skybox = SkyboxGeometry::partition(&data).unwrap();
        for face in SkyboxFace::ALL {
            let mesh = skybox.face(face);
            assert_eq!(mesh.positions.count, 4);
            assert_eq!(mesh.indices.data, vec![0, 1, 2, 0, 2, 3]);
            assert_eq!(mesh.tex_coords.count, 4);
        }
        assert_eq!(
            &skybox.face(SkyboxFace::Top).positions.data[..4],
            &[-1.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_skybox_partition_rejects_other_shapes() {
        let data = parse_obj("tri.obj", "v 0 0 0\nv 0 1 0\nv 1 0 0\nf 1 2 3\n").unwrap();
        assert!(SkyboxGeometry::partition(&data).is_err());

        let mut data = parse_obj("skybox.obj", SKYBOX).unwrap();
        data.indices[0] = 20;
        let err = SkyboxGeometry::partition(&data).unwrap_err();
        assert!(err.contains("face 0"));
    }
}
