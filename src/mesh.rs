//! Triangle meshes: the built-in primitives and the OBJ loader.
//!
//! A [`Mesh`] is immutable once built. Indices are validated on
//! construction, so the render stages can index without bounds surprises.

use std::io::BufRead;
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::math::{Vec3, Vec4};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load OBJ file '{path}'")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("{kind} index {index} out of range (only {len} available)")]
    IndexOutOfRange {
        kind: &'static str,
        index: u32,
        len: usize,
    },

    #[error("mesh '{0}' contains no triangles")]
    Empty(String),
}

/// One triangle: three indices into each of the vertex, texture coordinate
/// and normal arrays of its mesh. All indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [u32; 3],
    pub texcoords: [u32; 3],
    pub normals: [u32; 3],
}

impl Triangle {
    /// A triangle whose three attribute index sets are identical.
    pub const fn uniform(indices: [u32; 3]) -> Self {
        Self {
            vertices: indices,
            texcoords: indices,
            normals: indices,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vec4>,
    /// `(u, v, unused)`
    texcoords: Vec<Vec3>,
    normals: Vec<Vec3>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Builds a mesh, checking every triangle index against its array.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vec4>,
        texcoords: Vec<Vec3>,
        normals: Vec<Vec3>,
        triangles: Vec<Triangle>,
    ) -> Result<Self, LoadError> {
        let name = name.into();
        if triangles.is_empty() {
            return Err(LoadError::Empty(name));
        }

        for triangle in &triangles {
            check_indices("vertex", &triangle.vertices, vertices.len())?;
            check_indices("texture coordinate", &triangle.texcoords, texcoords.len())?;
            check_indices("normal", &triangle.normals, normals.len())?;
        }

        Ok(Self {
            name,
            vertices,
            texcoords,
            normals,
            triangles,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vec4] {
        &self.vertices
    }

    pub fn texcoords(&self) -> &[Vec3] {
        &self.texcoords
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Axis-aligned cube of edge 1 centred on the origin, counter-clockwise
    /// when seen from outside, one normal and a full `[0, 1]²` UV square per
    /// face.
    pub fn unit_cube() -> Self {
        const H: f32 = 0.5;
        let vertices = vec![
            Vec4::point(-H, -H, -H),
            Vec4::point(H, -H, -H),
            Vec4::point(H, H, -H),
            Vec4::point(-H, H, -H),
            Vec4::point(-H, -H, H),
            Vec4::point(H, -H, H),
            Vec4::point(H, H, H),
            Vec4::point(-H, H, H),
        ];
        let texcoords = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let normals = vec![
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        ];

        // Each quad lists its corners bottom-left, bottom-right, top-right,
        // top-left as seen from outside.
        let faces: [[u32; 4]; 6] = [
            [4, 5, 6, 7], // front  (+Z)
            [1, 0, 3, 2], // back   (-Z)
            [5, 1, 2, 6], // right  (+X)
            [0, 4, 7, 3], // left   (-X)
            [7, 6, 2, 3], // top    (+Y)
            [0, 1, 5, 4], // bottom (-Y)
        ];

        let triangles = faces
            .iter()
            .zip(0u32..)
            .flat_map(|(&[a, b, c, d], normal)| {
                [
                    Triangle {
                        vertices: [a, b, c],
                        texcoords: [0, 1, 2],
                        normals: [normal; 3],
                    },
                    Triangle {
                        vertices: [a, c, d],
                        texcoords: [0, 2, 3],
                        normals: [normal; 3],
                    },
                ]
            })
            .collect();

        Self {
            name: "cube".to_string(),
            vertices,
            texcoords,
            normals,
            triangles,
        }
    }

    /// Unit-radius UV sphere with `segments` slices around Y and `rings`
    /// stacks from pole to pole. Normals point outward; pole triangles that
    /// would collapse to a line are omitted.
    pub fn uv_sphere(segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        let mut texcoords = Vec::with_capacity(vertices.capacity());
        let mut normals = Vec::with_capacity(vertices.capacity());

        for ring in 0..=rings {
            let theta = ring as f32 * std::f32::consts::PI / rings as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            for segment in 0..=segments {
                let phi = segment as f32 * std::f32::consts::TAU / segments as f32;
                let (sin_phi, cos_phi) = phi.sin_cos();

                // phi = 0 faces +Z and grows toward +X.
                let p = Vec3::new(sin_theta * sin_phi, cos_theta, sin_theta * cos_phi);
                vertices.push(Vec4::from_vec3(p, 1.0));
                normals.push(p);
                texcoords.push(Vec3::new(
                    segment as f32 / segments as f32,
                    1.0 - ring as f32 / rings as f32,
                    0.0,
                ));
            }
        }

        let stride = segments + 1;
        let mut triangles = Vec::with_capacity((rings * segments * 2) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let top_left = ring * stride + segment;
                let bottom_left = top_left + stride;
                let bottom_right = bottom_left + 1;
                let top_right = top_left + 1;

                if ring + 1 != rings {
                    triangles.push(Triangle::uniform([top_left, bottom_left, bottom_right]));
                }
                if ring != 0 {
                    triangles.push(Triangle::uniform([top_left, bottom_right, top_right]));
                }
            }
        }

        Self {
            name: "sphere".to_string(),
            vertices,
            texcoords,
            normals,
            triangles,
        }
    }

    // =========================================================================
    // OBJ loading
    // =========================================================================

    /// Loads every object of an OBJ file into one mesh.
    ///
    /// Polygons are fan-triangulated. Objects without normals get flat face
    /// normals; objects without texture coordinates get a single `(0, 0)`.
    pub fn from_obj(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let (models, _materials) =
            tobj::load_obj(path, &load_options()).map_err(|source| LoadError::Obj {
                path: path.display().to_string(),
                source,
            })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "obj".to_string());
        let mesh = Self::from_models(name, &models)?;

        info!(
            "loaded '{}': {} vertices, {} triangles from {} object(s)",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count(),
            models.len()
        );
        Ok(mesh)
    }

    /// Like [`from_obj`](Self::from_obj) but reads OBJ text from a reader.
    /// `mtllib` statements are ignored.
    pub fn from_obj_reader(name: &str, reader: &mut impl BufRead) -> Result<Self, LoadError> {
        let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|source| LoadError::Obj {
            path: name.to_string(),
            source,
        })?;

        Self::from_models(name.to_string(), &models)
    }

    fn from_models(name: String, models: &[tobj::Model]) -> Result<Self, LoadError> {
        let mut vertices = Vec::new();
        let mut texcoords = Vec::new();
        let mut normals = Vec::new();
        let mut triangles = Vec::new();

        for model in models {
            let m = &model.mesh;
            let vertex_base = vertices.len() as u32;

            vertices.extend(
                m.positions
                    .chunks_exact(3)
                    .map(|p| Vec4::point(p[0], p[1], p[2])),
            );
            let local_vertices = &vertices[vertex_base as usize..];

            let has_texcoords = !m.texcoords.is_empty() && m.texcoord_indices.len() == m.indices.len();
            let has_normals = !m.normals.is_empty() && m.normal_indices.len() == m.indices.len();

            let texcoord_base = texcoords.len() as u32;
            if has_texcoords {
                texcoords.extend(m.texcoords.chunks_exact(2).map(|t| Vec3::new(t[0], t[1], 0.0)));
            } else {
                texcoords.push(Vec3::ZERO);
            }

            let normal_base = normals.len() as u32;
            if has_normals {
                normals.extend(m.normals.chunks_exact(3).map(|n| Vec3::new(n[0], n[1], n[2])));
            }

            for (face, idx) in m.indices.chunks_exact(3).enumerate() {
                let corners = [idx[0], idx[1], idx[2]];
                check_indices("vertex", &corners, local_vertices.len())?;

                let texcoord = if has_texcoords {
                    let t = &m.texcoord_indices[face * 3..face * 3 + 3];
                    [texcoord_base + t[0], texcoord_base + t[1], texcoord_base + t[2]]
                } else {
                    [texcoord_base; 3]
                };

                let normal = if has_normals {
                    let n = &m.normal_indices[face * 3..face * 3 + 3];
                    [normal_base + n[0], normal_base + n[1], normal_base + n[2]]
                } else {
                    let [a, b, c] = corners.map(|i| local_vertices[i as usize].to_vec3());
                    normals.push((b - a).cross(c - a).normalize_or_zero());
                    [normals.len() as u32 - 1; 3]
                };

                triangles.push(Triangle {
                    vertices: corners.map(|i| vertex_base + i),
                    texcoords: texcoord,
                    normals: normal,
                });
            }
        }

        Self::new(name, vertices, texcoords, normals, triangles)
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: false,
        ..Default::default()
    }
}

fn check_indices(kind: &'static str, indices: &[u32; 3], len: usize) -> Result<(), LoadError> {
    match indices.iter().find(|&&i| i as usize >= len) {
        Some(&index) => Err(LoadError::IndexOutOfRange { kind, index, len }),
        None => Ok(()),
    }
}
