//! Small linear algebra kit used by every pipeline stage.
//!
//! All types are plain `Copy` structs of `f32`. Matrices multiply column
//! vectors on the right; see [`mat4`] for the conventions.

pub mod mat4;
pub mod vec2;
pub mod vec3;
pub mod vec4;

pub use mat4::Mat4;
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;
