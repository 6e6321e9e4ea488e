//! Software rasterizer running user shader programs on the CPU.
//!
//! A `Scene` owns a frame buffer and a u16 z-buffer. `Scene::draw` runs the vertex stage of a
//! `ShaderProgram` over a vertex buffer and rasterizes the indexed triangles with edge functions,
//! perspective correct interpolation and depth testing. Fragment shaders read textures through a
//! `Sampler`.

pub mod scene;
pub mod texture;

pub use scene::buffer::{Buffer, Depth, FrameBuffer, ZBuffer, DEPTH_MAX};
pub use scene::shader::{ClipPosition, ShaderProgram};
pub use scene::Scene;
pub use texture::sampler::{FilterMode, Sampler, WrapMode};
pub use texture::{Texture, TextureError};
