//! 3-D scene: meshes, per-node and per-material uniforms, and the visitor
//! contract through which renderers replay draws.
//!
//! Convention:
//! - right-handed world space, +Y up.
//! - bind group 1 carries the node, group 2 the material; group 0 belongs to the renderer.

mod layouts;
mod mesh;
mod mesh_scene;
mod source;
mod vertex;

pub use layouts::{MaterialUniforms, ModelUniforms, SceneLayouts};
pub use mesh::MeshData;
pub use mesh_scene::{MaterialId, MeshId, MeshScene, MeshSceneBuilder, NodeId};
pub use source::{Primitive, SceneSource, SceneVisitor};
pub use vertex::{Vertex, INDEX_FORMAT};
