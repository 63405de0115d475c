//! Vale headless viewer.
//!
//! Builds ground meshes for streamed tiles and walks a camera over them.

pub mod mesh;
pub mod platform;
pub mod viewer;
