//! Glint Core - scene graph and camera for the ray tracing engine.
//!
//! This crate provides:
//!
//! - **Scene graph types**: `Scene`, `Actor`, `Light`, `Material`,
//!   `TriangleMesh`
//! - **Camera**: view-reference frame, projection parameters, and the
//!   monotonic view timestamp the engine uses to invalidate cached
//!   per-frame state
//!
//! The engine itself lives in `glint_tracer`; this crate only describes
//! what gets rendered.

pub mod camera;
pub mod mesh;
pub mod scene;

// Re-export commonly used types
pub use camera::{Camera, CameraError, Projection};
pub use mesh::TriangleMesh;
pub use scene::{Actor, Color, Falloff, Light, Material, Scene, Transform};
