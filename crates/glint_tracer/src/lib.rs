//! Whitted-style CPU ray tracing engine.
//!
//! The engine consumes a [`glint_core::Scene`] and a [`glint_core::Camera`]
//! and renders into any [`RenderTarget`]. Geometry queries run against a
//! two-level BVH: one per distinct mesh, shared by every actor instancing
//! that mesh, plus a top-level BVH over the instances. Shading is classic
//! recursive local illumination (ambient, diffuse, mirror reflection) with
//! depth and energy cutoffs, and rendering is either one ray per pixel or
//! deterministic adaptive supersampling.
//!
//! ```no_run
//! use std::sync::Arc;
//! use glint_core::{Actor, Camera, Scene, TriangleMesh};
//! use glint_math::Vec3;
//! use glint_tracer::{FrameBuffer, RayTracer, ScanMode};
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mesh = Arc::new(TriangleMesh::new(
//!     vec![Vec3::X, Vec3::Y, Vec3::Z],
//!     vec![0, 1, 2],
//!     None,
//! ));
//! let mut scene = Scene::new("triangle");
//! scene.add_actor(Actor::new("triangle", mesh));
//!
//! let mut tracer = RayTracer::new(Arc::new(scene), Camera::default());
//! let mut image = FrameBuffer::new(640, 480);
//! tracer.render(&mut image, ScanMode::Adaptive)?;
//! image.save_png("triangle.png")?;
//! # Ok(())
//! # }
//! ```

pub mod bvh;
pub mod instance;
pub mod model;
mod scan;
pub mod target;
pub mod tracer;
pub mod triangle;

pub use bvh::Bvh;
pub use instance::ModelInstance;
pub use model::{Intersection, Model};
pub use target::{FrameBuffer, RenderTarget};
pub use tracer::{RayTracer, RenderError, RenderStats, ScanMode};
pub use triangle::MeshTriangle;
