//! The ray tracing engine: primary ray generation, recursive Whitted-style
//! shading, and the uniform scan strategy.
//!
//! A `RayTracer` is built once from a scene and a camera. Construction
//! refines every visible actor's mesh into triangles, builds one BVH per
//! distinct mesh, wraps each actor in a transformed instance sharing its
//! mesh BVH, and finally builds a top-level BVH over the instances.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use thiserror::Error;

use glint_core::{Camera, Color, Projection, Scene};
use glint_math::{Interval, Ray, Vec3};

use crate::bvh::Bvh;
use crate::instance::ModelInstance;
use crate::model::{Intersection, Model};
use crate::scan;
use crate::target::RenderTarget;
use crate::triangle::MeshTriangle;

/// Hard ceiling on the reflection recursion depth.
pub const MAX_RECURSION_LEVEL: u32 = 6;

/// Hard floor on the energy weight below which recursion stops.
pub const MIN_WEIGHT: f32 = 0.01;

/// Offset applied along the surface normal before casting shadow rays.
const SHADOW_BIAS: f32 = 0.01;

/// Minimum parameter of reflection rays, so they do not re-hit their origin.
const REFLECTION_BIAS: f32 = 1e-4;

/// Pixel sampling strategy for a render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// One ray through each pixel center. No anti-aliasing.
    Uniform,
    /// Deterministic adaptive supersampling at up to quarter-pixel
    /// resolution where neighboring samples disagree.
    Adaptive,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render target has no pixels ({0}x{1})")]
    EmptyTarget(u32, u32),
}

/// Diagnostics from one render call.
#[derive(Debug, Clone, Copy)]
pub struct RenderStats {
    /// Rays traced, primary and reflection.
    pub rays: u64,
    /// Rays that hit geometry.
    pub hits: u64,
    pub duration: Duration,
}

/// Cached per-render view state: the view reference coordinate basis and
/// the pixel-to-window mapping. Rebuilt whenever the camera's view stamp
/// or the target size changes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub(crate) width: u32,
    pub(crate) height: u32,
    stamp: u64,
    /// Basis: u right, v up, n back toward the viewer.
    vrc_u: Vec3,
    vrc_v: Vec3,
    vrc_n: Vec3,
    /// View window extent in world units.
    v_w: f32,
    v_h: f32,
    /// Reciprocal image extent in pixels.
    i_w: f32,
    i_h: f32,
    position: Vec3,
    distance: f32,
    projection: Projection,
}

impl Frame {
    fn new(camera: &Camera, width: u32, height: u32, stamp: u64) -> Self {
        let vrc_n = camera.view_plane_normal();
        let vrc_v = camera.view_up();
        let vrc_u = vrc_v.cross(vrc_n);

        // The window height covers the image's smaller dimension; the other
        // dimension is scaled by the pixel aspect.
        let window = camera.window_height();
        let (v_w, v_h) = if width >= height {
            (window * width as f32 / height as f32, window)
        } else {
            (window, window * height as f32 / width as f32)
        };

        Self {
            width,
            height,
            stamp,
            vrc_u,
            vrc_v,
            vrc_n,
            v_w,
            v_h,
            i_w: 1.0 / width as f32,
            i_h: 1.0 / height as f32,
            position: camera.position(),
            distance: camera.distance(),
            projection: camera.projection(),
        }
    }

    /// Point on the view window for a pixel-space coordinate.
    ///
    /// `x` grows rightward, `y` downward, both in pixel units with (0, 0)
    /// the top-left image corner.
    fn window_point(&self, x: f32, y: f32) -> Vec3 {
        self.v_w * (x * self.i_w - 0.5) * self.vrc_u + self.v_h * (0.5 - y * self.i_h) * self.vrc_v
    }

    /// Primary ray through the pixel-space coordinate (x, y).
    pub(crate) fn pixel_ray(&self, x: f32, y: f32) -> Ray {
        let p = self.window_point(x, y);
        match self.projection {
            Projection::Perspective => {
                let through = p - self.distance * self.vrc_n;
                Ray::new(self.position, through.normalize())
            }
            Projection::Parallel => Ray::new(self.position + p, -self.vrc_n),
        }
    }
}

/// Whitted-style recursive ray tracer over a static scene.
pub struct RayTracer {
    scene: Arc<Scene>,
    camera: Camera,
    aggregate: Bvh,
    max_recursion_level: u32,
    min_weight: f32,
    rays: AtomicU64,
    hits: AtomicU64,
    frame: Option<Frame>,
}

impl RayTracer {
    /// Build the engine for a scene, constructing all acceleration
    /// structures up front.
    pub fn new(scene: Arc<Scene>, camera: Camera) -> Self {
        let start = Instant::now();

        let mut mesh_bvhs: HashMap<u64, Arc<Bvh>> = HashMap::new();
        let mut instances: Vec<Box<dyn Model>> = Vec::new();

        for actor in scene.actors() {
            if !actor.visible {
                continue;
            }
            let bvh = mesh_bvhs
                .entry(actor.mesh.id)
                .or_insert_with(|| {
                    let triangles: Vec<Box<dyn Model>> = (0..actor.mesh.triangle_count())
                        .map(|face| {
                            Box::new(MeshTriangle::new(actor.mesh.clone(), face))
                                as Box<dyn Model>
                        })
                        .collect();
                    Arc::new(Bvh::build(triangles))
                })
                .clone();
            instances.push(Box::new(ModelInstance::new(
                bvh,
                actor.mesh.clone(),
                actor.model_matrix(),
                actor.material.clone(),
            )));
        }

        let instance_count = instances.len();
        let aggregate = Bvh::build(instances);
        log::info!(
            "built BVHs for {} instances of {} meshes ({} triangles, {} top-level nodes) in {:.2?}",
            instance_count,
            mesh_bvhs.len(),
            scene.total_triangle_count(),
            aggregate.node_count(),
            start.elapsed()
        );

        Self {
            scene,
            camera,
            aggregate,
            max_recursion_level: MAX_RECURSION_LEVEL,
            min_weight: MIN_WEIGHT,
            rays: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            frame: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera access; the view state is refreshed on the next
    /// render call.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Set the reflection recursion limit, silently clamped to at most 6.
    pub fn set_max_recursion_level(&mut self, level: u32) {
        self.max_recursion_level = level.min(MAX_RECURSION_LEVEL);
    }

    pub fn max_recursion_level(&self) -> u32 {
        self.max_recursion_level
    }

    /// Set the recursion energy cutoff, silently clamped to at least 0.01.
    pub fn set_min_weight(&mut self, weight: f32) {
        self.min_weight = weight.max(MIN_WEIGHT);
    }

    pub fn min_weight(&self) -> f32 {
        self.min_weight
    }

    /// Render the scene into `target` with the given scan strategy.
    pub fn render(
        &mut self,
        target: &mut dyn RenderTarget,
        mode: ScanMode,
    ) -> Result<RenderStats, RenderError> {
        let (width, height) = target.size();
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyTarget(width, height));
        }

        let stamp = self.camera.update_view();
        let frame = match self.frame {
            Some(f) if f.stamp == stamp && f.width == width && f.height == height => f,
            _ => {
                let f = Frame::new(&self.camera, width, height, stamp);
                log::debug!("view changed, rebuilding frame state (stamp {})", stamp);
                self.frame = Some(f);
                f
            }
        };

        self.rays.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        let start = Instant::now();

        match mode {
            ScanMode::Uniform => self.uniform_scan(&frame, target),
            ScanMode::Adaptive => scan::adaptive_scan(self, &frame, target),
        }

        let stats = RenderStats {
            rays: self.rays.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            duration: start.elapsed(),
        };
        log::info!(
            "rendered {}x{} ({:?}): {} rays, {} hits in {:.2?}",
            width,
            height,
            mode,
            stats.rays,
            stats.hits,
            stats.duration
        );
        Ok(stats)
    }

    /// One ray per pixel center, rows traced in parallel.
    fn uniform_scan(&self, frame: &Frame, target: &mut dyn RenderTarget) {
        let rows: Vec<Vec<Color>> = (0..frame.height)
            .into_par_iter()
            .map(|j| {
                (0..frame.width)
                    .map(|i| self.shoot(frame, i as f32 + 0.5, j as f32 + 0.5))
                    .collect()
            })
            .collect();

        for (j, row) in rows.into_iter().enumerate() {
            target.write_row(j as u32, &row);
        }
    }

    /// Shoot a single primary ray through the pixel-space coordinate and
    /// resolve its color, clamping each channel to at most 1.0.
    ///
    /// Channels are never clamped from below; a negative accumulation
    /// passes through unchanged.
    pub(crate) fn shoot(&self, frame: &Frame, x: f32, y: f32) -> Color {
        let ray = frame.pixel_ray(x, y);
        self.trace(&ray, 0, 1.0).min(Color::ONE)
    }

    /// Recursive trace entry point; returns black once the energy weight or
    /// recursion depth cutoff triggers.
    fn trace(&self, ray: &Ray, level: u32, weight: f32) -> Color {
        if weight <= self.min_weight || level > self.max_recursion_level {
            return Color::ZERO;
        }
        self.shade(ray, level, weight)
    }

    /// Local illumination plus a mirror reflection bounce.
    fn shade(&self, ray: &Ray, level: u32, weight: f32) -> Color {
        self.rays.fetch_add(1, Ordering::Relaxed);

        let mut hit = Intersection::default();
        let range = Interval::new(ray.t_min, f32::INFINITY);
        if !self.aggregate.intersect(ray, range, &mut hit) {
            return self.scene.background_color;
        }
        self.hits.fetch_add(1, Ordering::Relaxed);

        let material = hit.material;
        // Offset along the normal against self-shadowing
        let point = hit.p + SHADOW_BIAS * hit.normal;

        let mut color = material.ambient * self.scene.ambient_light;

        for light in self.scene.lights() {
            // Light vector points from the light toward the surface
            let l = if light.directional {
                light.position.normalize()
            } else {
                (point - light.position).normalize()
            };
            let cosine = (-hit.normal).dot(l);
            if cosine <= 0.0 {
                continue;
            }
            let shadow_ray = Ray::new(point, -l);
            let mut occluder = Intersection::default();
            if !self
                .aggregate
                .intersect(&shadow_ray, Interval::new(0.0, f32::INFINITY), &mut occluder)
            {
                color += material.diffuse * cosine;
            }
        }

        let reflectance = material.specular.max_element();
        if reflectance > 0.0 {
            let d = ray.direction;
            let r = (d - 2.0 * hit.normal.dot(d) * hit.normal).normalize();
            let reflected = Ray::with_offset(point, r, REFLECTION_BIAS);
            color += material.specular * self.trace(&reflected, level + 1, weight * reflectance);
        }

        color
    }
}
