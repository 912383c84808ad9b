//! Camera: view frame, projection parameters, and the view timestamp.
//!
//! The engine derives its pixel-to-ray mapping from this camera once per
//! frame and caches it; `update_view()` returns a monotonically increasing
//! stamp that only changes when some camera parameter changed, so the
//! engine knows when the cached mapping is stale.
//!
//! Degenerate parameters are rejected here, at configuration time, so the
//! tracing loop never has to re-validate them.

use glint_math::{Quat, Vec3};
use thiserror::Error;

const MIN_DISTANCE: f32 = 0.001;
const MIN_ANGLE: f32 = 1.0;
const MAX_ANGLE: f32 = 179.0;
const MIN_HEIGHT: f32 = 0.01;
const MIN_ASPECT: f32 = 0.1;
const MIN_FRONT_PLANE: f32 = 0.01;
const MIN_DEPTH: f32 = 0.01;

/// Camera configuration failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("direction of projection cannot be null")]
    NullDirection,
    #[error("view up cannot be null")]
    NullViewUp,
    #[error("view up cannot be parallel to the direction of projection")]
    ViewUpParallelToDirection,
    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

/// Projection type of the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    Perspective,
    Parallel,
}

/// A camera with a focal point at `distance` along the direction of
/// projection.
#[derive(Clone, Debug)]
pub struct Camera {
    projection: Projection,
    position: Vec3,
    /// Unit vector from the position toward the focal point
    direction: Vec3,
    /// Unit view up; re-orthogonalized against `direction` by update_view
    view_up: Vec3,
    distance: f32,
    /// Vertical view angle in degrees (perspective)
    view_angle: f32,
    /// View window height in world units (parallel)
    height: f32,
    aspect_ratio: f32,
    front_plane: f32,
    back_plane: f32,

    view_modified: bool,
    timestamp: u64,
}

fn is_null(v: Vec3) -> bool {
    v.length_squared() < 1e-12
}

impl Camera {
    /// Create a camera looking along `dop` from `position`.
    ///
    /// The length of `dop` becomes the focal distance. The view angle is
    /// clamped into [1, 179] degrees.
    pub fn new(
        projection: Projection,
        position: Vec3,
        dop: Vec3,
        view_up: Vec3,
        view_angle: f32,
        aspect_ratio: f32,
    ) -> Result<Self, CameraError> {
        if is_null(dop) {
            return Err(CameraError::NullDirection);
        }
        if is_null(view_up) {
            return Err(CameraError::NullViewUp);
        }
        let direction = dop.normalize();
        if is_null(direction.cross(view_up)) {
            return Err(CameraError::ViewUpParallelToDirection);
        }
        if view_angle <= 0.0 {
            return Err(CameraError::NotPositive("view angle"));
        }
        if aspect_ratio <= 0.0 {
            return Err(CameraError::NotPositive("aspect ratio"));
        }

        let distance = dop.length().max(MIN_DISTANCE);
        let view_angle = view_angle.clamp(MIN_ANGLE, MAX_ANGLE);

        Ok(Self {
            projection,
            position,
            direction,
            view_up: view_up.normalize(),
            distance,
            view_angle,
            height: 2.0 * distance * (view_angle.to_radians() * 0.5).tan(),
            aspect_ratio: aspect_ratio.max(MIN_ASPECT),
            front_plane: 0.1,
            back_plane: 1000.1,
            view_modified: true,
            timestamp: 0,
        })
    }

    /// Reset to the default view: at (0, 0, 10) looking down -Z.
    pub fn set_default_view(&mut self) {
        self.projection = Projection::Perspective;
        self.position = Vec3::new(0.0, 0.0, 10.0);
        self.direction = Vec3::NEG_Z;
        self.view_up = Vec3::Y;
        self.distance = 10.0;
        self.view_angle = 60.0;
        self.height = 2.0 * self.distance * (self.view_angle.to_radians() * 0.5).tan();
        self.aspect_ratio = 1.0;
        self.front_plane = 0.1;
        self.back_plane = 1000.1;
        self.view_modified = true;
    }

    // -- accessors ---------------------------------------------------------

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit direction of projection (toward the focal point).
    pub fn direction_of_projection(&self) -> Vec3 {
        self.direction
    }

    /// View plane normal: the unit vector pointing back toward the viewer.
    pub fn view_plane_normal(&self) -> Vec3 {
        -self.direction
    }

    pub fn view_up(&self) -> Vec3 {
        self.view_up
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn view_angle(&self) -> f32 {
        self.view_angle
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn clipping_planes(&self) -> (f32, f32) {
        (self.front_plane, self.back_plane)
    }

    /// Height of the view window at the focal plane.
    ///
    /// For perspective projection this is derived from the view angle and
    /// distance; for parallel projection it is the configured height.
    pub fn window_height(&self) -> f32 {
        match self.projection {
            Projection::Perspective => {
                2.0 * self.distance * (self.view_angle.to_radians() * 0.5).tan()
            }
            Projection::Parallel => self.height,
        }
    }

    /// Current view stamp without recomputing anything.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    // -- mutators ----------------------------------------------------------

    /// Move the camera; the focal point moves with it.
    pub fn set_position(&mut self, value: Vec3) {
        if self.position != value {
            self.position = value;
            self.view_modified = true;
        }
    }

    /// Set the direction of projection, keeping the focal distance.
    pub fn set_direction_of_projection(&mut self, value: Vec3) -> Result<(), CameraError> {
        if is_null(value) {
            return Err(CameraError::NullDirection);
        }
        let dop = value.normalize();
        if is_null(dop.cross(self.view_up)) {
            return Err(CameraError::ViewUpParallelToDirection);
        }
        if self.direction != dop {
            self.direction = dop;
            self.view_modified = true;
        }
        Ok(())
    }

    pub fn set_view_up(&mut self, value: Vec3) -> Result<(), CameraError> {
        if is_null(value) {
            return Err(CameraError::NullViewUp);
        }
        if is_null(self.direction.cross(value)) {
            return Err(CameraError::ViewUpParallelToDirection);
        }
        let vup = value.normalize();
        if self.view_up != vup {
            self.view_up = vup;
            self.view_modified = true;
        }
        Ok(())
    }

    pub fn set_projection(&mut self, value: Projection) {
        if self.projection != value {
            self.projection = value;
            self.view_modified = true;
        }
    }

    /// Set the focal distance; must be positive.
    pub fn set_distance(&mut self, value: f32) -> Result<(), CameraError> {
        if value <= 0.0 {
            return Err(CameraError::NotPositive("distance"));
        }
        let value = value.max(MIN_DISTANCE);
        if self.distance != value {
            self.distance = value;
            self.view_modified = true;
        }
        Ok(())
    }

    /// Set the vertical view angle in degrees; clamped into [1, 179].
    pub fn set_view_angle(&mut self, value: f32) -> Result<(), CameraError> {
        if value <= 0.0 {
            return Err(CameraError::NotPositive("view angle"));
        }
        let value = value.clamp(MIN_ANGLE, MAX_ANGLE);
        if self.view_angle != value {
            self.view_angle = value;
            if self.projection == Projection::Perspective {
                self.view_modified = true;
            }
        }
        Ok(())
    }

    /// Set the view window height used by parallel projection.
    pub fn set_height(&mut self, value: f32) -> Result<(), CameraError> {
        if value <= 0.0 {
            return Err(CameraError::NotPositive("height"));
        }
        let value = value.max(MIN_HEIGHT);
        if self.height != value {
            self.height = value;
            if self.projection == Projection::Parallel {
                self.view_modified = true;
            }
        }
        Ok(())
    }

    pub fn set_aspect_ratio(&mut self, value: f32) -> Result<(), CameraError> {
        if value <= 0.0 {
            return Err(CameraError::NotPositive("aspect ratio"));
        }
        let value = value.max(MIN_ASPECT);
        if self.aspect_ratio != value {
            self.aspect_ratio = value;
            self.view_modified = true;
        }
        Ok(())
    }

    /// Set near/far clipping planes; swapped if given out of order.
    pub fn set_clipping_planes(&mut self, front: f32, back: f32) -> Result<(), CameraError> {
        if front <= 0.0 || back <= 0.0 {
            return Err(CameraError::NotPositive("clipping plane distance"));
        }
        let (mut front, mut back) = if front > back {
            (back, front)
        } else {
            (front, back)
        };
        front = front.max(MIN_FRONT_PLANE);
        if back - front < MIN_DEPTH {
            back = front + MIN_DEPTH;
        }
        if self.front_plane != front || self.back_plane != back {
            self.front_plane = front;
            self.back_plane = back;
            self.view_modified = true;
        }
        Ok(())
    }

    /// Change the view angle (or height) so more or less of the scene fills
    /// the view window. Values > 1 zoom in, values in (0, 1) zoom out.
    pub fn zoom(&mut self, factor: f32) -> Result<(), CameraError> {
        if factor <= 0.0 {
            return Err(CameraError::NotPositive("zoom factor"));
        }
        match self.projection {
            Projection::Perspective => self.set_view_angle(self.view_angle / factor),
            Projection::Parallel => self.set_height(self.height / factor),
        }
    }

    /// Rotate the camera's position about the view up vector, centered at
    /// the focal point.
    pub fn azimuth(&mut self, degrees: f32) {
        if degrees != 0.0 {
            self.orbit(Quat::from_axis_angle(self.view_up, degrees.to_radians()));
        }
    }

    /// Rotate the camera's position about the horizontal view axis,
    /// centered at the focal point.
    pub fn elevation(&mut self, degrees: f32) {
        if degrees != 0.0 {
            let axis = self.direction.cross(self.view_up).normalize();
            self.orbit(Quat::from_axis_angle(axis, degrees.to_radians()));
            self.view_up = axis.cross(self.direction);
        }
    }

    fn orbit(&mut self, rotation: Quat) {
        let focal_point = self.position + self.direction * self.distance;
        self.position = focal_point + rotation * (self.position - focal_point);
        self.direction = (focal_point - self.position) / self.distance;
        self.view_modified = true;
    }

    /// Recompute the view frame if dirty and return the current stamp.
    ///
    /// Re-orthogonalizes the view up vector against the direction of
    /// projection. The stamp increases exactly once per batch of
    /// modifications, so callers can cache everything derived from the
    /// camera and compare stamps.
    pub fn update_view(&mut self) -> u64 {
        if self.view_modified {
            let u = self.direction.cross(self.view_up).normalize();
            self.view_up = u.cross(self.direction);
            self.view_modified = false;
            self.timestamp += 1;
        }
        self.timestamp
    }
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            projection: Projection::Perspective,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            view_up: Vec3::Y,
            distance: 10.0,
            view_angle: 60.0,
            height: 1.0,
            aspect_ratio: 1.0,
            front_plane: 0.1,
            back_plane: 1000.1,
            view_modified: true,
            timestamp: 0,
        };
        camera.set_default_view();
        camera
    }
}
