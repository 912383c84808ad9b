//! Scene graph types for Glint.
//!
//! The scene is a flat, stably-ordered collection of actors and lights plus
//! the global ambient and background colors. It is fully built before the
//! engine is constructed and read-only afterwards.

use std::sync::Arc;

use glint_math::{Mat4, Quat, Vec3};

use crate::mesh::TriangleMesh;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Phong-style surface description.
///
/// The engine's illumination model is local: ambient response, diffuse
/// response per light, and a mirror specular term that spawns reflection
/// rays when any specular channel is non-zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Ambient reflectance, modulated by the scene's ambient light
    pub ambient: Color,

    /// Diffuse reflectance
    pub diffuse: Color,

    /// Specular (mirror) reflectance; drives the reflection recursion
    pub specular: Color,

    /// Specular exponent; carried from the scene description
    pub shine: f32,
}

impl Material {
    /// The material every primitive falls back to when none is set.
    pub const DEFAULT: Material = Material {
        ambient: Vec3::new(0.2, 0.2, 0.2),
        diffuse: Vec3::new(0.8, 0.8, 0.8),
        specular: Vec3::ZERO,
        shine: 10.0,
    };

    /// Create a diffuse-only material.
    pub fn diffuse(color: Color) -> Self {
        Self {
            diffuse: color,
            ..Self::DEFAULT
        }
    }

    /// Set the ambient reflectance.
    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    /// Set the specular reflectance.
    pub fn with_specular(mut self, specular: Color) -> Self {
        self.specular = specular;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Distance falloff mode of a positional light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Falloff {
    #[default]
    None,
    Linear,
    Quadratic,
}

/// A point or directional light source.
#[derive(Clone, Debug)]
pub struct Light {
    /// World position, or the light direction for directional lights
    pub position: Vec3,

    /// Light color
    pub color: Color,

    /// True if `position` is a direction rather than a location
    pub directional: bool,

    /// Falloff mode; carried from the scene description
    pub falloff: Falloff,
}

impl Light {
    /// Create a point light.
    pub fn point(position: Vec3, color: Color) -> Self {
        Self {
            position,
            color,
            directional: false,
            falloff: Falloff::None,
        }
    }

    /// Create a directional light shining along `direction`.
    pub fn directional(direction: Vec3, color: Color) -> Self {
        Self {
            position: direction,
            color,
            directional: true,
            falloff: Falloff::None,
        }
    }
}

/// Transform components that can be composed into a matrix.
#[derive(Clone, Debug)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with only translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Convert to a 4x4 transformation matrix.
    ///
    /// Order: Scale -> Rotate -> Translate (SRT)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// A named, transformed, materialized occurrence of a mesh in the scene.
#[derive(Clone, Debug)]
pub struct Actor {
    /// Actor name, for diagnostics
    pub name: String,

    /// Invisible actors are skipped during engine construction
    pub visible: bool,

    /// Shared mesh geometry
    pub mesh: Arc<TriangleMesh>,

    /// Local-to-world placement
    pub transform: Transform,

    /// Surface material (exactly one resolves per actor)
    pub material: Arc<Material>,
}

impl Actor {
    /// Create a visible actor with the default material.
    pub fn new(name: impl Into<String>, mesh: Arc<TriangleMesh>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            mesh,
            transform: Transform::default(),
            material: Arc::new(Material::DEFAULT),
        }
    }

    /// Set the actor's transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the actor's material.
    pub fn with_material(mut self, material: Arc<Material>) -> Self {
        self.material = material;
        self
    }

    /// Get the 4x4 local-to-world matrix for this actor.
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }
}

/// A complete scene: actors, lights, and global colors.
///
/// Actors and lights keep their insertion order; the engine relies on that
/// order being stable across render calls.
#[derive(Clone, Debug)]
pub struct Scene {
    actors: Vec<Actor>,
    lights: Vec<Light>,

    /// Color returned for rays that escape the scene
    pub background_color: Color,

    /// Global ambient illumination
    pub ambient_light: Color,

    /// Scene name
    pub name: String,
}

impl Scene {
    /// Create an empty scene with black background and no ambient light.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            actors: Vec::new(),
            lights: Vec::new(),
            background_color: Color::ZERO,
            ambient_light: Color::ZERO,
            name: name.into(),
        }
    }

    /// Add an actor to the scene.
    pub fn add_actor(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    /// Add a light to the scene.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Actors in insertion order.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Lights in insertion order.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Number of actors.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Total triangle count across all actors.
    pub fn total_triangle_count(&self) -> usize {
        self.actors.iter().map(|a| a.mesh.triangle_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh() -> Arc<TriangleMesh> {
        Arc::new(TriangleMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
            None,
        ))
    }

    #[test]
    fn test_scene_keeps_insertion_order() {
        let mut scene = Scene::new("test");
        let mesh = triangle_mesh();

        scene.add_actor(Actor::new("a", mesh.clone()));
        scene.add_actor(Actor::new("b", mesh.clone()));
        scene.add_light(Light::point(Vec3::Y, Color::ONE));
        scene.add_light(Light::directional(Vec3::NEG_Y, Color::ONE));

        let names: Vec<_> = scene.actors().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(!scene.lights()[0].directional);
        assert!(scene.lights()[1].directional);
    }

    #[test]
    fn test_actor_resolves_default_material() {
        let actor = Actor::new("a", triangle_mesh());
        assert_eq!(*actor.material, Material::DEFAULT);
    }

    #[test]
    fn test_shared_mesh_keeps_one_id() {
        let mesh = triangle_mesh();
        let a = Actor::new("a", mesh.clone());
        let b = Actor::new("b", mesh.clone());
        assert_eq!(a.mesh.id, b.mesh.id);
    }

    #[test]
    fn test_transform_to_matrix() {
        let transform = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(2.0),
        };

        let m = transform.to_matrix();
        let p = m.transform_point3(Vec3::ONE);
        assert!((p - Vec3::new(3.0, 4.0, 5.0)).length() < 0.001);
    }

    #[test]
    fn test_total_triangle_count() {
        let mut scene = Scene::new("test");
        let mesh = triangle_mesh();
        scene.add_actor(Actor::new("a", mesh.clone()));
        scene.add_actor(Actor::new("b", mesh));
        assert_eq!(scene.total_triangle_count(), 2);
    }
}
