//! Render a small demo scene to `render.png`.
//!
//! Run with `RUST_LOG=info cargo run --release --example simple_render`.

use std::sync::Arc;

use glint_core::{Actor, Camera, Color, Light, Material, Projection, Scene, Transform, TriangleMesh};
use glint_math::Vec3;
use glint_tracer::{FrameBuffer, RayTracer, ScanMode};

/// Latitude/longitude sphere mesh with smooth vertex normals.
fn uv_sphere(radius: f32, stacks: u32, slices: u32) -> TriangleMesh {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    for stack in 0..=stacks {
        let phi = std::f32::consts::PI * stack as f32 / stacks as f32;
        for slice in 0..=slices {
            let theta = std::f32::consts::TAU * slice as f32 / slices as f32;
            let n = Vec3::new(
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            );
            positions.push(n * radius);
            normals.push(n);
        }
    }

    let mut indices = Vec::new();
    let row = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * row + slice;
            let b = a + row;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    TriangleMesh::new(positions, indices, Some(normals))
}

/// Ground plane quad in the xz plane facing up.
fn ground(half: f32) -> TriangleMesh {
    TriangleMesh::new(
        vec![
            Vec3::new(-half, 0.0, -half),
            Vec3::new(-half, 0.0, half),
            Vec3::new(half, 0.0, half),
            Vec3::new(half, 0.0, -half),
        ],
        vec![0, 1, 2, 0, 2, 3],
        None,
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let sphere = Arc::new(uv_sphere(1.0, 24, 48));

    let mut scene = Scene::new("demo");
    scene.background_color = Color::new(0.05, 0.07, 0.12);
    scene.ambient_light = Color::new(0.3, 0.3, 0.3);

    let red = Arc::new(Material::diffuse(Color::new(0.9, 0.2, 0.15)));
    let gold = Arc::new(
        Material::diffuse(Color::new(0.8, 0.6, 0.1))
            .with_specular(Color::new(0.3, 0.3, 0.3)),
    );
    let mirror = Arc::new(
        Material::diffuse(Color::new(0.1, 0.1, 0.12))
            .with_specular(Color::new(0.8, 0.8, 0.8)),
    );

    scene.add_actor(
        Actor::new("red sphere", sphere.clone())
            .with_transform(Transform::from_translation(Vec3::new(-1.4, 1.0, 0.0)))
            .with_material(red),
    );
    scene.add_actor(
        Actor::new("gold sphere", sphere)
            .with_transform(Transform::from_translation(Vec3::new(1.4, 1.0, -1.0)))
            .with_material(gold),
    );
    scene.add_actor(
        Actor::new("floor", Arc::new(ground(8.0))).with_material(mirror),
    );

    scene.add_light(Light::directional(Vec3::new(-0.4, -1.0, -0.3), Color::ONE));
    scene.add_light(Light::point(
        Vec3::new(4.0, 5.0, 4.0),
        Color::new(0.8, 0.8, 0.7),
    ));

    let camera = Camera::new(
        Projection::Perspective,
        Vec3::new(0.0, 2.5, 7.0),
        Vec3::new(0.0, -1.5, -7.0),
        Vec3::Y,
        50.0,
        1.0,
    )?;

    let mut tracer = RayTracer::new(Arc::new(scene), camera);
    let mut image = FrameBuffer::new(800, 600);
    let stats = tracer.render(&mut image, ScanMode::Adaptive)?;
    println!(
        "{} rays, {} hits in {:.2?}",
        stats.rays, stats.hits, stats.duration
    );

    image.save_png("render.png")?;
    println!("wrote render.png");
    Ok(())
}
