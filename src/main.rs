mod camera;
mod geometry;
mod rendering;
mod sampling;
mod scene;
mod shading;

extern crate nalgebra as na;

use std::time::Instant;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::camera::Camera;
use crate::geometry::Vec3f;
use crate::rendering::render_image;
use crate::scene::{Light, LightKind, Material, Plane, RenderOptions, Scene, Sphere};

const IMAGE_WIDTH: u32 = 1280;
const IMAGE_HEIGHT: u32 = 720;
const RESULT_FILE: &str = "render.png";

fn build_scene() -> Scene {
    let material = |color: Vec3f, reflection: f32, absorption: f32| Material {
        color,
        reflection,
        absorption,
    };

    Scene {
        materials: vec![
            // Index 0 doubles as the background.
            material(Vec3f::new(0.2, 0.6, 0.8), 0.0, 1.0),
            material(Vec3f::new(0.8, 0.8, 0.8), 0.0, 1.0),
            material(Vec3f::new(0.0, 1.0, 0.0), 0.0, 0.4),
            material(Vec3f::new(0.0, 0.0, 1.0), 1.0, 0.0),
            material(Vec3f::new(1.0, 1.0, 1.0), 0.0, 1.0),
            material(Vec3f::new(0.0, 0.0, 0.0), 0.0, 1.0),
            material(Vec3f::new(0.0, 0.0, 1.0), 0.5, 0.5),
        ],
        planes: vec![Plane {
            id: 0,
            normal: Vec3f::z(),
            point: Vec3f::zeros(),
            material: 5,
            secondary_material: 4,
        }],
        spheres: vec![
            Sphere {
                id: 1,
                center: Vec3f::new(-2.0, 0.0, 1.0),
                radius: 1.0,
                material: 2,
            },
            Sphere {
                id: 2,
                center: Vec3f::new(0.0, 0.0, 1.0),
                radius: 1.0,
                material: 3,
            },
            Sphere {
                id: 3,
                center: Vec3f::new(2.0, 0.0, 1.0),
                radius: 1.0,
                material: 6,
            },
        ],
        lights: vec![
            Light {
                color: Vec3f::new(1.0, 1.0, 1.0),
                intensity: 0.5,
                kind: LightKind::Directional {
                    inverted_direction: Vec3f::new(-0.5, 0.0, 1.0),
                },
            },
            Light {
                color: Vec3f::new(1.0, 1.0, 1.0),
                intensity: 500.0,
                kind: LightKind::Point {
                    origin: Vec3f::new(3.0, 0.0, 5.0),
                },
            },
            Light {
                color: Vec3f::new(1.0, 1.0, 0.4),
                intensity: 500.0,
                kind: LightKind::Point {
                    origin: Vec3f::new(-3.0, 0.0, 6.0),
                },
            },
        ],
    }
}

/// The film's +y axis points up while image row 0 is the top row, so rows
/// are flipped vertically on the way out.
fn packed_to_image(pixels: &[u32], width: u32, height: u32) -> RgbaImage {
    let mut image = RgbaImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let packed = pixels[(y * width + x) as usize];
            let rgba = [
                (packed >> 16) as u8,
                (packed >> 8) as u8,
                packed as u8,
                (packed >> 24) as u8,
            ];
            image.put_pixel(x, height - 1 - y, Rgba(rgba));
        }
    }
    image
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let options = match args.get(1).map(String::as_str) {
        Some("minimal") => RenderOptions::minimal(),
        Some("dev") => RenderOptions::development(),
        Some("max") | None => RenderOptions::maximum(),
        Some(other) => {
            log::error!("unknown quality preset {other:?}, expected minimal, dev or max");
            std::process::exit(1);
        }
    };

    let scene = build_scene();
    let camera = Camera::looking_at_origin(Vec3f::new(0.0, -20.0, 5.0), IMAGE_WIDTH, IMAGE_HEIGHT);

    let mut pixels = vec![0u32; (IMAGE_WIDTH * IMAGE_HEIGHT) as usize];
    let render_start = Instant::now();
    if let Err(err) = render_image(
        &scene,
        &camera,
        &options,
        IMAGE_WIDTH,
        IMAGE_HEIGHT,
        &mut pixels,
    ) {
        log::error!("{err}");
        std::process::exit(1);
    }
    log::info!("render finished in {:.2?}", render_start.elapsed());

    let image = packed_to_image(&pixels, IMAGE_WIDTH, IMAGE_HEIGHT);
    image
        .save_with_format(RESULT_FILE, ImageFormat::Png)
        .expect("failed writing result image");
    log::info!("wrote {RESULT_FILE}");
}
