use std::f32::consts::PI;

use crate::geometry::{intersect_scene, reflect, Fp, Ray, Vec3f};
use crate::sampling::{DiscSamplePool, RenderRng};
use crate::scene::{LightKind, RenderOptions, Scene};

/// Specular bounces stop at this recursion depth.
pub const MAX_DEPTH: u32 = 8;

/// Shadow rays start this far above the surface along its normal.
pub const SHADOW_BIAS: Fp = 1e-4;

const BASIS_LOWER_BOUND: Fp = 1e-7;

/// Per-worker shading state: shared read-only scene data plus the worker's
/// own random stream and shadow-sample scratch buffer.
pub struct ShadeContext<'a> {
    pub scene: &'a Scene,
    pub options: &'a RenderOptions,
    pub disc_samples: &'a DiscSamplePool,
    shadow_scratch: Vec<Vec3f>,
    pub rng: RenderRng,
}

impl<'a> ShadeContext<'a> {
    pub fn new(
        scene: &'a Scene,
        options: &'a RenderOptions,
        disc_samples: &'a DiscSamplePool,
        rng: RenderRng,
    ) -> ShadeContext<'a> {
        ShadeContext {
            scene,
            options,
            disc_samples,
            shadow_scratch: Vec::with_capacity(options.shadow_samples_per_light as usize),
            rng,
        }
    }
}

/// Orthonormal tangent basis (v, w) for the sample disc at a hit point.
/// The seed axis is picked from whichever normal components are near zero,
/// so the cross product below cannot degenerate.
pub fn tangent_basis(normal: &Vec3f) -> (Vec3f, Vec3f) {
    let seed = if normal.x.abs() < BASIS_LOWER_BOUND && normal.y.abs() < BASIS_LOWER_BOUND {
        Vec3f::new(normal.z, 0.0, -normal.x)
    } else {
        Vec3f::new(-normal.y, normal.x, 0.0)
    };
    let v = seed.normalize();
    (v, normal.cross(&v))
}

/// Fills the scratch buffer with shadow-ray origins: random entries of the
/// shared disc pool mapped onto the tangent plane of the hit, centered a
/// bias above the surface.
fn generate_light_samples(ctx: &mut ShadeContext, hit_normal: &Vec3f, hit_point: &Vec3f) {
    let sample_origin = hit_point + hit_normal * SHADOW_BIAS;
    let (v, w) = tangent_basis(hit_normal);

    ctx.shadow_scratch.clear();
    for _ in 0..ctx.options.shadow_samples_per_light {
        let disc = ctx.disc_samples.pick(&mut ctx.rng);
        ctx.shadow_scratch.push(v * disc.x + w * disc.y + sample_origin);
    }
}

/// Direct lighting at a hit point. Every light gets a fresh set of jittered
/// shadow rays; visibility-weighted intensity is averaged over the samples,
/// then the per-light contributions are averaged uniformly over the light
/// count, independent of distance or intensity.
pub fn sample_lighting(
    ctx: &mut ShadeContext,
    object_id: u32,
    material_color: &Vec3f,
    hit_normal: &Vec3f,
    hit_point: &Vec3f,
) -> Vec3f {
    let scene = ctx.scene;
    let sample_count = ctx.options.shadow_samples_per_light;
    let sample_contribution = 1.0 / sample_count as Fp;
    let light_contribution = 1.0 / scene.lights.len() as Fp;

    let mut result = Vec3f::zeros();
    for light in &scene.lights {
        generate_light_samples(ctx, hit_normal, hit_point);

        let mut shading = Vec3f::zeros();
        for sample_index in 0..sample_count as usize {
            let shadow_origin = ctx.shadow_scratch[sample_index];

            let (direction, intensity, max_distance) = match &light.kind {
                LightKind::Directional { inverted_direction } => {
                    let direction = inverted_direction.normalize();
                    let weight = Fp::max(hit_normal.dot(&direction), 0.0);
                    (direction, light.color * (light.intensity * weight), Fp::MAX)
                }
                LightKind::Point { origin } => {
                    let to_light = origin - shadow_origin;
                    let distance_squared = to_light.dot(&to_light);
                    let direction = to_light.normalize();
                    let falloff =
                        light.color * (light.intensity / (4.0 * PI * distance_squared));
                    let weight = Fp::max(hit_normal.dot(&direction), 0.0);
                    (direction, falloff * weight, distance_squared.sqrt())
                }
            };

            let shadow_ray = Ray {
                origin: shadow_origin,
                direction,
            };
            let visible = match intersect_scene(&shadow_ray, scene, max_distance) {
                None => true,
                // A surface never shadows itself; anything else occludes.
                Some(occluder) => occluder.object_id == object_id,
            };

            if visible {
                shading += intensity * sample_contribution;
            }
        }

        result += material_color.component_mul(&shading) * light_contribution;
    }

    result
}

/// Radiance arriving along `ray`. Misses resolve to the background
/// material's color at any depth. Hits take direct lighting plus one
/// mirrored specular bounce, blended by the material's reflection weight
/// and then pulled back toward the direct-lit color by its absorption.
pub fn shade(ctx: &mut ShadeContext, ray: &Ray, depth: u32, last_hit_id: u32) -> Vec3f {
    let scene = ctx.scene;

    let Some(hit) = intersect_scene(ray, scene, Fp::MAX) else {
        return scene.background_color();
    };

    // A ray re-hitting the surface it left means the distance tolerance
    // failed to filter that surface out.
    debug_assert!(
        hit.object_id != last_hit_id,
        "ray from object {last_hit_id} re-hit it at depth {depth}"
    );

    let material = &scene.materials[hit.material as usize];
    let direct = sample_lighting(ctx, hit.object_id, &material.color, &hit.normal, &hit.point);

    let mut color = direct;
    if depth < MAX_DEPTH {
        let specular_ray = Ray {
            origin: hit.point,
            direction: reflect(&ray.direction, &hit.normal),
        };
        let specular = shade(ctx, &specular_ray, depth + 1, hit.object_id);

        // The diffuse term reuses the direct-lit color; tracing a real
        // diffuse bounce is an extension point, not implemented.
        let diffuse = direct;
        let reflection_color = diffuse.lerp(&specular, material.reflection);
        color = reflection_color.lerp(&direct, material.absorption);
    }

    color
}
