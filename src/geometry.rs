use na::Vector3;

use crate::scene::Scene;

pub type Fp = f32;
pub type Vec3f = Vector3<Fp>;

/// Distance tolerance for every ray query. Hits closer than this are
/// floating-point noise from the surface the ray started on and are
/// discarded.
pub const TOLERANCE: Fp = 1e-2;

/// Object id carried by rays that did not originate on any surface.
pub const NO_OBJECT: u32 = u32::MAX;

#[derive(Clone, Debug)]
pub struct Ray {
    pub origin: Vec3f,
    pub direction: Vec3f,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitKind {
    Plane,
    Sphere,
}

/// Nearest surface found along a ray.
#[derive(Clone, Debug)]
pub struct Hit {
    pub distance: Fp,
    pub point: Vec3f,
    pub normal: Vec3f,
    pub material: u32,
    pub object_id: u32,
    pub kind: HitKind,
}

pub fn reflect(ray: &Vec3f, normal: &Vec3f) -> Vec3f {
    let projection = -ray.dot(normal);
    ray + normal * (projection * 2.0)
}

/// Checker cell for a plane hit, from the parity of the truncated
/// projected coordinates. Truncation collapses (-1, 1) into one double-wide
/// cell, so the parity is flipped once per negative coordinate; the pattern
/// is still slightly off right at the origin.
pub fn checker_parity(x: Fp, y: Fp) -> bool {
    let mut checkered = ((x as i64) ^ (y as i64)) & 1 != 0;
    if y < 0.0 {
        checkered = !checkered;
    }
    if x < 0.0 {
        checkered = !checkered;
    }
    checkered
}

/// Nearest hit along `ray` across all scene geometry, with
/// `TOLERANCE < t < max_distance`. Planes are scanned first, then spheres;
/// degenerate queries (parallel to a plane, tangent to a sphere) are
/// misses, not errors.
pub fn intersect_scene(ray: &Ray, scene: &Scene, max_distance: Fp) -> Option<Hit> {
    let mut nearest = max_distance;
    let mut hit = None;

    for plane in &scene.planes {
        let divisor = ray.direction.dot(&plane.normal);
        if divisor.abs() <= TOLERANCE {
            continue;
        }
        let dividend = plane.point.dot(&plane.normal) - ray.origin.dot(&plane.normal);
        let t = dividend / divisor;
        if t > TOLERANCE && t < nearest {
            nearest = t;
            let point = ray.origin + ray.direction * t;
            let material = if checker_parity(point.x, point.y) {
                plane.material
            } else {
                plane.secondary_material
            };
            hit = Some(Hit {
                distance: t,
                point,
                normal: plane.normal,
                material,
                object_id: plane.id,
                kind: HitKind::Plane,
            });
        }
    }

    for sphere in &scene.spheres {
        let relative_origin = ray.origin - sphere.center;
        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * ray.direction.dot(&relative_origin);
        let c = relative_origin.dot(&relative_origin) - sphere.radius * sphere.radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant <= TOLERANCE {
            continue;
        }
        let root = discriminant.sqrt();
        let t = Fp::min((-b - root) / (2.0 * a), (-b + root) / (2.0 * a));
        if t > TOLERANCE && t < nearest {
            nearest = t;
            let point = ray.origin + ray.direction * t;
            hit = Some(Hit {
                distance: t,
                point,
                normal: (point - sphere.center).normalize(),
                material: sphere.material,
                object_id: sphere.id,
                kind: HitKind::Sphere,
            });
        }
    }

    hit
}
