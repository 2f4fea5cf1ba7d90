use crate::geometry::{Fp, Ray, Vec3f};

/// Scene space is x-right, y-depth, z-up; camera space is x-right, y-up,
/// z-back. Primary rays leave `position` through a film rectangle centered
/// one unit in front of it.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3f,
    pub right: Vec3f,
    pub up: Vec3f,
    pub back: Vec3f,
    pub film_center: Vec3f,
    pub film_half_width: Fp,
    pub film_half_height: Fp,
}

impl Camera {
    /// Camera at `position` looking at the scene origin. The film's longer
    /// side spans one unit of viewport space; width >= height is assumed
    /// and checked by the renderer.
    pub fn looking_at_origin(position: Vec3f, image_width: u32, image_height: u32) -> Camera {
        let back = position.normalize();
        let right = Vec3f::z().cross(&back).normalize();
        let up = back.cross(&right).normalize();

        let film_distance = 1.0;
        let film_center = position - back * film_distance;

        let film_width: Fp = 1.0;
        let film_height = image_height as Fp / image_width as Fp;

        Camera {
            position,
            right,
            up,
            back,
            film_center,
            film_half_width: film_width * 0.5,
            film_half_height: film_height * 0.5,
        }
    }

    /// Film-plane point for viewport coordinates in [-1, 1] on both axes.
    pub fn film_point(&self, viewport_x: Fp, viewport_y: Fp) -> Vec3f {
        self.film_center
            + self.right * (viewport_x * self.film_half_width)
            + self.up * (viewport_y * self.film_half_height)
    }

    pub fn primary_ray(&self, film_point: &Vec3f) -> Ray {
        Ray {
            origin: self.position,
            direction: (film_point - self.position).normalize(),
        }
    }
}
