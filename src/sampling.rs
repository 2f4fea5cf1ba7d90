use arrayvec::ArrayVec;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::geometry::{Fp, Vec3f};

/// Per-worker random stream. Owned by exactly one thread for the length of
/// a render; streams are split off the master generator with `jump()`
/// before any worker starts.
pub type RenderRng = Xoshiro256PlusPlus;

/// Capacity of the per-pixel sample list; `samples_per_pixel` is validated
/// against it.
pub const MAX_PIXEL_SAMPLES: usize = 64;

/// Entries in the shared disc offset pool.
pub const DISC_SAMPLE_COUNT: usize = 516;

pub fn seed_master_rng() -> RenderRng {
    RenderRng::seed_from_u64(rand::thread_rng().gen())
}

/// Splits an independent stream off `master` for one worker.
pub fn split_rng(master: &mut RenderRng) -> RenderRng {
    let stream = master.clone();
    master.jump();
    stream
}

/// Offsets uniformly distributed inside a disc of the given radius, in the
/// z = 0 plane. Built once per render, immutable afterwards, read
/// concurrently by every worker.
#[derive(Debug)]
pub struct DiscSamplePool {
    points: Vec<Vec3f>,
}

impl DiscSamplePool {
    pub fn generate(radius: Fp, rng: &mut RenderRng) -> DiscSamplePool {
        let mut points = Vec::with_capacity(DISC_SAMPLE_COUNT);
        for _ in 0..DISC_SAMPLE_COUNT {
            let angle = rng.gen::<Fp>() * std::f32::consts::TAU;
            let r = radius * rng.gen::<Fp>().sqrt();
            points.push(Vec3f::new(r * angle.cos(), r * angle.sin(), 0.0));
        }
        DiscSamplePool { points }
    }

    pub fn pick(&self, rng: &mut RenderRng) -> Vec3f {
        self.points[rng.gen_range(0..self.points.len())]
    }
}

/// Evenly spaced `samples_per_axis` x `samples_per_axis` grid of sub-pixel
/// sample points inside one pixel's film footprint. `film_min` is the
/// pixel's corner; half-step margins keep samples off the pixel edges.
/// `samples_to_take` must equal the squared axis count (caller invariant,
/// validated with the options).
pub fn pixel_sample_points(
    film_min: &Vec3f,
    region_x: &Vec3f,
    region_y: &Vec3f,
    samples_to_take: u32,
    samples_per_axis: u32,
) -> ArrayVec<Vec3f, MAX_PIXEL_SAMPLES> {
    let step_x = region_x / samples_per_axis as Fp;
    let step_y = region_y / samples_per_axis as Fp;
    let first = film_min + step_x * 0.5 + step_y * 0.5;

    let mut points = ArrayVec::new();
    for x in 0..samples_per_axis {
        let offset_x = step_x * x as Fp;
        for y in 0..samples_per_axis {
            points.push(first + offset_x + step_y * y as Fp);
        }
    }
    debug_assert_eq!(points.len(), samples_to_take as usize);
    points
}
