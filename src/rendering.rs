use indicatif::ProgressBar;

use crate::camera::Camera;
use crate::geometry::{Fp, Vec3f, NO_OBJECT};
use crate::sampling::{
    pixel_sample_points, seed_master_rng, split_rng, DiscSamplePool, RenderRng,
};
use crate::scene::{AntiAliasMode, ConfigError, RenderOptions, Scene};
use crate::shading::{shade, ShadeContext};

/// Clamps a linear color to [0, 1] and packs it as 0xAARRGGBB with opaque
/// alpha. Channels are truncated, not rounded.
pub fn pack_color(color: &Vec3f) -> u32 {
    let r = (color.x.clamp(0.0, 1.0) * 255.0) as u32;
    let g = (color.y.clamp(0.0, 1.0) * 255.0) as u32;
    let b = (color.z.clamp(0.0, 1.0) * 255.0) as u32;
    0xff00_0000 | (r << 16) | (g << 8) | b
}

/// One pixel's extent on the film plane, in scene space. Shared read-only
/// by all workers.
#[derive(Debug)]
struct PixelFootprint {
    region_x: Vec3f,
    region_y: Vec3f,
}

impl PixelFootprint {
    fn new(camera: &Camera, width: u32, height: u32) -> PixelFootprint {
        PixelFootprint {
            region_x: camera.right * (camera.film_half_width * 2.0 / width as Fp),
            region_y: camera.up * (camera.film_half_height * 2.0 / height as Fp),
        }
    }
}

/// Work for one band of contiguous image rows, moved into one worker.
struct BandTask {
    y_start: u32,
    rows: u32,
    rng: RenderRng,
}

/// Renders the scene into `buffer` using one worker per logical core.
pub fn render_image(
    scene: &Scene,
    camera: &Camera,
    options: &RenderOptions,
    width: u32,
    height: u32,
    buffer: &mut [u32],
) -> Result<(), ConfigError> {
    let workers = std::thread::available_parallelism().map_or(1, |n| n.get());
    render_image_with_workers(scene, camera, options, width, height, workers, buffer)
}

/// Renders the scene into `buffer` with an explicit worker count. The image
/// is split into `workers` contiguous, equal-height row bands; each worker
/// owns one band, a private random stream and scratch buffer, and writes a
/// disjoint range of `buffer`. Returns after all workers have joined.
pub fn render_image_with_workers(
    scene: &Scene,
    camera: &Camera,
    options: &RenderOptions,
    width: u32,
    height: u32,
    workers: usize,
    buffer: &mut [u32],
) -> Result<(), ConfigError> {
    scene.validate()?;
    options.validate()?;
    if width == 0 || height == 0 || height > width {
        return Err(ConfigError::BadImageDimensions { width, height });
    }
    let expected = width as usize * height as usize;
    if buffer.len() != expected {
        return Err(ConfigError::BufferSizeMismatch {
            buffer: buffer.len(),
            expected,
        });
    }
    if workers == 0 || height as usize % workers != 0 {
        return Err(ConfigError::UnevenRowBands { height, workers });
    }

    let mut master_rng = seed_master_rng();
    let disc_samples = DiscSamplePool::generate(options.shadow_region_radius, &mut master_rng);
    let footprint = PixelFootprint::new(camera, width, height);

    let band_rows = height / workers as u32;
    let band_pixels = band_rows as usize * width as usize;
    let mut tasks = Vec::with_capacity(workers);
    for band_index in 0..workers as u32 {
        tasks.push(BandTask {
            y_start: band_index * band_rows,
            rows: band_rows,
            rng: split_rng(&mut master_rng),
        });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    let progress = ProgressBar::new(height as u64);
    log::info!("rendering {width}x{height}, {workers} workers, {band_rows} rows per band");

    pool.scope(|scope| {
        for (task, band) in tasks.into_iter().zip(buffer.chunks_mut(band_pixels)) {
            let disc_samples = &disc_samples;
            let footprint = &footprint;
            let progress = &progress;
            scope.spawn(move |_| {
                render_band(
                    task,
                    band,
                    scene,
                    camera,
                    options,
                    footprint,
                    disc_samples,
                    width,
                    height,
                    progress,
                );
            });
        }
    });

    progress.finish_and_clear();
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn render_band(
    task: BandTask,
    band: &mut [u32],
    scene: &Scene,
    camera: &Camera,
    options: &RenderOptions,
    footprint: &PixelFootprint,
    disc_samples: &DiscSamplePool,
    width: u32,
    height: u32,
    progress: &ProgressBar,
) {
    log::trace!("band of {} rows starting at row {}", task.rows, task.y_start);
    let mut ctx = ShadeContext::new(scene, options, disc_samples, task.rng);

    for local_y in 0..task.rows {
        let y = task.y_start + local_y;
        let viewport_y = -1.0 + 2.0 * (y as Fp / height as Fp);

        for x in 0..width {
            let viewport_x = -1.0 + 2.0 * (x as Fp / width as Fp);
            let film_min = camera.film_point(viewport_x, viewport_y);

            let color = match options.anti_alias {
                AntiAliasMode::None => {
                    // Pixel center; written out step by step so a 1x1
                    // supersampling grid lands on bit-identical points.
                    let center = film_min + footprint.region_x * 0.5 + footprint.region_y * 0.5;
                    shade(&mut ctx, &camera.primary_ray(&center), 0, NO_OBJECT)
                }
                AntiAliasMode::Supersample => {
                    let points = pixel_sample_points(
                        &film_min,
                        &footprint.region_x,
                        &footprint.region_y,
                        options.samples_per_pixel,
                        options.samples_per_axis,
                    );
                    let mut accumulated = Vec3f::zeros();
                    for point in &points {
                        accumulated += shade(&mut ctx, &camera.primary_ray(point), 0, NO_OBJECT);
                    }
                    accumulated / points.len() as Fp
                }
            };

            band[(local_y * width + x) as usize] = pack_color(&color);
        }
        progress.inc(1);
    }
}
