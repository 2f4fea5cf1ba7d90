use std::collections::HashSet;

use thiserror::Error;

use crate::geometry::{Fp, Vec3f, TOLERANCE};
use crate::sampling::MAX_PIXEL_SAMPLES;

#[derive(Clone, Debug)]
pub struct Material {
    /// Base color, components nominally in [0, 1] before clamping.
    pub color: Vec3f,
    /// Specular mix weight in [0, 1].
    pub reflection: Fp,
    /// How much the blended color is pulled back toward the direct-lit
    /// base color, in [0, 1].
    pub absorption: Fp,
}

#[derive(Clone, Debug)]
pub struct Plane {
    pub id: u32,
    pub normal: Vec3f,
    pub point: Vec3f,
    /// Checker cells alternate between these two material indices.
    pub material: u32,
    pub secondary_material: u32,
}

#[derive(Clone, Debug)]
pub struct Sphere {
    pub id: u32,
    pub center: Vec3f,
    pub radius: Fp,
    pub material: u32,
}

#[derive(Clone, Debug)]
pub enum LightKind {
    /// `inverted_direction` points from the scene *to* the virtual
    /// infinitely distant source; normalized at use.
    Directional { inverted_direction: Vec3f },
    Point { origin: Vec3f },
}

#[derive(Clone, Debug)]
pub struct Light {
    pub color: Vec3f,
    pub intensity: Fp,
    pub kind: LightKind,
}

/// Read-only world description. Built once before rendering and shared by
/// reference across all workers.
#[derive(Debug)]
pub struct Scene {
    pub materials: Vec<Material>,
    pub planes: Vec<Plane>,
    pub spheres: Vec<Sphere>,
    pub lights: Vec<Light>,
}

impl Scene {
    /// Rays that miss all geometry resolve to this material's color.
    pub const BACKGROUND_MATERIAL: u32 = 0;

    pub fn background_color(&self) -> Vec3f {
        self.materials[Self::BACKGROUND_MATERIAL as usize].color
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.materials.is_empty() {
            return Err(ConfigError::NoMaterials);
        }
        let check_material = |index: u32| {
            if index as usize >= self.materials.len() {
                Err(ConfigError::MaterialIndexOutOfRange {
                    index,
                    count: self.materials.len(),
                })
            } else {
                Ok(())
            }
        };

        let mut plane_ids = HashSet::new();
        for plane in &self.planes {
            if !plane_ids.insert(plane.id) {
                return Err(ConfigError::DuplicateObjectId { id: plane.id });
            }
            if plane.normal.norm_squared() <= TOLERANCE {
                return Err(ConfigError::DegeneratePlaneNormal { id: plane.id });
            }
            check_material(plane.material)?;
            check_material(plane.secondary_material)?;
        }

        let mut sphere_ids = HashSet::new();
        for sphere in &self.spheres {
            if !sphere_ids.insert(sphere.id) {
                return Err(ConfigError::DuplicateObjectId { id: sphere.id });
            }
            if !(sphere.radius > 0.0) {
                return Err(ConfigError::NonPositiveRadius {
                    id: sphere.id,
                    radius: sphere.radius,
                });
            }
            check_material(sphere.material)?;
        }

        for (index, light) in self.lights.iter().enumerate() {
            if !(light.intensity >= 0.0) {
                return Err(ConfigError::NegativeLightIntensity {
                    index,
                    intensity: light.intensity,
                });
            }
            if let LightKind::Directional { inverted_direction } = &light.kind {
                if inverted_direction.norm_squared() <= TOLERANCE {
                    return Err(ConfigError::DegenerateLightDirection { index });
                }
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AntiAliasMode {
    None,
    Supersample,
}

#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub anti_alias: AntiAliasMode,
    /// Total primary rays per pixel when supersampling; must equal
    /// `samples_per_axis` squared.
    pub samples_per_pixel: u32,
    pub samples_per_axis: u32,
    /// Shadow rays cast per light per shading point.
    pub shadow_samples_per_light: u32,
    /// Radius of the jitter disc the shadow rays start from.
    pub shadow_region_radius: Fp,
}

impl RenderOptions {
    pub fn minimal() -> RenderOptions {
        RenderOptions {
            anti_alias: AntiAliasMode::Supersample,
            samples_per_pixel: 1,
            samples_per_axis: 1,
            shadow_samples_per_light: 1,
            shadow_region_radius: 0.5,
        }
    }

    pub fn development() -> RenderOptions {
        RenderOptions {
            anti_alias: AntiAliasMode::Supersample,
            samples_per_pixel: 4,
            samples_per_axis: 2,
            shadow_samples_per_light: 128,
            shadow_region_radius: 0.5,
        }
    }

    pub fn maximum() -> RenderOptions {
        RenderOptions {
            anti_alias: AntiAliasMode::Supersample,
            samples_per_pixel: 16,
            samples_per_axis: 4,
            shadow_samples_per_light: 256,
            shadow_region_radius: 0.5,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shadow_samples_per_light == 0 {
            return Err(ConfigError::NoShadowSamples);
        }
        if !(self.shadow_region_radius > 0.0) {
            return Err(ConfigError::NonPositiveShadowRegion {
                radius: self.shadow_region_radius,
            });
        }
        if self.anti_alias == AntiAliasMode::Supersample {
            if self.samples_per_axis * self.samples_per_axis != self.samples_per_pixel {
                return Err(ConfigError::SampleGridMismatch {
                    axis: self.samples_per_axis,
                    samples: self.samples_per_pixel,
                });
            }
            if self.samples_per_pixel as usize > MAX_PIXEL_SAMPLES {
                return Err(ConfigError::TooManyPixelSamples {
                    samples: self.samples_per_pixel,
                    max: MAX_PIXEL_SAMPLES,
                });
            }
        }
        Ok(())
    }
}

/// Fatal configuration defects, rejected before any ray is traced.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("scene has no materials; material 0 doubles as the background")]
    NoMaterials,
    #[error("material index {index} out of range, {count} materials defined")]
    MaterialIndexOutOfRange { index: u32, count: usize },
    #[error("duplicate object id {id} within one geometry collection")]
    DuplicateObjectId { id: u32 },
    #[error("sphere {id} has non-positive radius {radius}")]
    NonPositiveRadius { id: u32, radius: Fp },
    #[error("plane {id} has a degenerate normal")]
    DegeneratePlaneNormal { id: u32 },
    #[error("light {index} has negative intensity {intensity}")]
    NegativeLightIntensity { index: usize, intensity: Fp },
    #[error("directional light {index} has a degenerate direction")]
    DegenerateLightDirection { index: usize },
    #[error("supersampling grid {axis}x{axis} does not yield {samples} samples per pixel")]
    SampleGridMismatch { axis: u32, samples: u32 },
    #[error("{samples} samples per pixel exceeds the supported maximum of {max}")]
    TooManyPixelSamples { samples: u32, max: usize },
    #[error("at least one shadow sample per light is required")]
    NoShadowSamples,
    #[error("shadow sample region radius must be positive, got {radius}")]
    NonPositiveShadowRegion { radius: Fp },
    #[error("image dimensions {width}x{height} must be non-zero and no taller than wide")]
    BadImageDimensions { width: u32, height: u32 },
    #[error("output buffer holds {buffer} pixels, image needs {expected}")]
    BufferSizeMismatch { buffer: usize, expected: usize },
    #[error("image height {height} is not divisible by the worker count {workers}")]
    UnevenRowBands { height: u32, workers: usize },
    #[error("failed to build the worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
