//! # Spiral Galaxy
//!
//! A procedural spiral galaxy: a seeded star catalog that rotates
//! differentially, a voxelized gas and dust density field built in the
//! background, and a single-scattering volumetric raymarcher that composites
//! the medium over the stars.
//!
//! ## Quick Start
//!
//! ```ignore
//! use spiral_galaxy::prelude::*;
//!
//! let params = GalaxyParams::default().with_seed(7).with_spiral_arms(4);
//! let mut galaxy = Galaxy::new(params)?;
//! galaxy.wait_for_field();
//!
//! let frame = Camera::new().frame(640, 360);
//! let scene = galaxy.render_scene(&frame, 0.0, Vec3::ZERO);
//! let pixels = galaxy.render_frame(&frame, 0.0, &scene);
//! save_image("galaxy.png", 640, 360, &pixels)?;
//! ```
//!
//! ## Core Concepts
//!
//! ### Density model
//!
//! [`DensityModel`] combines an exponential disc, a Sérsic bulge and a
//! logarithmic spiral arm boost into the surface density the star sampler and
//! the voxelizer share.
//!
//! ### Clusters
//!
//! A fixed number of [`ClusterCenter`]s, 70% on the arms, anchor both the
//! stars ([`cluster_influence`](GalaxyParams::cluster_influence)) and the
//! gas clumping in the density field.
//!
//! ### Orbits
//!
//! Every star keeps its initial `(r, θ₀, z)`. Its position at time `t` is
//! computed from a Keplerian angular velocity, so nothing is integrated and
//! the GPU can place stars directly in the vertex shader. The raymarcher
//! co-rotates its sample points with the same law.
//!
//! ### Rendering
//!
//! The [`gpu`] module renders interactively with wgpu; [`raster`] and
//! [`raymarch`] produce the same image on the CPU (used by the
//! `galaxy-render` binary and the tests).
//!
//! ## Parameters
//!
//! All tunables live in [`GalaxyParams`], which round-trips through JSON.
//! Changing a parameter regenerates only what depends on it:
//!
//! | Changed | Clusters | Stars | Field |
//! |---------|----------|-------|-------|
//! | shape (radius, arms, pitch, ...) | yes | yes | yes |
//! | star count / colours | | yes | |
//! | grid size / noise | | | yes |
//! | optics, light, time scale | | | |

pub mod builder;
pub mod camera;
pub mod clusters;
pub mod density;
pub mod error;
pub mod field;
pub mod galaxy;
pub mod gpu;
pub mod noise;
pub mod orbit;
pub mod params;
pub mod raster;
pub mod raymarch;
pub mod sampling;
pub mod shader_utils;
pub mod stars;
pub mod viewer;

pub use builder::{BuiltField, FieldBuilder};
pub use camera::{Camera, FrameCamera};
pub use clusters::{generate_clusters, ClusterCenter, ClusterSpec};
pub use density::{DensityModel, SpiralArms};
pub use error::{BuildError, GalaxyError, GpuError, ParamError, RenderError, ViewerError};
pub use field::{build_density_field, DensityField, FieldBounds, FieldBuildRequest};
pub use galaxy::Galaxy;
pub use glam::{Vec2, Vec3};
pub use params::{GalaxyParams, HexColor, ParamKey, Regeneration};
pub use raster::{save_image, SceneBuffers};
pub use raymarch::{VolumeConfig, VolumeSampler};
pub use sampling::SampleRng;
pub use stars::{generate_stars, StarCatalog, StarRecord, StarType};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use spiral_galaxy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::{Camera, FrameCamera};
    pub use crate::error::{GalaxyError, ParamError, RenderError};
    pub use crate::galaxy::Galaxy;
    pub use crate::params::{GalaxyParams, HexColor, Regeneration};
    pub use crate::raster::{save_image, SceneBuffers};
    pub use crate::raymarch::VolumeConfig;
    pub use crate::stars::{StarCatalog, StarRecord, StarType};
    pub use crate::{Vec2, Vec3};
}
