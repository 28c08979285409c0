//! Galaxy configuration.
//!
//! [`GalaxyParams`] is the single typed configuration snapshot every
//! generator reads from. All fields carry explicit defaults, so a JSON preset
//! only needs to mention the values it changes:
//!
//! ```ignore
//! let params = GalaxyParams::from_json_str(r#"{ "spiral_arms": 4, "seed": 7 }"#)?;
//! assert_eq!(params.num_stars, 10_000);
//! ```
//!
//! Several fields are authored as fractions of `galactic_radius`
//! (`disc_scale_length`, `bulge_radius`, `vertical_scale_height`); the
//! `*_world` helpers convert them to world units.
//!
//! # Regeneration
//!
//! Changing a parameter only rebuilds the structures that depend on it.
//! [`GalaxyParams::diff`] lists the changed [`ParamKey`]s and
//! [`ParamKey::regeneration`] maps each to a [`Regeneration`] set.

use std::fmt;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Smallest accepted `density_grid_size`.
pub const MIN_GRID_SIZE: u32 = 8;
/// Largest accepted `density_grid_size`.
pub const MAX_GRID_SIZE: u32 = 256;
/// Hard cap on primary raymarch steps.
pub const MAX_RAY_MARCH_STEPS: u32 = 128;

/// An sRGB colour authored as `#rrggbb`, stored as linear-ish `0..1` floats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub Vec3);

impl HexColor {
    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn parse(s: &str) -> Result<Self, ParamError> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParamError::Color(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| ParamError::Color(s.to_string()))
        };
        Ok(Self(Vec3::new(channel(0)?, channel(2)?, channel(4)?)))
    }

    /// The colour as an RGB vector.
    pub fn rgb(self) -> Vec3 {
        self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = (self.0.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        write!(f, "#{:02x}{:02x}{:02x}", c.x as u8, c.y as u8, c.z as u8)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ParamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.to_string()
    }
}

/// Full configuration for one galaxy generation.
///
/// Owned by whoever drives the galaxy (viewer, CLI, tests); generators only
/// read it. Use the `with_*` builders or struct update syntax to override
/// defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyParams {
    /// Number of stars in the catalog.
    pub num_stars: u32,
    /// Base sprite size; per-type scaling is applied on top.
    pub star_size: f32,
    /// World radius `R` of the disc.
    pub galactic_radius: f32,
    /// Number of spiral arms (at least 1).
    pub spiral_arms: u32,
    /// Radius of the glowing core sprite in the viewer.
    pub core_radius: f32,
    /// Multiplier applied to elapsed seconds before the rotation law.
    pub orbital_time_scale: f32,
    /// Radial exponential scale length, as a fraction of `R`.
    pub disc_scale_length: f32,
    /// Bulge radius, as a fraction of `R`.
    pub bulge_radius: f32,
    /// Vertical exponential scale height, as a fraction of `R`.
    pub vertical_scale_height: f32,
    /// Spiral pitch angle in degrees.
    pub spiral_pitch_angle: f32,
    /// Probability in `[0, 1]` that a star snaps to a cluster.
    pub cluster_influence: f32,
    /// Number of cluster anchors.
    pub cluster_count: u32,
    /// Clusters are generated inside this fraction of `R`.
    pub cluster_radius_fraction: f32,
    /// Radius (world units) where the logarithmic spiral starts.
    pub base_radius: f32,
    /// Gaussian arm width in world units.
    pub arm_width: f32,
    /// Extra density on an arm centerline: density scales by `1 + m * arm`.
    pub arm_density_multiplier: f32,
    /// Scale applied to sampled field density while raymarching.
    pub density_factor: f32,
    /// Absorption coefficient of the gas.
    pub absorption_coefficient: f32,
    /// Scattering coefficient of the gas.
    pub scattering_coefficient: f32,
    /// Primary raymarch steps, capped at [`MAX_RAY_MARCH_STEPS`].
    pub ray_march_steps: u32,
    /// Intensity of the central point light.
    pub central_light_intensity: f32,
    /// Colour of mid-temperature gas.
    pub nebula_cool_color: HexColor,
    /// Colour of cold dust.
    pub nebula_dust_color: HexColor,
    /// Colour of hot gas.
    pub nebula_warm_color: HexColor,
    /// Spatial frequency of the field-builder noise.
    pub noise_scale: f32,
    /// Voxels per axis of the density field.
    pub density_grid_size: u32,
    /// RNG seed; `None` draws from entropy on every generation.
    pub seed: Option<u64>,
}

impl Default for GalaxyParams {
    fn default() -> Self {
        Self {
            num_stars: 10_000,
            star_size: 0.002,
            galactic_radius: 4.64,
            spiral_arms: 2,
            core_radius: 0.05,
            orbital_time_scale: 20.9,
            disc_scale_length: 0.43,
            bulge_radius: 0.05,
            vertical_scale_height: 0.04,
            spiral_pitch_angle: 20.0,
            cluster_influence: 0.11,
            cluster_count: 20,
            cluster_radius_fraction: 0.8,
            base_radius: 0.6,
            arm_width: 1.0,
            arm_density_multiplier: 2.3,
            density_factor: 0.6,
            absorption_coefficient: 1.1,
            scattering_coefficient: 2.0,
            ray_march_steps: 40,
            central_light_intensity: 2.0,
            nebula_cool_color: HexColor(Vec3::new(0x1f as f32, 0x47 as f32, 0xf2 as f32) / 255.0),
            nebula_dust_color: HexColor(Vec3::new(0x8c as f32, 0x40 as f32, 0x1f as f32) / 255.0),
            nebula_warm_color: HexColor(Vec3::new(0xff as f32, 0xdb as f32, 0xb3 as f32) / 255.0),
            noise_scale: 0.08,
            density_grid_size: 128,
            seed: None,
        }
    }
}

impl GalaxyParams {
    /// Default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON preset and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ParamError> {
        let params: GalaxyParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Load a JSON preset from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ParamError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), ParamError> {
        fn positive(field: &'static str, v: f32) -> Result<(), ParamError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ParamError::invalid(field, format!("must be a positive finite number, got {v}")))
            }
        }
        fn non_negative(field: &'static str, v: f32) -> Result<(), ParamError> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(ParamError::invalid(field, format!("must be finite and >= 0, got {v}")))
            }
        }

        if self.spiral_arms == 0 {
            return Err(ParamError::invalid("spiral_arms", "must be at least 1"));
        }
        positive("galactic_radius", self.galactic_radius)?;
        positive("disc_scale_length", self.disc_scale_length)?;
        positive("bulge_radius", self.bulge_radius)?;
        positive("vertical_scale_height", self.vertical_scale_height)?;
        positive("base_radius", self.base_radius)?;
        positive("arm_width", self.arm_width)?;
        positive("star_size", self.star_size)?;
        positive("noise_scale", self.noise_scale)?;
        positive("cluster_radius_fraction", self.cluster_radius_fraction)?;
        non_negative("arm_density_multiplier", self.arm_density_multiplier)?;
        non_negative("density_factor", self.density_factor)?;
        non_negative("absorption_coefficient", self.absorption_coefficient)?;
        non_negative("scattering_coefficient", self.scattering_coefficient)?;
        non_negative("central_light_intensity", self.central_light_intensity)?;
        non_negative("core_radius", self.core_radius)?;
        if !self.orbital_time_scale.is_finite() {
            return Err(ParamError::invalid("orbital_time_scale", "must be finite"));
        }
        if !self.spiral_pitch_angle.is_finite()
            || self.spiral_pitch_angle.abs() >= 90.0
        {
            return Err(ParamError::invalid(
                "spiral_pitch_angle",
                format!("must lie strictly between -90 and 90 degrees, got {}", self.spiral_pitch_angle),
            ));
        }
        if !(0.0..=1.0).contains(&self.cluster_influence) {
            return Err(ParamError::invalid(
                "cluster_influence",
                format!("must lie in [0, 1], got {}", self.cluster_influence),
            ));
        }
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.density_grid_size) {
            return Err(ParamError::invalid(
                "density_grid_size",
                format!("must lie in [{MIN_GRID_SIZE}, {MAX_GRID_SIZE}], got {}", self.density_grid_size),
            ));
        }
        if self.ray_march_steps == 0 {
            return Err(ParamError::invalid("ray_march_steps", "must be at least 1"));
        }
        Ok(())
    }

    // ========== Builders ==========

    /// Set the number of stars.
    pub fn with_num_stars(mut self, count: u32) -> Self {
        self.num_stars = count;
        self
    }

    /// Set the galactic radius in world units.
    pub fn with_galactic_radius(mut self, radius: f32) -> Self {
        self.galactic_radius = radius;
        self
    }

    /// Set the number of spiral arms.
    pub fn with_spiral_arms(mut self, arms: u32) -> Self {
        self.spiral_arms = arms;
        self
    }

    /// Set the spiral pitch angle in degrees.
    pub fn with_pitch(mut self, degrees: f32) -> Self {
        self.spiral_pitch_angle = degrees;
        self
    }

    /// Set the arm geometry: base radius and Gaussian width, both in world units.
    pub fn with_arm_shape(mut self, base_radius: f32, arm_width: f32) -> Self {
        self.base_radius = base_radius;
        self.arm_width = arm_width;
        self
    }

    /// Set the on-arm density multiplier.
    pub fn with_arm_density_multiplier(mut self, multiplier: f32) -> Self {
        self.arm_density_multiplier = multiplier;
        self
    }

    /// Set the disc scale length as a fraction of the radius.
    pub fn with_disc_scale_length(mut self, fraction: f32) -> Self {
        self.disc_scale_length = fraction;
        self
    }

    /// Set the probability that a star snaps to a cluster (clamped to 0-1).
    pub fn with_cluster_influence(mut self, influence: f32) -> Self {
        self.cluster_influence = influence.clamp(0.0, 1.0);
        self
    }

    /// Set the density field resolution.
    pub fn with_grid_size(mut self, size: u32) -> Self {
        self.density_grid_size = size;
        self
    }

    /// Fix the RNG seed for reproducible generation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    // ========== Derived quantities ==========

    /// Disc scale length in world units.
    #[inline]
    pub fn disc_scale_length_world(&self) -> f32 {
        self.disc_scale_length * self.galactic_radius
    }

    /// Bulge radius in world units.
    #[inline]
    pub fn bulge_radius_world(&self) -> f32 {
        self.bulge_radius * self.galactic_radius
    }

    /// Vertical scale height in world units.
    #[inline]
    pub fn vertical_scale_height_world(&self) -> f32 {
        self.vertical_scale_height * self.galactic_radius
    }

    /// Pitch angle in radians.
    #[inline]
    pub fn pitch_radians(&self) -> f32 {
        self.spiral_pitch_angle.to_radians()
    }

    /// Primary raymarch steps after applying the hard cap.
    #[inline]
    pub fn clamped_ray_march_steps(&self) -> u32 {
        self.ray_march_steps.clamp(1, MAX_RAY_MARCH_STEPS)
    }

    /// Bound on `|z|` for every generated star.
    #[inline]
    pub fn height_limit(&self) -> f32 {
        3.75 * self.vertical_scale_height_world()
    }
}

/// Which derived structures must be rebuilt after a parameter change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Regeneration {
    /// Cluster anchors (implies stars and field).
    pub clusters: bool,
    /// Star catalog.
    pub stars: bool,
    /// Density field.
    pub field: bool,
}

impl Regeneration {
    /// Nothing to rebuild.
    pub const NONE: Regeneration = Regeneration {
        clusters: false,
        stars: false,
        field: false,
    };

    /// Rebuild everything.
    pub const ALL: Regeneration = Regeneration {
        clusters: true,
        stars: true,
        field: true,
    };

    /// Union of two sets.
    pub fn merge(self, other: Regeneration) -> Regeneration {
        Regeneration {
            clusters: self.clusters || other.clusters,
            stars: self.stars || other.stars,
            field: self.field || other.field,
        }
    }

    /// Whether anything needs rebuilding.
    pub fn any(&self) -> bool {
        self.clusters || self.stars || self.field
    }
}

macro_rules! param_keys {
    ($($variant:ident => $field:ident),* $(,)?) => {
        /// Names one field of [`GalaxyParams`].
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ParamKey {
            $($variant,)*
        }

        impl ParamKey {
            /// Every key, in declaration order.
            pub const ALL: &'static [ParamKey] = &[$(ParamKey::$variant),*];

            /// The snake_case field name, as used in JSON presets.
            pub fn name(self) -> &'static str {
                match self {
                    $(ParamKey::$variant => stringify!($field),)*
                }
            }
        }

        impl GalaxyParams {
            /// Keys whose values differ between `self` and `other`.
            pub fn diff(&self, other: &GalaxyParams) -> Vec<ParamKey> {
                let mut changed = Vec::new();
                $(
                    if self.$field != other.$field {
                        changed.push(ParamKey::$variant);
                    }
                )*
                changed
            }
        }
    };
}

param_keys! {
    NumStars => num_stars,
    StarSize => star_size,
    GalacticRadius => galactic_radius,
    SpiralArms => spiral_arms,
    CoreRadius => core_radius,
    OrbitalTimeScale => orbital_time_scale,
    DiscScaleLength => disc_scale_length,
    BulgeRadius => bulge_radius,
    VerticalScaleHeight => vertical_scale_height,
    SpiralPitchAngle => spiral_pitch_angle,
    ClusterInfluence => cluster_influence,
    ClusterCount => cluster_count,
    ClusterRadiusFraction => cluster_radius_fraction,
    BaseRadius => base_radius,
    ArmWidth => arm_width,
    ArmDensityMultiplier => arm_density_multiplier,
    DensityFactor => density_factor,
    AbsorptionCoefficient => absorption_coefficient,
    ScatteringCoefficient => scattering_coefficient,
    RayMarchSteps => ray_march_steps,
    CentralLightIntensity => central_light_intensity,
    NebulaCoolColor => nebula_cool_color,
    NebulaDustColor => nebula_dust_color,
    NebulaWarmColor => nebula_warm_color,
    NoiseScale => noise_scale,
    DensityGridSize => density_grid_size,
    Seed => seed,
}

impl ParamKey {
    /// Structures that depend on this parameter.
    pub fn regeneration(self) -> Regeneration {
        use ParamKey::*;
        match self {
            GalacticRadius | SpiralArms | BaseRadius | SpiralPitchAngle | VerticalScaleHeight
            | ClusterCount | ClusterRadiusFraction | Seed => Regeneration::ALL,
            DiscScaleLength | ArmWidth | ArmDensityMultiplier => Regeneration {
                clusters: false,
                stars: true,
                field: true,
            },
            // Only star placement reads the cluster influence.
            NumStars | StarSize | BulgeRadius | ClusterInfluence => Regeneration {
                clusters: false,
                stars: true,
                field: false,
            },
            NoiseScale | DensityGridSize => Regeneration {
                clusters: false,
                stars: false,
                field: true,
            },
            CoreRadius | OrbitalTimeScale | DensityFactor | AbsorptionCoefficient
            | ScatteringCoefficient | RayMarchSteps | CentralLightIntensity | NebulaCoolColor
            | NebulaDustColor | NebulaWarmColor => Regeneration::NONE,
        }
    }
}

/// Union of the regeneration sets of every key in `keys`.
pub fn regeneration_for(keys: &[ParamKey]) -> Regeneration {
    keys.iter()
        .fold(Regeneration::NONE, |acc, key| acc.merge(key.regeneration()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let params = GalaxyParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.num_stars, 10_000);
        assert_eq!(params.spiral_arms, 2);
        assert!((params.galactic_radius - 4.64).abs() < 0.001);
    }

    #[test]
    fn test_world_unit_conversion() {
        let params = GalaxyParams::default().with_galactic_radius(10.0);
        assert!((params.disc_scale_length_world() - 4.3).abs() < 0.001);
        assert!((params.vertical_scale_height_world() - 0.4).abs() < 0.001);
        assert!((params.height_limit() - 1.5).abs() < 0.001);
    }

    #[test]
    fn test_zero_arms_rejected() {
        let params = GalaxyParams::default().with_spiral_arms(0);
        assert!(matches!(
            params.validate(),
            Err(ParamError::Invalid { field: "spiral_arms", .. })
        ));
    }

    #[test]
    fn test_non_finite_radius_rejected() {
        let params = GalaxyParams::default().with_galactic_radius(f32::NAN);
        assert!(params.validate().is_err());
        let params = GalaxyParams::default().with_galactic_radius(0.0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_grid_size_range() {
        assert!(GalaxyParams::default().with_grid_size(4).validate().is_err());
        assert!(GalaxyParams::default().with_grid_size(512).validate().is_err());
        assert!(GalaxyParams::default().with_grid_size(32).validate().is_ok());
    }

    #[test]
    fn test_cluster_influence_clamped_by_builder() {
        let params = GalaxyParams::default().with_cluster_influence(1.5);
        assert!((params.cluster_influence - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_ray_march_steps_capped() {
        let mut params = GalaxyParams::default();
        params.ray_march_steps = 1000;
        assert_eq!(params.clamped_ray_march_steps(), MAX_RAY_MARCH_STEPS);
    }

    #[test]
    fn test_hex_color_parse() {
        let c = HexColor::parse("#ff8000").unwrap();
        assert!((c.0.x - 1.0).abs() < 0.001);
        assert!((c.0.y - 128.0 / 255.0).abs() < 0.001);
        assert!(c.0.z.abs() < 0.001);
        assert_eq!(c.to_string(), "#ff8000");
        assert!(HexColor::parse("#ff80").is_err());
        assert!(HexColor::parse("#gg0000").is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params =
            GalaxyParams::from_json_str(r##"{ "spiral_arms": 4, "nebula_cool_color": "#000000" }"##)
                .unwrap();
        assert_eq!(params.spiral_arms, 4);
        assert_eq!(params.num_stars, 10_000);
        assert_eq!(params.nebula_cool_color.rgb(), Vec3::ZERO);
    }

    #[test]
    fn test_json_validation_runs() {
        let result = GalaxyParams::from_json_str(r#"{ "spiral_arms": 0 }"#);
        assert!(result.is_err());
        let result = GalaxyParams::from_json_str(r##"{ "nebula_dust_color": "red" }"##);
        assert!(matches!(result, Err(ParamError::Json(_))));
    }

    #[test]
    fn test_json_preserves_values() {
        let params = GalaxyParams::default().with_seed(42).with_spiral_arms(3);
        let json = params.to_json_string().unwrap();
        let parsed = GalaxyParams::from_json_str(&json).unwrap();
        assert!(params.diff(&parsed).is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");
        std::fs::write(&path, r#"{ "num_stars": 500 }"#).unwrap();
        let params = GalaxyParams::load(&path).unwrap();
        assert_eq!(params.num_stars, 500);
        assert!(matches!(
            GalaxyParams::load(dir.path().join("missing.json")),
            Err(ParamError::Io(_))
        ));
    }

    #[test]
    fn test_diff_lists_changed_keys() {
        let a = GalaxyParams::default();
        let b = a.clone().with_spiral_arms(3).with_num_stars(5);
        let changed = a.diff(&b);
        assert_eq!(changed, vec![ParamKey::NumStars, ParamKey::SpiralArms]);
    }

    #[test]
    fn test_regeneration_routing() {
        assert_eq!(ParamKey::SpiralArms.regeneration(), Regeneration::ALL);
        assert_eq!(ParamKey::DensityFactor.regeneration(), Regeneration::NONE);

        let stars_only = ParamKey::NumStars.regeneration();
        assert!(stars_only.stars && !stars_only.field && !stars_only.clusters);

        let influence = ParamKey::ClusterInfluence.regeneration();
        assert!(influence.stars && !influence.field && !influence.clusters);

        let field_only = ParamKey::NoiseScale.regeneration();
        assert!(field_only.field && !field_only.stars);

        let merged = regeneration_for(&[ParamKey::NumStars, ParamKey::NoiseScale]);
        assert!(merged.stars && merged.field && !merged.clusters);
        assert!(!regeneration_for(&[]).any());
    }

    #[test]
    fn test_param_key_names_match_json() {
        let json = serde_json::to_value(GalaxyParams::default()).unwrap();
        for key in ParamKey::ALL {
            assert!(json.get(key.name()).is_some(), "missing {}", key.name());
        }
    }
}
