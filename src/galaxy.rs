//! The galaxy scene: parameters plus everything derived from them.
//!
//! [`Galaxy`] owns the cluster anchors, the star catalog and the most recent
//! density field, and keeps them consistent with its [`GalaxyParams`]. A
//! parameter change regenerates only what depends on the changed keys (see
//! [`ParamKey::regeneration`](crate::params::ParamKey::regeneration)); the
//! density field is rebuilt in the background and published by
//! [`poll`](Galaxy::poll) once ready. Until then the previous field (or none)
//! stays in use.
//!
//! ```ignore
//! let mut galaxy = Galaxy::new(GalaxyParams::default())?;
//! loop {
//!     galaxy.poll();
//!     let scene = galaxy.render_scene(&frame, time, Vec3::ZERO);
//!     let pixels = galaxy.render_frame(&frame, time, &scene);
//! }
//! ```

use std::sync::Arc;

use glam::Vec3;

use crate::builder::FieldBuilder;
use crate::camera::FrameCamera;
use crate::clusters::{generate_clusters, ClusterCenter, ClusterSpec};
use crate::error::{BuildError, GalaxyError};
use crate::field::{DensityField, FieldBuildRequest};
use crate::params::{regeneration_for, GalaxyParams, Regeneration};
use crate::raster::SceneBuffers;
use crate::raymarch::{self, VolumeConfig};
use crate::sampling::{SampleRng, CLUSTER_STREAM, STAR_STREAM};
use crate::stars::{generate_stars, StarCatalog};

/// A generated galaxy.
pub struct Galaxy {
    params: GalaxyParams,
    volume: VolumeConfig,
    clusters: Arc<[ClusterCenter]>,
    catalog: StarCatalog,
    builder: FieldBuilder,
    field: Option<DensityField>,
    field_generation: u64,
}

impl Galaxy {
    /// Generate clusters and stars for `params` and start the field build.
    pub fn new(params: GalaxyParams) -> Result<Self, GalaxyError> {
        params.validate()?;
        let mut galaxy = Self {
            volume: VolumeConfig::from_params(&params),
            params,
            clusters: Arc::from(Vec::new()),
            catalog: StarCatalog::default(),
            builder: FieldBuilder::new(),
            field: None,
            field_generation: 0,
        };
        galaxy.regenerate(Regeneration::ALL)?;
        Ok(galaxy)
    }

    /// Current parameters.
    pub fn params(&self) -> &GalaxyParams {
        &self.params
    }

    /// Uniforms for the volumetric pass.
    pub fn volume_config(&self) -> &VolumeConfig {
        &self.volume
    }

    /// Cluster anchors shared by the star sampler and the field builder.
    pub fn clusters(&self) -> &Arc<[ClusterCenter]> {
        &self.clusters
    }

    /// The star catalog.
    pub fn catalog(&self) -> &StarCatalog {
        &self.catalog
    }

    /// The published density field, if any build has finished.
    pub fn field(&self) -> Option<&DensityField> {
        self.field.as_ref()
    }

    /// Build generation of the published field (0 if none).
    pub fn field_generation(&self) -> u64 {
        self.field_generation
    }

    /// Whether a field build is in flight.
    pub fn is_building(&self) -> bool {
        self.builder.is_pending()
    }

    /// Apply new parameters, regenerating what they invalidate.
    ///
    /// Invalid parameters are rejected and the galaxy is left unchanged. If
    /// the field build cannot start, the new parameters, clusters and stars
    /// are kept along with the previous field and [`GalaxyError::Build`] is
    /// returned.
    pub fn update_params(&mut self, params: GalaxyParams) -> Result<Regeneration, GalaxyError> {
        params.validate()?;
        let changed = self.params.diff(&params);
        if changed.is_empty() {
            return Ok(Regeneration::NONE);
        }
        let regeneration = regeneration_for(&changed);
        log::info!(
            "parameters changed: {}",
            changed.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
        );
        self.params = params;
        self.volume = VolumeConfig::from_params(&self.params);
        self.regenerate(regeneration)?;
        Ok(regeneration)
    }

    /// Regenerate everything with a fresh seed.
    pub fn reseed(&mut self, seed: u64) -> Result<(), BuildError> {
        log::info!("reseeding galaxy with {seed}");
        self.params.seed = Some(seed);
        self.regenerate(Regeneration::ALL)
    }

    fn regenerate(&mut self, what: Regeneration) -> Result<(), BuildError> {
        if what.clusters {
            let mut rng = SampleRng::for_stream(self.params.seed, CLUSTER_STREAM);
            self.clusters = generate_clusters(&ClusterSpec::from_params(&self.params), &mut rng).into();
            log::info!("generated {} clusters", self.clusters.len());
        }
        if what.stars {
            let mut rng = SampleRng::for_stream(self.params.seed, STAR_STREAM);
            self.catalog = generate_stars(&self.params, &self.clusters, &mut rng);
            log::info!("generated {} stars", self.catalog.len());
        }
        if what.field {
            let request = FieldBuildRequest::from_params(&self.params, Arc::clone(&self.clusters));
            log::info!("building {}³ density field", request.grid_size);
            self.builder.request(request)?;
        }
        Ok(())
    }

    /// Publish a finished field build, if any. Never blocks.
    ///
    /// Returns `true` when a new field was published.
    pub fn poll(&mut self) -> bool {
        match self.builder.poll() {
            Some(Ok(built)) => {
                self.publish(built.generation, built.field);
                true
            }
            _ => false,
        }
    }

    /// Block until the outstanding build finishes, then publish it.
    pub fn wait_for_field(&mut self) -> Option<&DensityField> {
        if let Some(Ok(built)) = self.builder.wait() {
            self.publish(built.generation, built.field);
        }
        self.field.as_ref()
    }

    fn publish(&mut self, generation: u64, field: DensityField) {
        log::info!("published density field {generation}");
        self.field = Some(field);
        self.field_generation = generation;
    }

    /// Stars splatted over `background` at `time`.
    pub fn render_scene(&self, camera: &FrameCamera, time: f32, background: Vec3) -> SceneBuffers {
        let mut scene = SceneBuffers::new(camera.width, camera.height);
        scene.clear(background);
        scene.splat_stars(&self.catalog, camera, time, self.params.orbital_time_scale);
        scene
    }

    /// Composite the volumetric pass over `scene`.
    ///
    /// Without a published field the scene passes through unchanged.
    pub fn render_frame(&self, camera: &FrameCamera, time: f32, scene: &SceneBuffers) -> Vec<Vec3> {
        match &self.field {
            Some(field) => raymarch::render_frame(field, camera, scene, time, &self.volume),
            None => scene.color().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    fn small() -> GalaxyParams {
        GalaxyParams::default()
            .with_num_stars(500)
            .with_grid_size(16)
            .with_seed(11)
    }

    #[test]
    fn test_new_generates_everything() {
        let mut galaxy = Galaxy::new(small()).unwrap();
        assert_eq!(galaxy.catalog().len(), 500);
        assert_eq!(galaxy.clusters().len(), 20);
        assert!(galaxy.is_building());
        let field = galaxy.wait_for_field().unwrap();
        assert_eq!(field.grid_size(), 16);
        assert!(!galaxy.is_building());
        assert_eq!(galaxy.field_generation(), 1);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let bad = GalaxyParams {
            spiral_arms: 0,
            ..small()
        };
        assert!(Galaxy::new(bad.clone()).is_err());

        let mut galaxy = Galaxy::new(small()).unwrap();
        assert!(galaxy.update_params(bad).is_err());
        assert_eq!(galaxy.params().spiral_arms, 2);
    }

    #[test]
    fn test_uniform_change_regenerates_nothing() {
        let mut galaxy = Galaxy::new(small()).unwrap();
        galaxy.wait_for_field();
        let before = galaxy.catalog().clone();
        let params = GalaxyParams {
            density_factor: 1.5,
            ..galaxy.params().clone()
        };
        let regen = galaxy.update_params(params).unwrap();
        assert!(!regen.any());
        assert!(!galaxy.is_building());
        assert_eq!(galaxy.volume_config().density_factor, 1.5);
        assert!(before.ptr_eq(galaxy.catalog()));
    }

    #[test]
    fn test_star_change_keeps_clusters() {
        let mut galaxy = Galaxy::new(small()).unwrap();
        let clusters = Arc::clone(galaxy.clusters());
        let params = galaxy.params().clone().with_num_stars(200);
        let regen = galaxy.update_params(params).unwrap();
        assert!(regen.stars && !regen.clusters && !regen.field);
        assert_eq!(galaxy.catalog().len(), 200);
        assert!(Arc::ptr_eq(&clusters, galaxy.clusters()));
    }

    #[test]
    fn test_render_without_field_passes_scene_through() {
        let galaxy = Galaxy::new(small()).unwrap();
        let frame = Camera::new().frame(16, 12);
        let scene = galaxy.render_scene(&frame, 0.0, Vec3::splat(0.1));
        let out = galaxy.render_frame(&frame, 0.0, &scene);
        if galaxy.field().is_none() {
            assert_eq!(out, scene.color());
        }
        assert_eq!(out.len(), 16 * 12);
    }

    #[test]
    fn test_reseed_changes_stars() {
        let mut galaxy = Galaxy::new(small()).unwrap();
        let before = galaxy.catalog().stars()[0];
        galaxy.reseed(99).unwrap();
        assert_eq!(galaxy.params().seed, Some(99));
        assert_ne!(galaxy.catalog().stars()[0], before);
    }

    #[test]
    fn test_failed_spawn_keeps_rendering() {
        let mut galaxy = Galaxy::new(small()).unwrap();
        galaxy.wait_for_field();
        assert_eq!(galaxy.field_generation(), 1);

        galaxy.builder = FieldBuilder::with_spawner(|_, _| Err(std::io::Error::other("no threads left")));
        let params = galaxy.params().clone().with_grid_size(8);
        let err = galaxy.update_params(params).unwrap_err();
        assert!(matches!(err, GalaxyError::Build(BuildError::Spawn(_))));
        assert_eq!(galaxy.params().density_grid_size, 8);
        assert!(!galaxy.is_building());
        assert!(!galaxy.poll());

        // The previous field stays published and the frame still renders.
        assert_eq!(galaxy.field_generation(), 1);
        assert_eq!(galaxy.field().unwrap().grid_size(), 16);
        let frame = Camera::new().frame(16, 12);
        let scene = galaxy.render_scene(&frame, 0.0, Vec3::splat(0.1));
        let out = galaxy.render_frame(&frame, 0.0, &scene);
        assert_eq!(out.len(), 16 * 12);
        assert!(out.iter().all(|c| c.is_finite()));

        assert!(matches!(galaxy.reseed(5), Err(BuildError::Spawn(_))));
        assert_eq!(galaxy.params().seed, Some(5));
    }

    #[test]
    fn test_failed_spawn_without_field_passes_scene_through() {
        let mut galaxy = Galaxy::new(small()).unwrap();
        galaxy.builder = FieldBuilder::with_spawner(|_, _| Err(std::io::Error::other("no threads left")));
        assert!(galaxy.reseed(12).is_err());
        assert!(galaxy.wait_for_field().is_none());

        let frame = Camera::new().frame(8, 6);
        let scene = galaxy.render_scene(&frame, 0.0, Vec3::splat(0.2));
        assert_eq!(galaxy.render_frame(&frame, 0.0, &scene), scene.color());
    }
}
