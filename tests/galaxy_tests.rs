//! End-to-end tests: parameters in, stars, density field and pixels out.

use glam::Vec3;
use spiral_galaxy::density::SpiralArms;
use spiral_galaxy::orbit::corotate_sample_point;
use spiral_galaxy::raster::to_rgba8;
use spiral_galaxy::{save_image, Camera, Galaxy, GalaxyParams};

fn small(seed: u64) -> GalaxyParams {
    GalaxyParams::default()
        .with_num_stars(1_000)
        .with_grid_size(16)
        .with_seed(seed)
}

// ============================================================================
// Star catalog
// ============================================================================

#[test]
fn test_stars_concentrate_on_arms() {
    let params = GalaxyParams::default()
        .with_galactic_radius(5.0)
        .with_disc_scale_length(0.3)
        .with_spiral_arms(2)
        .with_pitch(13.0)
        .with_arm_shape(0.5, 0.35)
        .with_cluster_influence(0.0)
        .with_num_stars(10_000)
        .with_seed(2024);
    let arms = SpiralArms::from_params(&params);
    let galaxy = Galaxy::new(params).unwrap();

    let on_arm = galaxy
        .catalog()
        .stars()
        .iter()
        .filter(|s| arms.nearest_distance(s.r, s.theta0) < arms.width)
        .count();
    let fraction = on_arm as f32 / galaxy.catalog().len() as f32;
    assert!(fraction > 0.6, "only {:.1}% of stars on an arm", fraction * 100.0);
}

#[test]
fn test_same_seed_same_galaxy() {
    let mut a = Galaxy::new(small(17)).unwrap();
    let mut b = Galaxy::new(small(17)).unwrap();
    assert_eq!(a.catalog().stars(), b.catalog().stars());
    assert_eq!(a.clusters(), b.clusters());

    let fa = a.wait_for_field().unwrap().as_slice().to_vec();
    let fb = b.wait_for_field().unwrap().as_slice();
    assert_eq!(fa.as_slice(), fb);
}

#[test]
fn test_different_seed_different_galaxy() {
    let a = Galaxy::new(small(1)).unwrap();
    let b = Galaxy::new(small(2)).unwrap();
    assert_ne!(a.catalog().stars(), b.catalog().stars());
}

// ============================================================================
// Orbits
// ============================================================================

#[test]
fn test_gas_corotates_with_stars() {
    let galaxy = Galaxy::new(small(5)).unwrap();
    let scale = galaxy.params().orbital_time_scale;
    for star in galaxy.catalog().stars().iter().take(100) {
        let start = star.position_at(0.0, scale);
        let later = star.position_at(12.5, scale);
        let back = corotate_sample_point(later, 12.5, scale);
        assert!(back.distance(start) < 1e-3, "{back} != {start}");
    }
}

// ============================================================================
// Parameter changes
// ============================================================================

#[test]
fn test_json_update_rebuilds_field() {
    let mut galaxy = Galaxy::new(small(3)).unwrap();
    galaxy.wait_for_field();
    assert_eq!(galaxy.field_generation(), 1);

    let mut params = GalaxyParams::from_json_str(r#"{ "spiral_arms": 3, "density_grid_size": 12 }"#).unwrap();
    params.num_stars = 1_000;
    params.seed = Some(3);
    let regen = galaxy.update_params(params).unwrap();
    assert!(regen.clusters && regen.stars && regen.field);

    let field = galaxy.wait_for_field().unwrap();
    assert_eq!(field.grid_size(), 12);
    assert_eq!(galaxy.field_generation(), 2);
    assert_eq!(galaxy.params().spiral_arms, 3);
}

#[test]
fn test_rejected_update_keeps_field() {
    let mut galaxy = Galaxy::new(small(3)).unwrap();
    galaxy.wait_for_field();
    let bad = GalaxyParams {
        galactic_radius: f32::NAN,
        ..galaxy.params().clone()
    };
    assert!(galaxy.update_params(bad).is_err());
    assert!(!galaxy.is_building());
    assert!(galaxy.field().is_some());
}

// ============================================================================
// CPU rendering
// ============================================================================

#[test]
fn test_render_produces_visible_image() {
    let mut galaxy = Galaxy::new(small(8)).unwrap();
    galaxy.wait_for_field();

    let frame = Camera::new().with_distance(10.0).frame(48, 27);
    let scene = galaxy.render_scene(&frame, 0.0, Vec3::ZERO);
    let pixels = galaxy.render_frame(&frame, 0.0, &scene);

    assert_eq!(pixels.len(), 48 * 27);
    assert!(pixels.iter().all(|c| c.is_finite() && c.min_element() >= 0.0));
    assert!(pixels.iter().any(|c| c.max_element() > 0.0));

    let rgba = to_rgba8(&pixels);
    assert_eq!(rgba.len(), 48 * 27 * 4);
    assert!(rgba.chunks(4).all(|px| px[3] == 255));
}

#[test]
fn test_camera_outside_box_looking_away_sees_background() {
    let mut galaxy = Galaxy::new(small(8)).unwrap();
    galaxy.wait_for_field();

    // Camera well above the disc, looking up along +Z.
    let camera = Camera {
        target: Vec3::new(0.0, 0.0, 100.0),
        ..Camera::new().with_angles(0.0, -1.5).with_distance(20.0)
    };
    let frame = camera.frame(16, 9);
    let background = Vec3::new(0.02, 0.03, 0.05);
    let scene = galaxy.render_scene(&frame, 0.0, background);
    let pixels = galaxy.render_frame(&frame, 0.0, &scene);
    for p in pixels {
        assert!((p - background).length() < 1e-6);
    }
}

#[test]
fn test_save_and_reload_png() {
    let galaxy = Galaxy::new(small(9)).unwrap();
    let frame = Camera::new().frame(20, 10);
    let scene = galaxy.render_scene(&frame, 0.0, Vec3::ZERO);
    let pixels = galaxy.render_frame(&frame, 0.0, &scene);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("galaxy.png");
    save_image(&path, 20, 10, &pixels).unwrap();

    let image = image::open(&path).unwrap();
    assert_eq!((image.width(), image.height()), (20, 10));
}
