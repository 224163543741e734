//! Culling demo
//!
//! Scatters static and moving objects through a cube of space, orbits a
//! camera around it and logs how many objects survive culling each frame.
//! Halfway through, a batch of moving objects and then a batch of static
//! objects are erased to exercise in-place reindexing and lazy rebuilds.
//!
//! Usage: `octree_cull_demo [config.toml|config.ron]`

use octree_cull::config::ConfigError;
use octree_cull::foundation::logging;
use octree_cull::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

// Scene layout
const SCENE_SIZE: f32 = 100.0; // Objects span -50 to +50 on each axis
const NUM_STATIC: usize = 2000;
const NUM_MOVING: usize = 200;
const NUM_OVERLAY: usize = 4;

// Camera orbit
const ORBIT_RADIUS: f32 = 80.0;
const ORBIT_HEIGHT: f32 = 25.0;
const FRAMES: usize = 120;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("failed to load culling config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

fn random_box(rng: &mut StdRng, max_half: f32) -> AABB {
    let half = SCENE_SIZE * 0.5;
    let center = Vec3::new(
        rng.gen_range(-half..half),
        rng.gen_range(-half..half),
        rng.gen_range(-half..half),
    );
    let extent = rng.gen_range(0.2..max_half);
    AABB::from_center_extents(center, Vec3::new(extent, extent, extent))
}

fn populate(scene: &mut SceneManager, rng: &mut StdRng) {
    for _ in 0..NUM_STATIC {
        scene.add_object(SceneObject::static_cullable(random_box(rng, 2.0)));
    }
    for _ in 0..NUM_MOVING {
        scene.add_object(SceneObject::moveable(random_box(rng, 1.0)));
    }
    for _ in 0..NUM_OVERLAY {
        scene.add_object(SceneObject::overlay(AABB::zero()));
    }
    log::info!("Populated scene with {} objects", scene.objects().len());
}

/// Nudge every moving object a little along x
fn step_moving(scene: &mut SceneManager, rng: &mut StdRng) -> Result<(), DemoError> {
    let moving: Vec<(usize, AABB)> = scene
        .objects()
        .iter()
        .enumerate()
        .filter(|(_, object)| object.attrib.contains(ObjectAttrib::MOVEABLE))
        .map(|(index, object)| (index, object.bounds))
        .collect();

    for (index, bounds) in moving {
        let offset = Vec3::new(rng.gen_range(-0.5..0.5), 0.0, 0.0);
        scene.set_object_bounds(index, AABB::new(bounds.min + offset, bounds.max + offset))?;
    }
    Ok(())
}

/// Erase up to `count` objects matching `predicate`, highest index first
fn erase_where(
    scene: &mut SceneManager,
    count: usize,
    predicate: impl Fn(&SceneObject) -> bool,
) -> Result<usize, DemoError> {
    let doomed: Vec<usize> = scene
        .objects()
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, object)| predicate(*object))
        .map(|(index, _)| index)
        .take(count)
        .collect();

    for &index in &doomed {
        scene.del_object(index)?;
    }
    Ok(doomed.len())
}

fn run(config: &CullingConfig) -> Result<(), DemoError> {
    let mut rng = StdRng::seed_from_u64(0x0c7);
    let mut scene = SceneManager::with_config(config);
    populate(&mut scene, &mut rng);

    let mut camera = CullCamera::perspective(Vec3::new(ORBIT_RADIUS, ORBIT_HEIGHT, 0.0), 60.0, 16.0 / 9.0, 0.5, 400.0);
    let origin = BoundingSphere::new(Vec3::zeros(), 5.0);

    for frame in 0..FRAMES {
        let angle = frame as f32 / FRAMES as f32 * 2.0 * PI;
        camera.set_position(Vec3::new(
            ORBIT_RADIUS * angle.cos(),
            ORBIT_HEIGHT,
            ORBIT_RADIUS * angle.sin(),
        ));

        if frame == FRAMES / 2 {
            let moved = erase_where(&mut scene, NUM_MOVING / 2, |o| !o.is_tree_resident())?;
            let statics = erase_where(&mut scene, 50, SceneObject::is_tree_resident)?;
            log::info!("Frame {frame}: erased {moved} untracked and {statics} static objects");
        }

        step_moving(&mut scene, &mut rng)?;
        scene.clip_scene(&camera);

        if frame % 10 == 0 {
            log::info!(
                "Frame {frame}: {}/{} visible ({} culler), origin visible: {}",
                scene.num_objects_visible(),
                scene.objects().len(),
                scene.culler_name(),
                scene.sphere_visible(&origin)
            );
        }
    }

    camera.set_omnidirectional(true);
    scene.clip_scene(&camera);
    log::info!(
        "Omnidirectional: {}/{} visible",
        scene.num_objects_visible(),
        scene.objects().len()
    );

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading culling config from {path}");
            CullingConfig::load_from_file(&path).map_err(DemoError::from)?
        }
        None => CullingConfig::default(),
    };
    log::info!("Culling config: {:?}", config);

    run(&config)?;
    Ok(())
}
