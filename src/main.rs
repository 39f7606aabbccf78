//! Mode-7 core native harness
//!
//! Builds a procedural level, drives a camera around it for a few frames and
//! logs what each pass costs. The browser build loads the library directly.

#[cfg(not(target_arch = "wasm32"))]
mod harness {
    use std::time::{Duration, Instant};

    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use mode7_core::consts::{OBSTACLE_STRIDE, VISIBLE_STRIDE};
    use mode7_core::ground::{GroundTarget, MapTexture, SamplingPolicy, rasterize};
    use mode7_core::world::ViewQuery;
    use mode7_core::{CameraPose, FrameCore, GroundSettings, MotionState, PlayerPose, normalize_angle};

    const MAP_SIZE: usize = 1024;
    const GROUND_W: usize = 320;
    const GROUND_H: usize = 120;
    const OBSTACLES: usize = 800;
    const FRAMES: usize = 120;

    /// Checkerboard with a tint that drifts across the map
    fn checker_map(size: usize, cell: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(size * size * 4);
        for y in 0..size {
            for x in 0..size {
                let dark = ((x / cell) + (y / cell)) % 2 == 0;
                let shade = if dark { 60 } else { 140 };
                bytes.extend_from_slice(&[
                    shade,
                    (shade as usize + x * 64 / size) as u8,
                    (shade as usize + y * 64 / size) as u8,
                    255,
                ]);
            }
        }
        bytes
    }

    /// Flat `(x, y, radius, height, id, type)` records
    fn scatter_obstacles(rng: &mut Pcg32, count: usize) -> Vec<f32> {
        let mut data = Vec::with_capacity(count * OBSTACLE_STRIDE);
        for id in 0..count {
            data.extend_from_slice(&[
                rng.random_range(0.0..MAP_SIZE as f32),
                rng.random_range(0.0..MAP_SIZE as f32),
                rng.random_range(2.0..6.0),
                rng.random_range(1.0..20.0),
                id as f32,
                rng.random_range(0..4) as f32,
            ]);
        }
        data
    }

    #[derive(Default)]
    struct Timings {
        quality: Duration,
        performance: Duration,
        visibility: Duration,
        visible_records: usize,
        collisions: usize,
    }

    pub fn run(seed: u64) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let map = checker_map(MAP_SIZE, 32);
        let texture = match MapTexture::new(&map, MAP_SIZE, MAP_SIZE) {
            Ok(texture) => texture,
            Err(e) => {
                log::error!("Bad map: {}", e);
                return;
            }
        };

        let mut core = FrameCore::new(GroundSettings::load());
        let report = core.append_obstacle_batch(&scatter_obstacles(&mut rng, OBSTACLES), OBSTACLES);
        log::info!(
            "Level ready: seed {}, {} obstacles ({} dropped)",
            seed,
            core.obstacle_count(),
            report.dropped()
        );

        let map_size = Vec2::splat(MAP_SIZE as f32);
        let mut ground = vec![0u8; GROUND_W * GROUND_H * 4];
        let mut visible = vec![0.0f32; mode7_core::consts::MAX_PROCESSED * VISIBLE_STRIDE];
        let mut camera = CameraPose {
            pos: Vec2::new(100.0, 100.0),
            height: 8.0,
            angle: 0.3,
            fov: 60f32.to_radians(),
            focal_factor: GROUND_H as f32 * 4.0,
            render_distance: 300.0,
        };
        let mut player = PlayerPose {
            pos: Vec2::ZERO,
            height: 0.0,
            radius: 3.0,
        };
        let mut timings = Timings::default();

        for frame in 0..FRAMES {
            let rotating = frame % 40 >= 30;
            if rotating {
                camera.angle = normalize_angle(camera.angle + 0.05);
            }
            // Wrap the camera like the host integrator does
            camera.pos = (camera.pos + camera.forward() * 6.0).rem_euclid(map_size);
            player.pos = (camera.pos + camera.forward() * 40.0).rem_euclid(map_size);

            let projection = camera.projection();
            let Ok(mut target) = GroundTarget::new(&mut ground, GROUND_W, GROUND_H) else {
                log::error!("Ground buffer too small");
                return;
            };

            let start = Instant::now();
            rasterize(&mut target, &texture, &projection, &SamplingPolicy::Quality);
            timings.quality += start.elapsed();

            let start = Instant::now();
            let motion = MotionState {
                moving: true,
                rotating,
                tilt: 0.0,
            };
            core.render_ground(&mut target, &texture, &projection, motion);
            timings.performance += start.elapsed();

            let start = Instant::now();
            let query = ViewQuery {
                camera,
                player,
                map_size,
            };
            timings.visible_records += core.process_visible_into(&query, &mut visible);
            timings.visibility += start.elapsed();

            let next = player.pos + camera.forward() * 6.0;
            if let Some(hit) = core.first_collision(&player, next, map_size) {
                timings.collisions += 1;
                log::debug!("Frame {}: player would hit obstacle {}", frame, hit.id);
            }
        }

        let per_frame = |d: Duration| d / FRAMES as u32;
        log::info!(
            "{} frames: quality {:?}/frame, performance {:?}/frame, visibility {:?}/frame",
            FRAMES,
            per_frame(timings.quality),
            per_frame(timings.performance),
            per_frame(timings.visibility)
        );
        log::info!(
            "Avg {} visible copies per frame, {} blocked moves",
            timings.visible_records / FRAMES,
            timings.collisions
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Mode-7 core (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed);
    harness::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start in the library, this is just to satisfy the compiler
}
