use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::ui::render::{Canvas, Rect};

const PARTICLE_COUNT: usize = 220;
const MIN_SPEED: f32 = 15.0;
const MAX_SPEED: f32 = 60.0;
/// Radius the first particles are scattered over; anything past the surface
/// edge respawns on the first step.
const INITIAL_SPREAD: f32 = 300.0;

struct Particle {
    angle: f32,
    /// Distance from the surface center, in pixels.
    distance: f32,
    /// Base outward speed, pixels per second.
    speed: f32,
}

/// Particles streaming out of the surface center, drawn while nothing has
/// been shown yet.
pub struct ParticleField {
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let particles = (0..PARTICLE_COUNT)
            .map(|_| spawn(&mut rng, INITIAL_SPREAD))
            .collect();
        Self { particles, rng }
    }

    /// Advance by `dt` seconds on a `width` x `height` surface.
    pub fn step(&mut self, dt: f32, width: u32, height: u32) {
        let limit = edge_distance(width, height);
        let rng = &mut self.rng;
        for p in &mut self.particles {
            // Faster toward the edge, like a star field.
            let boost = 1.0 + 3.0 * (p.distance / limit);
            p.distance += p.speed * boost * dt;
            if p.distance > limit {
                *p = spawn(rng, limit * 0.05);
            }
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let limit = edge_distance(canvas.width(), canvas.height());
        let cx = canvas.width() as f32 / 2.0;
        let cy = canvas.height() as f32 / 2.0;

        for p in &self.particles {
            let t = (p.distance / limit).min(1.0);
            let shade = (40.0 + 215.0 * t) as u8;
            let size = 1 + (t * 3.0) as u32;
            let x = (cx + p.angle.cos() * p.distance) as i32;
            let y = (cy + p.angle.sin() * p.distance) as i32;
            canvas.fill_rect(Rect::new(x, y, size, size), (shade, shade, shade), 255);
        }
    }
}

fn spawn(rng: &mut StdRng, max_distance: f32) -> Particle {
    Particle {
        angle: rng.random_range(0.0..TAU),
        distance: rng.random::<f32>() * max_distance,
        speed: rng.random_range(MIN_SPEED..MAX_SPEED),
    }
}

/// Distance from the center to a corner, where particles leave the surface.
fn edge_distance(width: u32, height: u32) -> f32 {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    (w * w + h * h).sqrt() / 2.0
}
