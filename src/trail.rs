use rand::seq::SliceRandom;
use rand::Rng;

/// Symbols from freshest to oldest.
const FADE: [char; 4] = ['●', '•', '∙', '·'];
const MAX_PARTICLES: usize = 48;

/// One fading dot left behind by the pointer, in terminal cell coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailParticle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub age: f64,
    pub max_age: f64,
    pub color_index: usize,
}

impl TrailParticle {
    fn new<R: Rng + ?Sized>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-0.4..0.4),
            vel_y: rng.gen_range(-0.2..0.2),
            age: 0.0,
            max_age: rng.gen_range(0.4..0.8),
            color_index: rng.gen_range(0..6),
        }
    }

    fn burst<R: Rng + ?Sized>(x: f64, y: f64, rng: &mut R) -> Self {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let speed = rng.gen_range(4.0..9.0);
        Self {
            vel_x: angle.cos() * speed * 2.0,
            vel_y: angle.sin() * speed,
            max_age: rng.gen_range(0.3..0.6),
            ..Self::new(x, y, rng)
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_x *= 0.85;
        self.vel_y *= 0.85;
        self.age += dt;
        self.age < self.max_age
    }

    pub fn symbol(&self) -> char {
        let life = (self.age / self.max_age).clamp(0.0, 0.999);
        FADE[(life * FADE.len() as f64) as usize]
    }
}

/// Pointer trail plus the small burst shown on a hit.
#[derive(Debug, Default)]
pub struct CursorTrail {
    pub particles: Vec<TrailParticle>,
    last: Option<(u16, u16)>,
}

impl CursorTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.particles.is_empty()
    }

    /// Drop a particle at the pointer if it moved to a new cell.
    pub fn pointer_moved(&mut self, column: u16, row: u16) {
        if self.last == Some((column, row)) {
            return;
        }
        self.last = Some((column, row));
        let mut rng = rand::thread_rng();
        self.push(TrailParticle::new(column as f64, row as f64, &mut rng));
    }

    pub fn burst(&mut self, column: u16, row: u16) {
        let mut rng = rand::thread_rng();
        let count = *[5usize, 6, 8].choose(&mut rng).unwrap_or(&6);
        for _ in 0..count {
            self.push(TrailParticle::burst(column as f64, row as f64, &mut rng));
        }
    }

    fn push(&mut self, particle: TrailParticle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Age every particle by `dt` seconds and drop the expired or off-screen ones.
    pub fn update(&mut self, dt: f64, width: u16, height: u16) {
        let (w, h) = (width as f64, height as f64);
        self.particles.retain_mut(|p| {
            let alive = p.update(dt);
            alive && p.x >= 0.0 && p.y >= 0.0 && p.x < w && p.y < h
        });
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.last = None;
    }
}
