use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::effects::{EffectProfile, ParticleMotion, ParticleProfile, Rgb};
use crate::render::EffectLayer;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub vx: f64,
    pub vy: f64,
    pub alpha: f64,
}

/// A simulated particle field sized to the viewport.
#[derive(Debug, Clone)]
pub struct ParticleField {
    width: f64,
    height: f64,
    motion: ParticleMotion,
    color: Rgb,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn spawn<R: Rng>(profile: &ParticleProfile, width: f64, height: f64, rng: &mut R) -> Self {
        let particles = (0..profile.count)
            .map(|_| Particle {
                x: rng.gen::<f64>() * width,
                y: rng.gen::<f64>() * height,
                size: rng.gen::<f64>() * profile.size + 1.0,
                vx: (rng.gen::<f64>() - 0.5) * profile.speed,
                vy: (rng.gen::<f64>() - 0.5) * profile.speed,
                alpha: rng.gen::<f64>() * 0.5 + 0.2,
            })
            .collect();

        Self {
            width,
            height,
            motion: profile.motion,
            color: profile.color,
            particles,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn motion(&self) -> ParticleMotion {
        self.motion
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Advance every particle by one frame.
    pub fn step<R: Rng>(&mut self, rng: &mut R) {
        let (width, height) = (self.width, self.height);

        for p in &mut self.particles {
            match self.motion {
                ParticleMotion::Fall | ParticleMotion::Drift => {
                    if self.motion == ParticleMotion::Fall {
                        p.vy = p.vy.abs();
                    }
                    p.x += p.vx;
                    p.y += p.vy.abs();

                    if p.y > height {
                        p.y = 0.0;
                        p.x = rng.gen::<f64>() * width;
                    }
                }
                ParticleMotion::Bounce => {
                    p.x += p.vx;
                    p.y += p.vy;

                    if p.x > width || p.x < 0.0 {
                        p.vx = -p.vx;
                    }
                    if p.y > height || p.y < 0.0 {
                        p.vy = -p.vy;
                    }
                }
            }
        }
    }
}

/// Background layer holding at most one active effect.
#[derive(Debug)]
pub struct ParticleLayer {
    width: f64,
    height: f64,
    rng: StdRng,
    active: Option<ActiveEffect>,
    installs: u64,
}

#[derive(Debug, Clone)]
pub struct ActiveEffect {
    pub profile: EffectProfile,
    pub field: ParticleField,
}

impl ParticleLayer {
    pub fn new(width: f64, height: f64, rng: StdRng) -> Self {
        Self {
            width,
            height,
            rng,
            active: None,
            installs: 0,
        }
    }

    pub fn seeded(width: f64, height: f64, seed: u64) -> Self {
        Self::new(width, height, StdRng::seed_from_u64(seed))
    }

    pub fn active(&self) -> Option<&ActiveEffect> {
        self.active.as_ref()
    }

    pub fn background_class(&self) -> Option<&'static str> {
        self.active.as_ref().map(|a| a.profile.background.class())
    }

    /// Number of effects installed over the layer's lifetime.
    pub fn installs(&self) -> u64 {
        self.installs
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        if let Some(active) = self.active.as_mut() {
            active.field.resize(width, height);
        }
    }

    pub fn frame(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.field.step(&mut self.rng);
        }
    }
}

impl EffectLayer for ParticleLayer {
    fn clear(&mut self) {
        if let Some(previous) = self.active.take() {
            tracing::debug!(
                "Discarding {} effect",
                previous.profile.background.class()
            );
        }
    }

    fn install(&mut self, profile: &EffectProfile) {
        // A second install without clear still replaces, never stacks.
        let field = ParticleField::spawn(&profile.particles, self.width, self.height, &mut self.rng);
        self.active = Some(ActiveEffect {
            profile: *profile,
            field,
        });
        self.installs += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::effects::select_effect;

    #[test]
    fn test_spawn_respects_profile() {
        let profile = select_effect(Condition::Rainy).particles;
        let mut rng = StdRng::seed_from_u64(7);
        let field = ParticleField::spawn(&profile, 800.0, 600.0, &mut rng);

        assert_eq!(field.particles().len(), 200);
        for p in field.particles() {
            assert!(p.vx.abs() <= profile.speed);
            assert!(p.vy.abs() <= profile.speed);
            assert!((0.0..=800.0).contains(&p.x));
            assert!((0.0..=600.0).contains(&p.y));
            assert!(p.size >= 1.0 && p.size <= profile.size + 1.0);
        }
    }

    #[test]
    fn test_rain_always_falls() {
        let profile = select_effect(Condition::Stormy).particles;
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = ParticleField::spawn(&profile, 400.0, 10_000.0, &mut rng);
        let before: Vec<f64> = field.particles().iter().map(|p| p.y).collect();

        field.step(&mut rng);

        for (p, y0) in field.particles().iter().zip(before) {
            assert!(p.vy >= 0.0);
            assert!(p.y >= y0 || p.y == 0.0);
        }
    }

    #[test]
    fn test_fallen_particles_wrap_to_top() {
        let profile = ParticleProfile {
            count: 1,
            color: Rgb::new(255, 255, 255),
            speed: 2.0,
            size: 4.0,
            motion: ParticleMotion::Drift,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::spawn(&profile, 100.0, 100.0, &mut rng);
        field.particles[0].y = 100.0;
        field.particles[0].vy = 1.5;

        field.step(&mut rng);

        assert_eq!(field.particles()[0].y, 0.0);
    }

    #[test]
    fn test_bounce_reverses_at_edges() {
        let profile = select_effect(Condition::Sunny).particles;
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::spawn(&profile, 100.0, 100.0, &mut rng);
        field.particles.truncate(1);
        field.particles[0].x = 100.0;
        field.particles[0].vx = 0.2;

        field.step(&mut rng);

        assert!(field.particles()[0].vx < 0.0);
    }

    #[test]
    fn test_layer_keeps_single_active_effect() {
        let mut layer = ParticleLayer::seeded(320.0, 240.0, 11);
        assert!(layer.active().is_none());

        layer.install(&select_effect(Condition::Snowy));
        layer.clear();
        layer.install(&select_effect(Condition::Sunny));

        let active = layer.active().expect("effect installed");
        assert_eq!(active.field.particles().len(), 50);
        assert_eq!(layer.background_class(), Some("weather-bg-sunny"));
        assert_eq!(layer.installs(), 2);

        layer.clear();
        assert!(layer.active().is_none());
    }
}
