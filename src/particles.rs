use rand::Rng;
use std::collections::VecDeque;

use crate::model::ExperimentState;

pub(crate) const DEFAULT_CAP: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ParticleKind {
    Vapor,
    Crystal,
    Heat,
}

impl ParticleKind {
    fn max_life(self) -> u32 {
        match self {
            ParticleKind::Vapor => 120,
            ParticleKind::Crystal => 200,
            ParticleKind::Heat => 60,
        }
    }
}

/// Position is normalised to the apparatus view: x in 0..1 left to right,
/// y in 0..1 top (watch glass) to bottom (flame).
#[derive(Clone, Copy, Debug)]
pub(crate) struct Particle {
    pub(crate) kind: ParticleKind,
    pub(crate) x: f32,
    pub(crate) y: f32,
    vx: f32,
    vy: f32,
    pub(crate) life: u32,
    max_life: u32,
}

impl Particle {
    /// 1.0 when fresh, 0.0 when about to expire.
    pub(crate) fn freshness(&self) -> f32 {
        1.0 - self.life as f32 / self.max_life.max(1) as f32
    }
}

/// Purely visual. Oldest particles are dropped once the cap is reached.
pub(crate) struct ParticleField {
    items: VecDeque<Particle>,
    cap: usize,
}

impl ParticleField {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(cap.min(4096)),
            cap: cap.max(1),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.items.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn spawn<R: Rng>(&mut self, rng: &mut R, kind: ParticleKind, x: f32, y: f32) {
        let vx = (rng.gen::<f32>() - 0.5) * 0.02;
        let vy = match kind {
            ParticleKind::Vapor => -(rng.gen::<f32>() * 0.02 + 0.006),
            ParticleKind::Crystal => 0.0,
            ParticleKind::Heat => rng.gen::<f32>() * 0.012,
        };
        while self.items.len() >= self.cap {
            self.items.pop_front();
        }
        self.items.push_back(Particle {
            kind,
            x,
            y,
            vx,
            vy,
            life: 0,
            max_life: kind.max_life(),
        });
    }

    /// Emits new particles for one physics tick.
    pub(crate) fn emit_for<R: Rng>(&mut self, rng: &mut R, st: &ExperimentState) {
        if st.heating_active && st.temperature > 50.0 {
            if rng.gen_bool(0.3) {
                let x = 0.45 + rng.gen::<f32>() * 0.1;
                self.spawn(rng, ParticleKind::Heat, x, 0.85);
            }
            if st.sublimation_level > 5.0 && rng.gen_bool(0.4) {
                let x = 0.45 + rng.gen::<f32>() * 0.1;
                self.spawn(rng, ParticleKind::Vapor, x, 0.6);
            }
        }
        if st.ice_added && st.crystallization_level > 0.0 && rng.gen_bool(0.2) {
            let x = 0.35 + rng.gen::<f32>() * 0.3;
            self.spawn(rng, ParticleKind::Crystal, x, 0.2);
        }
    }

    /// Moves every particle one frame and drops the expired ones.
    pub(crate) fn animate<R: Rng>(&mut self, rng: &mut R) {
        for p in self.items.iter_mut() {
            p.x += p.vx;
            p.y += p.vy;
            p.life += 1;
            p.vx += (rng.gen::<f32>() - 0.5) * 0.001;
            p.vy += match p.kind {
                ParticleKind::Vapor => -0.0001,
                _ => 0.0001,
            };
        }
        self.items.retain(|p| p.life < p.max_life);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn cap_evicts_oldest() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut field = ParticleField::new(4);
        for i in 0..10 {
            field.spawn(&mut rng, ParticleKind::Crystal, i as f32, 0.0);
        }
        assert_eq!(field.len(), 4);
        assert_eq!(field.iter().next().map(|p| p.x), Some(6.0));
    }

    #[test]
    fn particles_expire_at_max_life() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut field = ParticleField::new(16);
        field.spawn(&mut rng, ParticleKind::Heat, 0.5, 0.5);
        field.spawn(&mut rng, ParticleKind::Vapor, 0.5, 0.5);
        for _ in 0..60 {
            field.animate(&mut rng);
        }
        let kinds: Vec<_> = field.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![ParticleKind::Vapor]);
        for _ in 0..60 {
            field.animate(&mut rng);
        }
        assert_eq!(field.len(), 0);
    }

    #[test]
    fn vapor_rises() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut field = ParticleField::new(16);
        field.spawn(&mut rng, ParticleKind::Vapor, 0.5, 0.6);
        for _ in 0..10 {
            field.animate(&mut rng);
        }
        assert!(field.iter().all(|p| p.y < 0.6));
    }

    #[test]
    fn cold_idle_apparatus_emits_nothing() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut field = ParticleField::new(16);
        let st = ExperimentState::new();
        for _ in 0..100 {
            field.emit_for(&mut rng, &st);
        }
        assert_eq!(field.len(), 0);
    }
}
