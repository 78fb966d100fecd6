//! Spawn policy: pointer displacement → number and placement of new particles

use mousei_core::Vec2;

/// How pointer movement turns into particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnStrategy {
    /// `max(1, floor(distance / divisor))` particles spread along the latest
    /// segment. A move event with zero distance still emits one particle.
    Interpolated {
        /// Pointer distance per extra particle; larger is sparser
        divisor: f32,
    },
    /// Emit a fixed batch at the current position once the pointer has moved
    /// more than `min_threshold` away from where the last batch spawned.
    Gated { min_threshold: f32, batch_size: u32 },
}

impl SpawnStrategy {
    /// Number of particles for a displacement of `distance`, ignoring caps
    pub fn spawn_count(&self, distance: f32) -> u32 {
        match *self {
            SpawnStrategy::Interpolated { divisor } => {
                let steps = (distance / divisor).floor();
                if steps.is_finite() {
                    (steps as u32).max(1)
                } else {
                    1
                }
            }
            SpawnStrategy::Gated {
                min_threshold,
                batch_size,
            } => {
                if distance > min_threshold {
                    batch_size
                } else {
                    0
                }
            }
        }
    }
}

/// Positions to spawn at this tick, yielded lazily
#[derive(Debug, Clone)]
pub struct SpawnPlan {
    from: Vec2,
    to: Vec2,
    count: u32,
    emitted: u32,
    interpolate: bool,
}

impl SpawnPlan {
    pub fn empty() -> Self {
        Self {
            from: Vec2::ZERO,
            to: Vec2::ZERO,
            count: 0,
            emitted: 0,
            interpolate: false,
        }
    }

    /// Total positions planned this tick, independent of iteration progress
    pub fn planned(&self) -> u32 {
        self.count
    }
}

impl Iterator for SpawnPlan {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.emitted >= self.count {
            return None;
        }
        let i = self.emitted;
        self.emitted += 1;
        if self.interpolate {
            let t = i as f32 / self.count as f32;
            Some(self.from.lerp(self.to, t))
        } else {
            Some(self.to)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.count - self.emitted) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for SpawnPlan {}

/// Stateful spawn policy; the gated strategy remembers its last spawn anchor
#[derive(Debug, Clone)]
pub struct SpawnPolicy {
    strategy: SpawnStrategy,
    anchor: Vec2,
    max_per_plan: u32,
}

impl SpawnPolicy {
    /// `origin` is where the pointer rests before the first move
    pub fn new(strategy: SpawnStrategy, origin: Vec2, max_per_plan: u32) -> Self {
        Self {
            strategy,
            anchor: origin,
            max_per_plan,
        }
    }

    pub fn strategy(&self) -> SpawnStrategy {
        self.strategy
    }

    /// Plan the spawns for the latest pointer segment `from → to`
    pub fn plan(&mut self, from: Vec2, to: Vec2) -> SpawnPlan {
        let (distance, interpolate) = match self.strategy {
            SpawnStrategy::Interpolated { .. } => (from.distance(to), true),
            SpawnStrategy::Gated { .. } => (self.anchor.distance(to), false),
        };

        let count = self.strategy.spawn_count(distance).min(self.max_per_plan);
        if count == 0 {
            return SpawnPlan::empty();
        }
        if let SpawnStrategy::Gated { .. } = self.strategy {
            self.anchor = to;
        }

        SpawnPlan {
            from,
            to,
            count,
            emitted: 0,
            interpolate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERPOLATED: SpawnStrategy = SpawnStrategy::Interpolated { divisor: 1000.0 };
    const GATED: SpawnStrategy = SpawnStrategy::Gated {
        min_threshold: 0.002,
        batch_size: 2,
    };

    #[test]
    fn zero_distance_interpolated_emits_one() {
        assert_eq!(INTERPOLATED.spawn_count(0.0), 1);
    }

    #[test]
    fn zero_distance_gated_emits_none() {
        let strategy = SpawnStrategy::Gated {
            min_threshold: 0.0,
            batch_size: 2,
        };
        assert_eq!(strategy.spawn_count(0.0), 0);
        assert_eq!(GATED.spawn_count(0.0), 0);
    }

    #[test]
    fn interpolated_count_floors() {
        assert_eq!(INTERPOLATED.spawn_count(999.0), 1);
        assert_eq!(INTERPOLATED.spawn_count(2000.0), 2);
        assert_eq!(INTERPOLATED.spawn_count(3999.0), 3);
    }

    #[test]
    fn long_jump_spawns_along_segment() {
        let mut policy = SpawnPolicy::new(INTERPOLATED, Vec2::ZERO, 150);
        let points: Vec<Vec2> = policy
            .plan(Vec2::new(0.0, 0.0), Vec2::new(2000.0, 0.0))
            .collect();
        assert_eq!(points, vec![Vec2::new(0.0, 0.0), Vec2::new(1000.0, 0.0)]);
    }

    #[test]
    fn plan_is_capped() {
        let mut policy = SpawnPolicy::new(INTERPOLATED, Vec2::ZERO, 5);
        let plan = policy.plan(Vec2::ZERO, Vec2::new(1.0e9, 0.0));
        assert_eq!(plan.planned(), 5);
        assert_eq!(plan.planned(), plan.len() as u32);
    }

    #[test]
    fn planned_total_survives_partial_iteration() {
        let mut policy = SpawnPolicy::new(INTERPOLATED, Vec2::ZERO, 150);
        let mut plan = policy.plan(Vec2::ZERO, Vec2::new(3500.0, 0.0));
        assert_eq!(plan.planned(), 3);
        assert_eq!(plan.next(), Some(Vec2::ZERO));
        assert_eq!(plan.planned(), 3);
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn gated_measures_from_last_spawn_anchor() {
        let mut policy = SpawnPolicy::new(GATED, Vec2::ZERO, 300);

        // Small steps accumulate until the anchor is far enough behind
        assert_eq!(policy.plan(Vec2::ZERO, Vec2::new(0.001, 0.0)).planned(), 0);
        let plan = policy.plan(Vec2::new(0.001, 0.0), Vec2::new(0.003, 0.0));
        assert_eq!(plan.planned(), 2);
        let points: Vec<Vec2> = plan.collect();
        assert!(points.iter().all(|p| *p == Vec2::new(0.003, 0.0)));

        // Anchor moved to the spawn point
        assert_eq!(policy.plan(Vec2::new(0.003, 0.0), Vec2::new(0.004, 0.0)).planned(), 0);
    }
}
