//! Fixed-size recycling pools of roadside entities
//!
//! Each pool is a ring over a fixed arena of slots. Logical index 0 is the
//! entity nearest the camera and positions ascend from there. When the head
//! falls behind the camera its slot is reused for a new entity placed past
//! the current tail, and the head index advances. Nothing is allocated after
//! construction.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Entity kinds that live on the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Tree,
    Car,
}

/// A billboard on the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    /// Longitudinal position
    pub position: f64,
    /// Lateral offset relative to the road centre
    pub lateral_offset: f64,
}

/// How new entities are placed sideways
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateralPlacement {
    /// Random whole-unit offset in `min..=max`, on a random side of the road
    Scatter { min: u32, max: u32 },
    /// Fixed lane offset
    Lane(f64),
}

/// Placement and motion rules for one pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    pub kind: EntityKind,
    /// Number of slots
    pub count: usize,
    /// Minimum whole-unit gap to the previous entity
    pub gap_min: u32,
    /// Maximum whole-unit gap to the previous entity
    pub gap_max: u32,
    /// Constant added to every gap
    pub gap_bias: f64,
    pub lateral: LateralPlacement,
    /// Speed toward the camera in world units per second
    pub drift_speed: f64,
    /// Sprite size at distance 1
    pub base_size: DVec2,
}

impl SpawnRule {
    pub fn trees() -> Self {
        Self {
            kind: EntityKind::Tree,
            count: 7,
            gap_min: 10,
            gap_max: 20,
            gap_bias: 0.5,
            lateral: LateralPlacement::Scatter {
                min: 500,
                max: 1500,
            },
            drift_speed: 0.0,
            base_size: DVec2::new(200.0, 300.0),
        }
    }

    pub fn cars() -> Self {
        Self {
            kind: EntityKind::Car,
            count: 3,
            gap_min: 90,
            gap_max: 110,
            gap_bias: 0.0,
            lateral: LateralPlacement::Lane(-70.0),
            drift_speed: 10.0,
            base_size: DVec2::new(100.0, 80.0),
        }
    }

    /// Smallest gap this rule can produce
    pub fn min_gap(&self) -> f64 {
        self.gap_min as f64 + self.gap_bias
    }

    /// Check the rule keeps pools non-empty and strictly ordered
    pub fn validate(&self) -> Result<(), String> {
        if self.count == 0 {
            return Err(format!("{:?} pool must have at least one slot", self.kind));
        }
        if self.gap_min > self.gap_max {
            return Err(format!(
                "{:?} gap range {}..={} is empty",
                self.kind, self.gap_min, self.gap_max
            ));
        }
        if !(self.min_gap() > 0.0) {
            return Err(format!("{:?} gaps must be strictly positive", self.kind));
        }
        if let LateralPlacement::Scatter { min, max } = self.lateral {
            if min > max {
                return Err(format!("{:?} lateral range {min}..={max} is empty", self.kind));
            }
        }
        if !self.drift_speed.is_finite() || self.base_size.x < 0.0 || self.base_size.y < 0.0 {
            return Err(format!("{:?} motion or size is invalid", self.kind));
        }
        Ok(())
    }

    fn spawn<R: Rng + ?Sized>(&self, anchor: f64, rng: &mut R) -> Entity {
        // Unvalidated rules may carry inverted ranges
        let (lo, hi) = (self.gap_min.min(self.gap_max), self.gap_min.max(self.gap_max));
        let gap = rng.random_range(lo..=hi) as f64 + self.gap_bias;
        let lateral_offset = match self.lateral {
            LateralPlacement::Scatter { min, max } => {
                let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                rng.random_range(min.min(max)..=min.max(max)) as f64 * side
            }
            LateralPlacement::Lane(offset) => offset,
        };
        Entity {
            kind: self.kind,
            position: anchor + gap,
            lateral_offset,
        }
    }
}

/// Fixed-capacity ring of entities ascending by position
#[derive(Debug, Clone)]
pub struct EntityPool {
    rule: SpawnRule,
    slots: Box<[Entity]>,
    head: usize,
}

impl EntityPool {
    /// Fill the pool with a chain of entities ahead of `start`
    pub fn new<R: Rng + ?Sized>(rule: SpawnRule, start: f64, rng: &mut R) -> Self {
        let mut slots = Vec::with_capacity(rule.count);
        let mut anchor = start;
        for _ in 0..rule.count {
            let entity = rule.spawn(anchor, rng);
            anchor = entity.position;
            slots.push(entity);
        }
        Self {
            rule,
            slots: slots.into_boxed_slice(),
            head: 0,
        }
    }

    pub fn rule(&self) -> &SpawnRule {
        &self.rule
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Entity at logical `index` (0 = nearest)
    pub fn get(&self, index: usize) -> Option<&Entity> {
        if index >= self.slots.len() {
            return None;
        }
        Some(&self.slots[(self.head + index) % self.slots.len()])
    }

    pub fn front(&self) -> Option<&Entity> {
        self.get(0)
    }

    pub fn back(&self) -> Option<&Entity> {
        self.slots.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Entities nearest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Entity> {
        let (wrapped, leading) = self.slots.split_at(self.head);
        leading.iter().chain(wrapped.iter())
    }

    /// Move every entity toward the camera by its drift speed
    pub fn drift(&mut self, dt: f64) {
        let shift = self.rule.drift_speed * dt;
        if shift != 0.0 {
            for entity in self.slots.iter_mut() {
                entity.position -= shift;
            }
        }
    }

    /// Replace entities that fell behind `camera_x + margin` with new ones past
    /// the tail. Returns how many slots were reused.
    pub fn recycle<R: Rng + ?Sized>(&mut self, camera_x: f64, margin: f64, rng: &mut R) -> usize {
        let len = self.slots.len();
        let mut recycled = 0;
        // Each slot is reused at most once per call
        while recycled < len {
            let head = self.head;
            if self.slots[head].position >= camera_x + margin {
                break;
            }
            let tail = self.slots[(head + len - 1) % len].position;
            self.slots[head] = self.rule.spawn(tail.max(camera_x), rng);
            self.head = (head + 1) % len;
            recycled += 1;
        }
        recycled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn positions(pool: &EntityPool) -> Vec<f64> {
        pool.iter().map(|e| e.position).collect()
    }

    fn strictly_ascending(values: &[f64]) -> bool {
        values.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn test_new_pool_is_ordered_and_ahead() {
        let mut rng = Pcg32::seed_from_u64(7);
        let pool = EntityPool::new(SpawnRule::trees(), 0.0, &mut rng);
        assert_eq!(pool.len(), 7);
        let pos = positions(&pool);
        assert!(strictly_ascending(&pos));
        assert!(pos[0] >= 10.5 && pos[0] <= 20.5);
        for e in pool.iter() {
            assert_eq!(e.kind, EntityKind::Tree);
            let side = e.lateral_offset.abs();
            assert!((500.0..=1500.0).contains(&side));
        }
    }

    #[test]
    fn test_cars_use_fixed_lane() {
        let mut rng = Pcg32::seed_from_u64(7);
        let pool = EntityPool::new(SpawnRule::cars(), 0.0, &mut rng);
        assert!(pool.iter().all(|e| e.lateral_offset == -70.0));
    }

    #[test]
    fn test_recycle_moves_head_to_tail() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut pool = EntityPool::new(SpawnRule::trees(), 0.0, &mut rng);
        let front = pool.front().copied().expect("pool not empty");
        let second = pool.get(1).copied().expect("pool has two");
        let tail = pool.back().copied().expect("pool not empty");

        assert_eq!(pool.recycle(front.position - 5.0, 1.0, &mut rng), 0);
        assert_eq!(pool.recycle(front.position, 1.0, &mut rng), 1);

        assert_eq!(pool.len(), 7);
        assert_eq!(pool.front().map(|e| e.position), Some(second.position));
        let new_tail = pool.back().copied().expect("pool not empty");
        assert!(new_tail.position >= tail.position + 10.5);
        assert!(new_tail.position <= tail.position + 20.5);
    }

    #[test]
    fn test_recycle_after_teleport_reuses_every_slot_once() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut pool = EntityPool::new(SpawnRule::cars(), 0.0, &mut rng);
        let recycled = pool.recycle(10_000.0, 1.0, &mut rng);
        assert_eq!(recycled, 3);
        let pos = positions(&pool);
        assert!(strictly_ascending(&pos));
        assert!(pos.iter().all(|&p| p > 10_000.0));
    }

    #[test]
    fn test_drift_shifts_uniformly() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut pool = EntityPool::new(SpawnRule::cars(), 0.0, &mut rng);
        let before = positions(&pool);
        pool.drift(0.5);
        let after = positions(&pool);
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((b - a - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_validate_rejects_bad_rules() {
        assert!(SpawnRule::trees().validate().is_ok());
        assert!(SpawnRule::cars().validate().is_ok());
        let empty = SpawnRule {
            count: 0,
            ..SpawnRule::trees()
        };
        assert!(empty.validate().is_err());
        let zero_gap = SpawnRule {
            gap_min: 0,
            gap_max: 0,
            gap_bias: 0.0,
            ..SpawnRule::cars()
        };
        assert!(zero_gap.validate().is_err());
        let inverted = SpawnRule {
            gap_min: 30,
            gap_max: 20,
            ..SpawnRule::trees()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_inverted_gap_range_does_not_panic() {
        let mut rng = Pcg32::seed_from_u64(9);
        let rule = SpawnRule {
            gap_min: 30,
            gap_max: 20,
            lateral: LateralPlacement::Scatter { min: 900, max: 600 },
            ..SpawnRule::trees()
        };
        let pool = EntityPool::new(rule, 0.0, &mut rng);
        let pos = positions(&pool);
        assert_eq!(pos.len(), 7);
        assert!(strictly_ascending(&pos));
        assert!(pos[0] >= 20.5 && pos[0] <= 30.5);
        assert!(pool.iter().all(|e| (600.0..=900.0).contains(&e.lateral_offset.abs())));
    }

    proptest! {
        #[test]
        fn prop_recycling_keeps_cardinality_and_order(
            seed in any::<u64>(),
            steps in proptest::collection::vec((0.0f64..40.0, 0.0f64..0.1), 1..200),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut trees = EntityPool::new(SpawnRule::trees(), 0.0, &mut rng);
            let mut cars = EntityPool::new(SpawnRule::cars(), 0.0, &mut rng);
            let mut camera_x = 0.0;
            for (advance, dt) in steps {
                camera_x += advance;
                cars.drift(dt);
                trees.recycle(camera_x, 1.0, &mut rng);
                cars.recycle(camera_x, 1.0, &mut rng);
                prop_assert_eq!(trees.len(), 7);
                prop_assert_eq!(cars.len(), 3);
                prop_assert!(strictly_ascending(&positions(&trees)));
                prop_assert!(strictly_ascending(&positions(&cars)));
                prop_assert!(trees.front().is_some_and(|e| e.position >= camera_x + 1.0));
            }
        }
    }
}
