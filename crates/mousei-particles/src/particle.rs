//! Particle records and the fixed-capacity pool that owns them

use mousei_core::{Color, MouseiError, ParticleHandle, Result, Vec2, Vec3};

/// What a particle looks like, fixed at spawn
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Appearance {
    /// Filled shape in a solid color (canvas petals)
    Color(Color),
    /// Index into the host's texture set (instanced sprites)
    Texture(u16),
}

/// Per-particle lifecycle: `Spawned → Active → Dead`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Allocated this tick, not simulated yet
    Spawned,
    /// Simulated at least once and still visible
    Active,
    /// Terminal; the slot is reclaimed by the next cull
    Dead,
}

/// CPU-side particle state
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Linear drift per frame
    pub velocity: Vec2,
    /// Scalar speed for spiral motion
    pub speed: f32,
    /// Heading for spiral motion, radians
    pub angle: f32,
    /// Draw rotation, radians
    pub rotation: f32,
    pub size: f32,
    pub base_size: f32,
    /// Base alpha, multiplied by `life` when drawn
    pub opacity: f32,
    /// Remaining life in [0, 1]
    pub life: f32,
    /// Life lost per step (spiral motion)
    pub decay: f32,
    pub age: f32,
    pub max_age: f32,
    pub appearance: Appearance,
    pub lifecycle: Lifecycle,
}

impl Particle {
    pub fn dead() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec2::ZERO,
            speed: 0.0,
            angle: 0.0,
            rotation: 0.0,
            size: 0.0,
            base_size: 0.0,
            opacity: 0.0,
            life: 0.0,
            decay: 0.0,
            age: 0.0,
            max_age: 0.0,
            appearance: Appearance::Color(Color::WHITE),
            lifecycle: Lifecycle::Dead,
        }
    }

    /// A freshly spawned particle at full life; callers fill in the rest
    pub fn spawned() -> Self {
        Self {
            life: 1.0,
            lifecycle: Lifecycle::Spawned,
            ..Self::dead()
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle != Lifecycle::Dead
    }

    /// Alpha to draw with: remaining life scaled by the base opacity
    pub fn alpha(&self) -> f32 {
        (self.life * self.opacity).clamp(0.0, 1.0)
    }
}

struct Slot {
    particle: Particle,
    generation: u32,
    /// Allocation order, used for oldest-first eviction
    spawn_seq: u64,
    /// False while the slot sits on the free list
    occupied: bool,
}

impl Slot {
    fn is_live(&self) -> bool {
        self.occupied && self.particle.is_alive()
    }
}

/// Counts reported by [`ParticlePool::cull`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CullReport {
    /// Dead particles whose slots were reclaimed
    pub expired: usize,
    /// Live particles evicted by allocations since the previous cull
    pub evicted: usize,
}

/// Fixed-capacity arena of particle slots with a free list.
///
/// Allocation always succeeds: it reuses a free or dead slot, appends while
/// below capacity, and otherwise evicts the oldest live particle in place.
pub struct ParticlePool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    capacity: usize,
    next_seq: u64,
    evicted: usize,
}

impl ParticlePool {
    /// Fails when `capacity` is zero; a pool must hold at least one particle
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MouseiError::not_positive("max_particles", 0.0));
        }
        Ok(Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            capacity,
            next_seq: 0,
            evicted: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live (spawned or active) particles
    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_live()).count()
    }

    /// Allocate one particle, returning its handle and a fresh record to initialize
    pub fn allocate(&mut self) -> (ParticleHandle, &mut Particle) {
        let index = self.claim_slot();
        let seq = self.next_seq;
        self.next_seq += 1;

        let slot = &mut self.slots[index];
        slot.particle = Particle::spawned();
        slot.spawn_seq = seq;
        slot.occupied = true;
        let handle = ParticleHandle::from_raw(index as u32, slot.generation);
        (handle, &mut slot.particle)
    }

    fn claim_slot(&mut self) -> usize {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            return index as usize;
        }

        if self.slots.len() < self.capacity {
            self.slots.push(Slot {
                particle: Particle::dead(),
                generation: 0,
                spawn_seq: 0,
                occupied: false,
            });
            return self.slots.len() - 1;
        }

        // Full: prefer a dead slot that has not been culled yet
        let index = match self.slots.iter().position(|s| !s.particle.is_alive()) {
            Some(index) => index,
            None => {
                // Every slot is live here and capacity is nonzero
                let index = self.oldest_live().unwrap_or_default();
                self.evicted += 1;
                log::debug!("[pool] evicted oldest particle in slot {index}");
                index
            }
        };
        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        index
    }

    fn oldest_live(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_live())
            .min_by_key(|(_, s)| s.spawn_seq)
            .map(|(i, _)| i)
    }

    /// Reclaim dead slots and report evictions since the previous cull.
    ///
    /// Slots never outnumber the capacity, so after a cull the live count is
    /// at most `capacity()`.
    pub fn cull(&mut self) -> CullReport {
        let mut report = CullReport {
            expired: 0,
            evicted: std::mem::take(&mut self.evicted),
        };

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.occupied && !slot.particle.is_alive() {
                slot.occupied = false;
                self.free.push(index as u32);
                report.expired += 1;
            }
        }

        report
    }

    /// Look up a particle; stale handles to reused slots return `None`
    pub fn get(&self, handle: ParticleHandle) -> Option<&Particle> {
        self.slots
            .get(handle.index())
            .filter(|s| s.occupied && s.generation == handle.generation())
            .map(|s| &s.particle)
    }

    pub fn get_mut(&mut self, handle: ParticleHandle) -> Option<&mut Particle> {
        self.slots
            .get_mut(handle.index())
            .filter(|s| s.occupied && s.generation == handle.generation())
            .map(|s| &mut s.particle)
    }

    /// Iterate live particles in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter(|s| s.is_live()).map(|s| &s.particle)
    }

    /// Iterate live particles mutably in slot order
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.slots
            .iter_mut()
            .filter(|s| s.is_live())
            .map(|s| &mut s.particle)
    }

    /// Iterate live particles together with their handles
    pub fn iter_handles(&self) -> impl Iterator<Item = (ParticleHandle, &Particle)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_live())
            .map(|(i, s)| (ParticleHandle::from_raw(i as u32, s.generation), &s.particle))
    }

    pub fn for_each_active(&mut self, mut f: impl FnMut(&mut Particle)) {
        for p in self.iter_active_mut() {
            f(p);
        }
    }

    /// Drop every particle, keeping the allocated storage
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            slot.particle.lifecycle = Lifecycle::Dead;
            if slot.occupied {
                slot.occupied = false;
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        self.evicted = 0;
    }
}
