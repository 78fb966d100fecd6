//! Instanced sprite renderer
//!
//! Live particles are grouped by texture index and packed into one
//! instance buffer per texture. The host owns the GPU side: it receives each
//! non-empty batch through an [`InstanceSink`] and issues one instanced draw
//! per texture.

use crate::renderer::{FrameOverlay, Renderer};
use bytemuck::{Pod, Zeroable};
use mousei_core::{SurfaceSize, Transform, Vec3};
use mousei_particles::{Appearance, BlendMode, Particle, ParticlePool};

/// GPU instance data for one sprite.
/// 80 bytes: column-major model matrix (4 x vec4) followed by an RGBA tint.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

impl SpriteInstance {
    /// Unit quad scaled by the particle's current size and spun about z
    pub fn from_particle(p: &Particle) -> Self {
        let transform = Transform::from_position(p.position)
            .with_rotation(Vec3::new(0.0, 0.0, p.rotation.to_degrees()))
            .with_scale(Vec3::splat(p.size));
        Self {
            model: transform.to_matrix(),
            tint: [1.0, 1.0, 1.0, p.opacity],
        }
    }
}

/// Opaque identifier of a texture owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Host textures indexed by particle texture slot. Slots may be empty when
/// a texture failed to load.
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    slots: Vec<Option<TextureHandle>>,
}

impl TextureSet {
    /// `count` empty slots
    pub fn new(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    /// Every slot filled
    pub fn from_handles(handles: impl IntoIterator<Item = TextureHandle>) -> Self {
        Self {
            slots: handles.into_iter().map(Some).collect(),
        }
    }

    /// Fill `index`, growing the set if needed
    pub fn insert(&mut self, index: usize, handle: TextureHandle) {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(handle);
    }

    pub fn get(&self, index: usize) -> Option<TextureHandle> {
        self.slots.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// One texture's instances for the current frame
#[derive(Debug, Clone, Copy)]
pub struct InstanceBatch<'a> {
    pub texture_index: u16,
    pub texture: TextureHandle,
    /// Pipeline blend the host draws this batch with
    pub blend: BlendMode,
    pub instances: &'a [SpriteInstance],
}

impl InstanceBatch<'_> {
    /// Raw bytes ready for a GPU buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.instances)
    }
}

/// Receives instance batches on the host's GPU side
pub trait InstanceSink {
    /// Called at the start of every frame, before any batch
    fn begin_frame(&mut self) {}

    fn submit(&mut self, batch: InstanceBatch<'_>);

    fn resize(&mut self, _surface: SurfaceSize) {}
}

/// Groups particles into per-texture instance batches.
///
/// Buffers are reused across frames. A particle whose texture slot is
/// missing is skipped; the first miss per slot is logged.
pub struct InstancedRenderer<S: InstanceSink> {
    sink: S,
    textures: TextureSet,
    blend: BlendMode,
    batches: Vec<Vec<SpriteInstance>>,
    warned: Vec<bool>,
    surface: SurfaceSize,
}

impl<S: InstanceSink> InstancedRenderer<S> {
    /// `blend` is stamped on every submitted batch
    pub fn new(sink: S, textures: TextureSet, blend: BlendMode) -> Self {
        Self {
            sink,
            textures,
            blend,
            batches: Vec::new(),
            warned: Vec::new(),
            surface: SurfaceSize::default(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn textures(&self) -> &TextureSet {
        &self.textures
    }

    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    /// Instances packed for texture `index` during the last frame
    pub fn batch(&self, index: u16) -> &[SpriteInstance] {
        self.batches
            .get(index as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn slot_available(&mut self, index: u16) -> bool {
        let i = index as usize;
        if self.textures.get(i).is_some() {
            return true;
        }
        if i >= self.warned.len() {
            self.warned.resize(i + 1, false);
        }
        if !self.warned[i] {
            self.warned[i] = true;
            log::warn!("[sprites] texture slot {index} is missing; its particles are skipped");
        }
        false
    }
}

impl<S: InstanceSink> Renderer for InstancedRenderer<S> {
    fn resize(&mut self, surface: SurfaceSize) {
        if self.surface != surface {
            self.surface = surface;
            self.sink.resize(surface);
        }
    }

    fn render(&mut self, pool: &ParticlePool, _overlay: &FrameOverlay) {
        for batch in &mut self.batches {
            batch.clear();
        }

        for p in pool.iter_active() {
            // Solid-color particles belong to the canvas renderer
            let Appearance::Texture(index) = p.appearance else {
                continue;
            };
            if !self.slot_available(index) {
                continue;
            }
            let i = index as usize;
            if i >= self.batches.len() {
                self.batches.resize_with(i + 1, Vec::new);
            }
            self.batches[i].push(SpriteInstance::from_particle(p));
        }

        self.sink.begin_frame();
        for (i, instances) in self.batches.iter().enumerate() {
            if instances.is_empty() {
                continue;
            }
            let Some(texture) = self.textures.get(i) else {
                continue;
            };
            self.sink.submit(InstanceBatch {
                texture_index: i as u16,
                texture,
                blend: self.blend,
                instances,
            });
        }
    }
}
