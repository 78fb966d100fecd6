//! The trail engine

use mousei_core::{Result, SurfaceSize};
use mousei_particles::{ParticlePool, RandomSource, TrailConfig, TrailEmitter};
use mousei_render::{
    CanvasRenderer, CanvasStyle, FrameOverlay, InstanceSink, InstancedRenderer, RasterCanvas,
    Renderer, TextureSet, Viewport,
};
use mousei_runtime::{HostEvent, PointerTracker, RuntimeSystem};

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Particles spawned for the latest pointer movement
    pub spawned: usize,
    /// Dead particles reclaimed by the cull
    pub expired: usize,
    /// Live particles evicted to make room for new ones
    pub evicted: usize,
    /// Live particles after the cull
    pub alive: usize,
}

/// One trail effect: pointer tracking, spawning, simulation and drawing.
pub struct TrailEngine<R: Renderer, G: RandomSource> {
    tracker: PointerTracker,
    emitter: TrailEmitter<G>,
    viewport: Viewport,
    renderer: R,
    frames: u64,
    running: bool,
}

impl<R: Renderer, G: RandomSource> TrailEngine<R, G> {
    /// Validate `config` and build an engine drawing onto a surface of `surface` pixels
    pub fn new(config: TrailConfig, rng: G, mut renderer: R, surface: SurfaceSize) -> Result<Self> {
        let tracker = PointerTracker::new(config.coordinate_space, surface);
        let viewport = Viewport::new(surface, config.camera);
        let emitter = TrailEmitter::new(config, rng, tracker.current())?;
        renderer.resize(surface);
        Ok(Self {
            tracker,
            emitter,
            viewport,
            renderer,
            frames: 0,
            running: true,
        })
    }

    pub fn config(&self) -> &TrailConfig {
        self.emitter.config()
    }

    pub fn pool(&self) -> &ParticlePool {
        self.emitter.pool()
    }

    pub fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Ticks run so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Apply one host event. Pointer moves only update the tracker; spawning
    /// waits for the next tick.
    pub fn handle_event(&mut self, event: &HostEvent) {
        match *event {
            HostEvent::PointerMoved { x, y } => {
                self.tracker.on_pointer_move(x, y);
            }
            HostEvent::PointerLeft => self.tracker.on_pointer_leave(),
            HostEvent::Resized(surface) => self.resize(surface),
            HostEvent::Teardown => self.shutdown(),
        }
    }

    /// Record new surface dimensions; live particles are kept
    pub fn resize(&mut self, surface: SurfaceSize) {
        self.tracker.resize(surface);
        self.viewport.resize(surface);
        self.renderer.resize(surface);
    }

    /// Run one frame: spawn → simulate → render → cull
    pub fn tick(&mut self, dt: f32) -> TickReport {
        if !self.running {
            return TickReport::default();
        }

        let viewport = self.viewport;
        let spawned = match self.tracker.take_motion() {
            Some(motion) => self
                .emitter
                .emit(motion.from, motion.to, |p| viewport.project(p)),
            None => 0,
        };

        self.emitter.advance(dt);

        let overlay = FrameOverlay {
            pointer: viewport.project(self.tracker.current()),
            hovering: self.tracker.is_hovering(),
        };
        self.renderer.render(self.emitter.pool(), &overlay);

        let culled = self.emitter.cull();
        self.frames += 1;

        TickReport {
            spawned,
            expired: culled.expired,
            evicted: culled.evicted,
            alive: self.emitter.pool().alive_count(),
        }
    }

    /// Drop every particle and stop ticking. Runs once; later calls do nothing.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.emitter.clear();
        log::info!("[trail] shut down after {} frames", self.frames);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Engine drawing onto a software canvas filled with the configured background
pub fn canvas_engine<G: RandomSource>(
    config: TrailConfig,
    rng: G,
    surface: SurfaceSize,
) -> Result<TrailEngine<CanvasRenderer<RasterCanvas>, G>> {
    let canvas = RasterCanvas::new(surface, config.background);
    let renderer = CanvasRenderer::new(canvas, CanvasStyle::from_config(&config));
    TrailEngine::new(config, rng, renderer, surface)
}

/// Engine handing per-texture sprite batches to a host `sink`, blended as configured
pub fn instanced_engine<S: InstanceSink, G: RandomSource>(
    config: TrailConfig,
    rng: G,
    sink: S,
    textures: TextureSet,
    surface: SurfaceSize,
) -> Result<TrailEngine<InstancedRenderer<S>, G>> {
    let renderer = InstancedRenderer::new(sink, textures, config.blend);
    TrailEngine::new(config, rng, renderer, surface)
}

impl<R: Renderer, G: RandomSource> RuntimeSystem for TrailEngine<R, G> {
    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "[trail] started: up to {} particles on {}x{}",
            self.config().max_particles,
            self.viewport.surface().width,
            self.viewport.surface().height
        );
        Ok(())
    }

    fn handle_event(&mut self, event: &HostEvent) {
        TrailEngine::handle_event(self, event);
    }

    fn update(&mut self, dt: f64) -> Result<()> {
        self.tick(dt as f32);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        TrailEngine::shutdown(self);
        Ok(())
    }

    fn name(&self) -> &str {
        "trail"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mousei_core::{Color, Vec2};
    use mousei_particles::{BlendMode, ParticleRng, SpawnStrategy};
    use mousei_render::{Canvas2d, InstanceBatch, TextureHandle};
    use mousei_runtime::{FrameLoop, FrameRequest};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const SURFACE: SurfaceSize = SurfaceSize::new(800, 600);

    /// Counts frames and remembers what it was asked to draw
    #[derive(Clone, Default)]
    struct Tally {
        frames: Rc<Cell<usize>>,
        drawn: Rc<Cell<usize>>,
        resizes: Rc<RefCell<Vec<SurfaceSize>>>,
    }

    impl Renderer for Tally {
        fn resize(&mut self, surface: SurfaceSize) {
            self.resizes.borrow_mut().push(surface);
        }

        fn render(&mut self, pool: &ParticlePool, _: &FrameOverlay) {
            self.frames.set(self.frames.get() + 1);
            self.drawn.set(pool.alive_count());
        }
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn petal_engine(seed: u32) -> TrailEngine<Tally, ParticleRng> {
        init_logger();
        TrailEngine::new(
            TrailConfig::petal(),
            ParticleRng::new(seed),
            Tally::default(),
            SURFACE,
        )
        .unwrap()
    }

    fn moved(x: f32, y: f32) -> HostEvent {
        HostEvent::PointerMoved { x, y }
    }

    #[test]
    fn long_jump_spawns_two() {
        let mut engine = petal_engine(1);
        engine.handle_event(&moved(0.0, 0.0));
        engine.tick(0.016);

        engine.handle_event(&moved(2000.0, 0.0));
        let report = engine.tick(0.016);
        assert_eq!(report.spawned, 2);
        assert_eq!(report.alive, 3);
    }

    #[test]
    fn no_movement_no_spawn() {
        let mut engine = petal_engine(1);
        assert_eq!(engine.tick(0.016).spawned, 0);

        // A zero-length move still drips one petal
        engine.handle_event(&moved(400.0, 300.0));
        assert_eq!(engine.tick(0.016).spawned, 1);
    }

    #[test]
    fn only_latest_segment_counts() {
        let mut engine = petal_engine(1);
        engine.handle_event(&moved(0.0, 0.0));
        engine.tick(0.016);

        engine.handle_event(&moved(5000.0, 0.0));
        engine.handle_event(&moved(5000.0, 10.0));
        // Earlier sub-movement is discarded: 10px → one particle
        assert_eq!(engine.tick(0.016).spawned, 1);
    }

    #[test]
    fn rejected_input_leaves_state() {
        let mut engine = petal_engine(1);
        engine.handle_event(&moved(f32::NAN, 10.0));
        assert_eq!(engine.tracker().current(), SURFACE.center());
        assert!(!engine.tracker().is_hovering());
        assert_eq!(engine.tick(0.016).spawned, 0);
    }

    #[test]
    fn seeded_runs_are_identical() {
        let run = || {
            let mut engine = petal_engine(2024);
            let mut reports = Vec::new();
            for i in 0..120 {
                let t = i as f32 * 0.1;
                engine.handle_event(&moved(400.0 + t.cos() * 300.0, 300.0 + t.sin() * 200.0));
                reports.push(engine.tick(0.016));
            }
            let particles: Vec<_> = engine.pool().iter_active().cloned().collect();
            (reports, particles)
        };
        let (reports_a, particles_a) = run();
        let (reports_b, particles_b) = run();
        assert_eq!(reports_a, reports_b);
        assert_eq!(particles_a, particles_b);
        assert!(!particles_a.is_empty());
    }

    #[test]
    fn capacity_holds_under_fast_movement() {
        let config = TrailConfig {
            spawn: SpawnStrategy::Interpolated { divisor: 10.0 },
            ..TrailConfig::petal()
        };
        let mut engine = TrailEngine::new(config, ParticleRng::new(4), Tally::default(), SURFACE)
            .unwrap();
        let mut evicted = 0;
        for i in 0..50 {
            let x = if i % 2 == 0 { 0.0 } else { 800.0 };
            engine.handle_event(&moved(x, 300.0));
            let report = engine.tick(0.016);
            assert!(report.alive <= 150);
            assert!(engine.renderer().drawn.get() <= 150);
            evicted += report.evicted;
        }
        assert!(evicted > 0);
    }

    #[test]
    fn resize_keeps_particles() {
        let mut engine = petal_engine(9);
        engine.handle_event(&moved(100.0, 100.0));
        engine.tick(0.016);
        let before: Vec<_> = engine.pool().iter_active().cloned().collect();

        let bigger = SurfaceSize::new(1024, 768);
        engine.handle_event(&HostEvent::Resized(bigger));
        engine.handle_event(&HostEvent::Resized(bigger));

        let after: Vec<_> = engine.pool().iter_active().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(engine.tracker().current(), Vec2::new(100.0, 100.0));
        assert_eq!(engine.viewport().surface(), bigger);
        assert_eq!(engine.tracker().surface(), bigger);
    }

    #[test]
    fn galaxy_gates_on_anchor_distance() {
        init_logger();
        let mut engine = TrailEngine::new(
            TrailConfig::galaxy(),
            ParticleRng::new(5),
            Tally::default(),
            SurfaceSize::new(1000, 1000),
        )
        .unwrap();

        // Centre pixel normalizes to the origin, the initial anchor
        engine.handle_event(&moved(500.0, 500.0));
        assert_eq!(engine.tick(0.016).spawned, 0);

        // 1px = 0.002 normalized, not strictly greater than the threshold
        engine.handle_event(&moved(501.0, 500.0));
        assert_eq!(engine.tick(0.016).spawned, 0);

        engine.handle_event(&moved(520.0, 500.0));
        assert_eq!(engine.tick(0.016).spawned, 2);

        // Spawned in world space near the pointer, in front of the z = 0 plane
        let world = engine.viewport().to_world(Vec2::new(0.04, 0.0));
        for p in engine.pool().iter_active() {
            assert!((p.position.x - world.x).abs() < 0.2);
            assert!(p.position.y.abs() < 0.2);
            assert!(p.position.z >= 1.0 && p.position.z < 2.0);
        }
    }

    #[test]
    fn galaxy_sprites_expire_by_age() {
        let mut engine = TrailEngine::new(
            TrailConfig::galaxy(),
            ParticleRng::new(6),
            Tally::default(),
            SurfaceSize::new(1000, 1000),
        )
        .unwrap();
        engine.handle_event(&moved(900.0, 500.0));
        assert_eq!(engine.tick(0.016).spawned, 2);

        // Longest lifetime is 4s at a fixed 0.016 step: 250 ticks
        let mut expired = 0;
        for _ in 0..260 {
            expired += engine.tick(1.0).expired;
        }
        assert_eq!(expired, 2);
        assert_eq!(engine.pool().alive_count(), 0);
    }

    #[test]
    fn shutdown_clears_and_stops() {
        let mut engine = petal_engine(3);
        engine.handle_event(&moved(10.0, 10.0));
        engine.tick(0.016);
        engine.handle_event(&HostEvent::Teardown);
        assert!(!engine.is_running());
        assert_eq!(engine.pool().alive_count(), 0);

        let frames = engine.renderer().frames.get();
        engine.handle_event(&moved(500.0, 10.0));
        assert_eq!(engine.tick(0.016), TickReport::default());
        assert_eq!(engine.renderer().frames.get(), frames);
    }

    #[test]
    fn frame_loop_drives_engine_until_teardown() {
        let tally = Tally::default();
        let engine = TrailEngine::new(
            TrailConfig::petal(),
            ParticleRng::new(11),
            tally.clone(),
            SURFACE,
        )
        .unwrap();

        let mut frame_loop = FrameLoop::new();
        frame_loop.add_system(Box::new(engine));

        frame_loop.push_event(moved(0.0, 0.0));
        assert_eq!(frame_loop.frame(0.016), FrameRequest::Continue);
        frame_loop.push_event(moved(3000.0, 0.0));
        assert_eq!(frame_loop.frame(0.016), FrameRequest::Continue);
        assert_eq!(tally.frames.get(), 2);
        assert_eq!(tally.drawn.get(), 4);

        frame_loop.handle().request_stop();
        assert_eq!(frame_loop.frame(0.016), FrameRequest::Stop);
        assert_eq!(frame_loop.frame(0.016), FrameRequest::Stop);
        assert!(frame_loop.is_stopped());
        assert_eq!(tally.frames.get(), 2);
    }

    #[test]
    fn canvas_engine_paints_petals() {
        let surface = SurfaceSize::new(200, 200);
        let mut engine =
            canvas_engine(TrailConfig::petal(), ParticleRng::new(21), surface).unwrap();
        let background = Color::from_hex(0x0F0F12);

        engine.handle_event(&moved(100.0, 100.0));
        engine.handle_event(&moved(110.0, 100.0));
        for _ in 0..3 {
            engine.tick(0.016);
        }

        let canvas = engine.renderer().canvas();
        assert_eq!(canvas.size(), surface);
        let brightest = canvas
            .image()
            .pixels()
            .map(|p| p.0[0] + p.0[1] + p.0[2])
            .fold(0.0f32, f32::max);
        assert!(brightest > background.r + background.g + background.b + 0.1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("petals.png");
        canvas.save_png(&path).unwrap();
        assert!(path.exists());
    }

    /// Collects what one frame would upload to the GPU
    #[derive(Default)]
    struct Uploads {
        frames: usize,
        batches: Vec<(u16, TextureHandle, BlendMode, usize)>,
        bytes: usize,
    }

    impl InstanceSink for Uploads {
        fn begin_frame(&mut self) {
            self.frames += 1;
            self.batches.clear();
            self.bytes = 0;
        }

        fn submit(&mut self, batch: InstanceBatch<'_>) {
            self.bytes += batch.as_bytes().len();
            self.batches.push((
                batch.texture_index,
                batch.texture,
                batch.blend,
                batch.instances.len(),
            ));
        }
    }

    #[test]
    fn galaxy_submits_sprite_batches() {
        init_logger();
        let config = TrailConfig {
            blend: BlendMode::Lighter,
            ..TrailConfig::galaxy()
        };
        let textures = TextureSet::from_handles((0..9).map(|i| TextureHandle(100 + i)));
        let surface = SurfaceSize::new(1000, 1000);
        let mut engine =
            instanced_engine(config, ParticleRng::new(8), Uploads::default(), textures, surface)
                .unwrap();

        engine.handle_event(&moved(900.0, 500.0));
        assert_eq!(engine.tick(0.016).spawned, 2);

        let uploads = engine.renderer().sink();
        assert_eq!(uploads.frames, 1);
        let instances: usize = uploads.batches.iter().map(|b| b.3).sum();
        assert_eq!(instances, 2);
        assert_eq!(uploads.bytes, 2 * 80);
        for &(index, texture, blend, _) in &uploads.batches {
            assert!(index < 9);
            assert_eq!(texture, TextureHandle(100 + index as u32));
            assert_eq!(blend, BlendMode::Lighter);
        }

        // Without movement the same sprites are drawn again
        engine.tick(0.016);
        let uploads = engine.renderer().sink();
        assert_eq!(uploads.frames, 2);
        assert_eq!(uploads.batches.iter().map(|b| b.3).sum::<usize>(), 2);
    }
}
