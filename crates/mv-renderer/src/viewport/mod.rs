//! Viewport lifecycle
//!
//! [`ViewportController`] ties the pieces together: it owns the output
//! surface, the scene, the render loop and the loader, and replays the whole
//! mount sequence whenever the host hands it a new configuration.
//!
//! Every configuration gets a new generation number. Loads carry the
//! generation they were issued for, and a completion whose generation is no
//! longer current is disposed without being installed. This is what makes
//! rapid config changes safe: the last configuration wins, regardless of the
//! order in which loads finish.

mod events;
mod loader;

pub use events::{ViewportEvent, ViewportStatus};
pub use loader::{LoadCompletion, LoadReply, LoadRequest, ModelLoader, ThreadedLoader, Waker};

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};

use mv_core::{Color, ViewportConfig, fit_tree};

use crate::config::RendererConfig;
use crate::render_loop::{RenderLoop, RenderLoopHandle};
use crate::scene::SceneState;
use crate::traits::RenderBackend;

/// Owns one viewport from mount to unmount.
pub struct ViewportController<B: RenderBackend, L: ModelLoader> {
    backend: Option<B>,
    loader: L,
    settings: RendererConfig,
    config: Option<ViewportConfig>,
    scene: Option<SceneState>,
    render_loop: RenderLoop,
    loop_handle: Option<RenderLoopHandle>,
    generation: u64,
    pending: Option<u64>,
    completions_tx: Sender<LoadCompletion>,
    completions_rx: Receiver<LoadCompletion>,
    events: VecDeque<ViewportEvent>,
    status: ViewportStatus,
}

impl<B: RenderBackend, L: ModelLoader> ViewportController<B, L> {
    pub fn new(loader: L, settings: RendererConfig) -> Self {
        let (completions_tx, completions_rx) = mpsc::channel();
        Self {
            backend: None,
            loader,
            settings,
            config: None,
            scene: None,
            render_loop: RenderLoop::new(),
            loop_handle: None,
            generation: 0,
            pending: None,
            completions_tx,
            completions_rx,
            events: VecDeque::new(),
            status: ViewportStatus::Unmounted,
        }
    }

    /// Takes ownership of `surface` and starts showing `config`.
    pub fn on_mount(&mut self, surface: B, config: ViewportConfig) {
        if self.backend.is_some() {
            tracing::warn!("Viewport mounted twice, releasing the previous surface");
            self.on_unmount();
        }
        let (width, height) = surface.size();
        tracing::info!("Viewport mounted on {} surface ({}x{})", surface.name(), width, height);
        self.backend = Some(surface);
        self.generation += 1;
        self.mount(config);
    }

    /// Replaces the configuration. Equivalent to unmount + mount on the same
    /// surface.
    pub fn on_config_change(&mut self, config: ViewportConfig) {
        if self.backend.is_none() {
            tracing::debug!("Config change ignored, viewport is not mounted");
            return;
        }
        self.generation += 1;
        self.teardown();
        self.mount(config);
    }

    /// Tears everything down and releases the surface.
    ///
    /// Returns the released surface so callers can inspect it.
    pub fn on_unmount(&mut self) -> Option<B> {
        self.generation += 1;
        self.teardown();
        self.config = None;
        self.status = ViewportStatus::Unmounted;

        let mut backend = self.backend.take()?;
        backend.release();
        tracing::info!("Viewport unmounted (generation {})", self.generation);
        Some(backend)
    }

    /// Resizes the surface and replays the mount sequence.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if backend.size() == (width.max(1), height.max(1)) {
            return;
        }
        backend.resize(width, height);
        if let Some(config) = self.config.clone() {
            self.on_config_change(config);
        }
    }

    /// Applies interaction settings to the live scene and future ones.
    pub fn apply_settings(&mut self, settings: RendererConfig) {
        if let Some(scene) = self.scene.as_mut() {
            scene.controls_mut().apply_settings(&settings);
        }
        self.settings = settings;
    }

    /// Delivers finished loads. Returns how many completions were handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.handle_completion(completion);
            handled += 1;
        }
        handled
    }

    /// Runs one display-refresh tick. Returns true if a frame was rendered.
    pub fn frame(&mut self) -> bool {
        let (Some(backend), Some(scene)) = (self.backend.as_mut(), self.scene.as_mut()) else {
            return false;
        };
        self.render_loop.tick(|_| {
            scene.update();
            if let Err(e) = backend.render(&scene.frame_data()) {
                tracing::warn!("Frame skipped: {}", e);
            }
        })
    }

    /// Forwards a pointer drag in pixels to the orbit controls.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        if let Some(scene) = self.scene.as_mut() {
            let (_, height) = scene.size();
            scene
                .controls_mut()
                .rotate_by_pixels(dx, dy, height as f32);
        }
    }

    /// Forwards wheel notches to the orbit controls (positive moves closer).
    pub fn zoom(&mut self, notches: f32) {
        if let Some(scene) = self.scene.as_mut() {
            scene.controls_mut().wheel(notches);
        }
    }

    pub fn status(&self) -> ViewportStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while a load for the current generation is outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    /// Observer for the current render loop, if one was started.
    pub fn loop_handle(&self) -> Option<RenderLoopHandle> {
        self.loop_handle.clone()
    }

    /// Takes every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<ViewportEvent> {
        self.events.drain(..).collect()
    }

    pub fn config(&self) -> Option<&ViewportConfig> {
        self.config.as_ref()
    }

    pub fn scene(&self) -> Option<&SceneState> {
        self.scene.as_ref()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    fn mount(&mut self, config: ViewportConfig) {
        let generation = self.generation;
        let background = config.background;

        if let Err(e) = config.validate() {
            tracing::warn!("Rejected viewport config (generation {}): {}", generation, e);
            self.clear_surface(background);
            self.status = ViewportStatus::Failed;
            self.events.push_back(ViewportEvent::ConfigRejected {
                generation,
                reason: e.to_string(),
            });
            self.config = Some(config);
            return;
        }

        let Ok(source) = config.require_model().cloned() else {
            tracing::debug!("No model for generation {}, rendering empty surface", generation);
            self.clear_surface(background);
            self.status = ViewportStatus::Empty;
            self.events.push_back(ViewportEvent::EmptyModel { generation });
            self.config = Some(config);
            return;
        };

        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        let (width, height) = backend.size();
        self.scene = Some(SceneState::new(&config, &self.settings, width, height));
        self.render_loop = RenderLoop::new();
        self.clear_surface(background);

        tracing::debug!("Requesting '{}' for generation {}", source.name(), generation);
        self.pending = Some(generation);
        self.status = ViewportStatus::Loading;
        self.config = Some(config);
        self.loader.request(
            LoadRequest { generation, source },
            self.completions_tx.clone(),
        );
    }

    fn teardown(&mut self) {
        if self.render_loop.cancel() {
            tracing::debug!("Render loop stopped after {} ticks", self.render_loop.ticks());
        }
        self.loop_handle = None;
        self.pending = None;

        if let Some(mut scene) = self.scene.take() {
            match self.backend.as_mut() {
                Some(backend) => scene.teardown(backend),
                None => tracing::warn!("Scene torn down without a surface"),
            }
        }
    }

    fn handle_completion(&mut self, completion: LoadCompletion) {
        let LoadCompletion { generation, result } = completion;

        if generation != self.generation || self.pending != Some(generation) {
            if let Ok(tree) = result {
                tree.dispose();
            }
            tracing::debug!(
                "Discarded load for generation {} (current {})",
                generation,
                self.generation
            );
            self.events.push_back(ViewportEvent::StaleLoadDiscarded {
                generation,
                current: self.generation,
            });
            return;
        }
        self.pending = None;

        let tree = match result {
            Ok(tree) => tree,
            Err(e) => {
                self.fail(generation, e.reason());
                return;
            }
        };

        let (Some(backend), Some(scene), Some(config)) =
            (self.backend.as_mut(), self.scene.as_mut(), self.config.as_ref())
        else {
            tree.dispose();
            return;
        };

        let name = tree.name.clone();
        let camera = scene.camera();
        let fit = fit_tree(&tree, camera.fov_degrees, camera.view_axis());

        if let Err(e) = scene.install_model(backend, tree, &fit, generation) {
            self.fail(generation, e.to_string());
            return;
        }
        scene.apply_control_constraints(config);

        match self.render_loop.start() {
            Ok(handle) => self.loop_handle = Some(handle),
            Err(e) => tracing::warn!("Render loop not started: {}", e),
        }

        self.status = ViewportStatus::Ready;
        self.events.push_back(ViewportEvent::ModelInstalled {
            generation,
            name,
            distance: fit.distance,
            degenerate: fit.degenerate,
        });
    }

    fn fail(&mut self, generation: u64, reason: String) {
        tracing::warn!("Model load failed (generation {}): {}", generation, reason);
        if let Some(config) = self.config.as_ref() {
            let background = config.background;
            self.clear_surface(background);
        }
        self.status = ViewportStatus::Failed;
        self.events
            .push_back(ViewportEvent::LoadFailed { generation, reason });
    }

    fn clear_surface(&mut self, color: Color) {
        if let Some(backend) = self.backend.as_mut()
            && let Err(e) = backend.clear(color)
        {
            tracing::warn!("Failed to clear surface: {}", e);
        }
    }
}

impl<B: RenderBackend, L: ModelLoader> Drop for ViewportController<B, L> {
    fn drop(&mut self) {
        if self.backend.is_some() {
            self.on_unmount();
        }
    }
}
