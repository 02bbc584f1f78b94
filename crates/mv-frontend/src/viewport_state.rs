//! Viewport rendering state

use mv_core::ViewportConfig;
use mv_renderer::config::RendererConfig;
use mv_renderer::{Renderer, ThreadedLoader, ViewportController};

/// Controller type used by the desktop host
pub type Viewport = ViewportController<Renderer, ThreadedLoader>;

/// The renderer's output texture as registered with egui
struct RegisteredTexture {
    id: egui::TextureId,
    version: u64,
}

/// Viewport controller plus the egui side of its output texture
pub struct ViewportState {
    pub viewport: Viewport,
    render_state: egui_wgpu::RenderState,
    texture: Option<RegisteredTexture>,
}

impl ViewportState {
    /// Create a new viewport state; the surface is mounted on first layout
    pub fn new(
        render_state: egui_wgpu::RenderState,
        ctx: &egui::Context,
        settings: RendererConfig,
    ) -> Self {
        let repaint = ctx.clone();
        let loader = ThreadedLoader::with_waker(move || repaint.request_repaint());
        Self {
            viewport: ViewportController::new(loader, settings),
            render_state,
            texture: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.viewport.backend().is_some()
    }

    /// Mounts a renderer of the given size showing `config`
    pub fn mount(&mut self, width: u32, height: u32, config: ViewportConfig) {
        let renderer = Renderer::new(
            self.render_state.device.clone(),
            self.render_state.queue.clone(),
            width,
            height,
        );
        self.viewport.on_mount(renderer, config);
    }

    /// Register or refresh the output texture; returns its egui id
    pub fn texture_id(&mut self) -> Option<egui::TextureId> {
        let renderer = self.viewport.backend()?;
        let view = renderer.output_view()?;
        let version = renderer.target_version();

        let mut egui_renderer = self.render_state.renderer.write();
        match self.texture.as_mut() {
            Some(texture) if texture.version == version => {}
            Some(texture) => {
                egui_renderer.update_egui_texture_from_wgpu_texture(
                    &self.render_state.device,
                    view,
                    wgpu::FilterMode::Linear,
                    texture.id,
                );
                texture.version = version;
            }
            None => {
                let id = egui_renderer.register_native_texture(
                    &self.render_state.device,
                    view,
                    wgpu::FilterMode::Linear,
                );
                self.texture = Some(RegisteredTexture { id, version });
            }
        }

        self.texture.as_ref().map(|t| t.id)
    }

    /// Unmounts the viewport and frees the egui texture
    pub fn unmount(&mut self) {
        if let Some(texture) = self.texture.take() {
            self.render_state.renderer.write().free_texture(&texture.id);
        }
        if let Some(renderer) = self.viewport.on_unmount() {
            tracing::debug!("Released renderer (target version {})", renderer.target_version());
        }
    }
}

impl Drop for ViewportState {
    fn drop(&mut self) {
        self.unmount();
    }
}
