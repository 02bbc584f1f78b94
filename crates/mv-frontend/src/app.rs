//! Main application

use mv_renderer::ViewportStatus;

use crate::config::{SharedConfig, create_shared_config};
use crate::panels::PropertiesPanel;
use crate::viewport_state::ViewportState;

/// Scroll distance in points that counts as one wheel notch
const SCROLL_POINTS_PER_NOTCH: f32 = 50.0;

/// Model viewer application
pub struct ModelViewerApp {
    config: SharedConfig,
    viewport_state: Option<ViewportState>,
    properties: PropertiesPanel,
    last_event: Option<String>,
}

impl ModelViewerApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = create_shared_config();
        let renderer_settings = config.read().config().renderer.clone();

        let viewport_state = match cc.wgpu_render_state.clone() {
            Some(render_state) => Some(ViewportState::new(
                render_state,
                &cc.egui_ctx,
                renderer_settings,
            )),
            None => {
                tracing::error!("wgpu render state unavailable, viewport disabled");
                None
            }
        };

        Self {
            config,
            viewport_state,
            properties: PropertiesPanel::new(),
            last_event: None,
        }
    }

    fn show_properties(&mut self, ctx: &egui::Context) {
        let mut settings = self.config.read().config().viewport.clone();
        let mut renderer = self.config.read().config().renderer.clone();
        let mut viewport_changed = false;
        let mut controls_changed = false;

        egui::SidePanel::left("properties")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    viewport_changed = self.properties.viewport_ui(ui, &mut settings);
                    ui.separator();
                    controls_changed = self.properties.controls_ui(ui, &mut renderer);
                });
            });

        if viewport_changed {
            self.config.write().config_mut().viewport = settings;
            let config = self.config.read().viewport_config();
            if let Some(state) = self.viewport_state.as_mut()
                && state.is_mounted()
            {
                state.viewport.on_config_change(config);
            }
        }

        if controls_changed {
            self.config.write().config_mut().renderer = renderer.clone();
            if let Some(state) = self.viewport_state.as_mut() {
                state.viewport.apply_settings(renderer);
            }
        }
    }

    fn show_status(&mut self, ctx: &egui::Context) {
        let status = self
            .viewport_state
            .as_ref()
            .map(|s| s.viewport.status())
            .unwrap_or(ViewportStatus::Unmounted);

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(status.label());
                if let Some(event) = &self.last_event {
                    ui.separator();
                    ui.label(event);
                }
            });
        });
    }

    fn show_viewport(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let Some(state) = self.viewport_state.as_mut() else {
                    ui.centered_and_justified(|ui| {
                        ui.label("3D viewport requires the wgpu backend");
                    });
                    return;
                };

                let size = ui.available_size();
                let ppp = ctx.pixels_per_point();
                let width = (size.x * ppp).round().max(1.0) as u32;
                let height = (size.y * ppp).round().max(1.0) as u32;

                if state.is_mounted() {
                    state.viewport.on_resize(width, height);
                } else {
                    state.mount(width, height, self.config.read().viewport_config());
                }

                let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

                if response.dragged() {
                    let delta = response.drag_delta() * ppp;
                    state.viewport.orbit(delta.x, delta.y);
                }
                if response.hovered() {
                    let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                    if scroll != 0.0 {
                        state.viewport.zoom(scroll / SCROLL_POINTS_PER_NOTCH);
                    }
                }

                state.viewport.poll();
                for event in state.viewport.drain_events() {
                    self.last_event = Some(event.to_string());
                }
                state.viewport.frame();

                if let Some(texture_id) = state.texture_id() {
                    ui.painter().image(
                        texture_id,
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }

                if state.viewport.is_running() || state.viewport.is_loading() {
                    ctx.request_repaint();
                }
            });
    }

    fn save_config(&self) {
        let mut manager = self.config.write();
        if manager.is_dirty()
            && let Err(e) = manager.save()
        {
            tracing::warn!("Failed to save config: {}", e);
        }
    }
}

impl eframe::App for ModelViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.save_config();
        }

        self.show_properties(ctx);
        self.show_status(ctx);
        self.show_viewport(ctx);
    }
}

impl Drop for ModelViewerApp {
    fn drop(&mut self) {
        if let Some(mut state) = self.viewport_state.take() {
            state.unmount();
        }
        self.save_config();
    }
}
