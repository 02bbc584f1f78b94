//! Properties panel

use mv_core::Color;
use mv_core::config::{ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};
use mv_renderer::config::RendererConfig;

use crate::config::ViewportSettings;

/// Property controls for the viewer
pub struct PropertiesPanel {
    /// Last background string the user typed that failed to parse
    background_error: Option<String>,
}

impl PropertiesPanel {
    pub fn new() -> Self {
        Self {
            background_error: None,
        }
    }

    /// Viewer properties. Returns true if any value changed.
    pub fn viewport_ui(&mut self, ui: &mut egui::Ui, settings: &mut ViewportSettings) -> bool {
        let mut changed = false;

        ui.heading("Model");
        ui.separator();

        let file_label = settings
            .model_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "No file".to_string());
        ui.label(file_label);

        ui.horizontal(|ui| {
            if ui.button("Open OBJ...").clicked()
                && let Some(path) = rfd::FileDialog::new()
                    .add_filter("Wavefront OBJ", &["obj"])
                    .pick_file()
            {
                settings.model_path = Some(path);
                changed = true;
            }
            if ui
                .add_enabled(settings.model_path.is_some(), egui::Button::new("Clear"))
                .clicked()
            {
                settings.model_path = None;
                changed = true;
            }
        });

        ui.separator();
        ui.heading("Camera");

        changed |= ui
            .checkbox(&mut settings.allow_horizontal_rotate, "Horizontal rotation")
            .changed();
        changed |= ui
            .checkbox(&mut settings.allow_vertical_rotate, "Vertical rotation")
            .changed();
        changed |= ui.checkbox(&mut settings.allow_zoom, "Allow zoom").changed();

        ui.horizontal(|ui| {
            ui.label("Zoom:");
            changed |= ui
                .add(
                    egui::Slider::new(&mut settings.zoom, ZOOM_MIN..=ZOOM_MAX)
                        .step_by(ZOOM_STEP as f64),
                )
                .changed();
        });

        ui.label("Position:");
        ui.horizontal(|ui| {
            for (label, value) in ["X", "Y", "Z"].iter().zip(settings.camera.iter_mut()) {
                ui.label(*label);
                changed |= ui.add(egui::DragValue::new(value).speed(0.1)).changed();
            }
        });

        ui.separator();
        ui.heading("Background");

        ui.horizontal(|ui| {
            let current = Color::parse(&settings.background).unwrap_or(Color::WHITE);
            let [r, g, b, a] = current.to_rgba8();
            let mut color = egui::Color32::from_rgba_unmultiplied(r, g, b, a);
            if ui.color_edit_button_srgba(&mut color).changed() {
                settings.background = Color::from_rgba8(color.to_srgba_unmultiplied()).to_hex_string();
                self.background_error = None;
                changed = true;
            }

            let mut text = self
                .background_error
                .clone()
                .unwrap_or_else(|| settings.background.clone());
            let response = ui.add(egui::TextEdit::singleline(&mut text).desired_width(120.0));
            if response.changed() {
                if Color::parse(&text).is_ok() {
                    settings.background = text;
                    self.background_error = None;
                    changed = true;
                } else {
                    self.background_error = Some(text);
                }
            }
        });
        if self.background_error.is_some() {
            ui.colored_label(ui.visuals().error_fg_color, "Invalid color");
        }

        changed
    }

    /// Interaction settings. Returns true if any value changed.
    pub fn controls_ui(&mut self, ui: &mut egui::Ui, renderer: &mut RendererConfig) -> bool {
        let mut changed = false;

        ui.collapsing("Controls", |ui| {
            changed |= ui.checkbox(&mut renderer.enable_damping, "Damping").changed();
            ui.add_enabled_ui(renderer.enable_damping, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Damping factor:");
                    changed |= ui
                        .add(egui::Slider::new(&mut renderer.damping_factor, 0.01..=1.0))
                        .changed();
                });
            });
            ui.horizontal(|ui| {
                ui.label("Rotate speed:");
                changed |= ui
                    .add(egui::Slider::new(&mut renderer.rotate_speed, 0.1..=5.0))
                    .changed();
            });
            ui.horizontal(|ui| {
                ui.label("Zoom speed:");
                changed |= ui
                    .add(egui::Slider::new(&mut renderer.zoom_speed, 0.1..=5.0))
                    .changed();
            });
            if ui.button("Reset").clicked() {
                *renderer = RendererConfig::default();
                changed = true;
            }
        });

        changed
    }
}

impl Default for PropertiesPanel {
    fn default() -> Self {
        Self::new()
    }
}
