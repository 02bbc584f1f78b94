//! Model Viewer Frontend
//!
//! eframe host for the viewer: a property panel, settings persistence and a
//! central viewport showing the renderer's offscreen texture.

mod app;
pub mod config;
mod panels;
mod viewport_state;

pub use app::ModelViewerApp;
