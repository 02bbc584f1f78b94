//! Outcomes reported to the host.

use std::fmt;

/// Something the host may want to show or react to.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    /// The config had no model; the surface shows the background only.
    EmptyModel { generation: u64 },
    /// A model finished loading and is on screen.
    ModelInstalled {
        generation: u64,
        name: String,
        distance: f32,
        degenerate: bool,
    },
    /// Loading or installing the current model failed.
    LoadFailed { generation: u64, reason: String },
    /// A load finished for a generation that is no longer current.
    StaleLoadDiscarded { generation: u64, current: u64 },
    /// The config failed validation.
    ConfigRejected { generation: u64, reason: String },
}

impl ViewportEvent {
    pub fn generation(&self) -> u64 {
        match self {
            ViewportEvent::EmptyModel { generation }
            | ViewportEvent::ModelInstalled { generation, .. }
            | ViewportEvent::LoadFailed { generation, .. }
            | ViewportEvent::StaleLoadDiscarded { generation, .. }
            | ViewportEvent::ConfigRejected { generation, .. } => *generation,
        }
    }
}

impl fmt::Display for ViewportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewportEvent::EmptyModel { .. } => write!(f, "No model selected"),
            ViewportEvent::ModelInstalled { name, .. } => write!(f, "Loaded '{}'", name),
            ViewportEvent::LoadFailed { reason, .. } => write!(f, "Load failed: {}", reason),
            ViewportEvent::StaleLoadDiscarded { generation, .. } => {
                write!(f, "Discarded outdated load (generation {})", generation)
            }
            ViewportEvent::ConfigRejected { reason, .. } => write!(f, "Invalid settings: {}", reason),
        }
    }
}

/// Lifecycle status of a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewportStatus {
    #[default]
    Unmounted,
    /// Mounted without a model
    Empty,
    Loading,
    /// Model installed and render loop running
    Ready,
    Failed,
}

impl ViewportStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ViewportStatus::Unmounted => "Unmounted",
            ViewportStatus::Empty => "Empty",
            ViewportStatus::Loading => "Loading",
            ViewportStatus::Ready => "Ready",
            ViewportStatus::Failed => "Failed",
        }
    }
}
