//! Core traits for the renderer system.
//!
//! [`RenderBackend`] is the output-surface seam: the scene owner and the
//! viewport controller only talk to a backend through it, so the same
//! lifecycle drives the wgpu renderer and the headless bookkeeping backend.

mod backend;

pub use backend::*;
