// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![warn(unused_results)]
#![warn(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Interactive 3D object viewer engine built on wgpu.
//!
//! Vitrine shows one of several textured models at a time, turns it with
//! mouse, touch or held rotate buttons, idles with a slow auto-rotation,
//! and zooms with the wheel. Texture, lighting and model are switched from
//! three selection panels. A glTF model can be imported alongside and plays
//! its first animation.
//!
//! # Key entry points
//!
//! - [`engine::ViewerEngine`] - a [`engine::Stage`] driven by the frame
//!   loop
//! - [`input::InputAggregator`] - pointer, wheel and button normalization
//! - [`engine::RotationEngine`] - per-frame rotation and zoom
//! - [`engine::SelectionCoordinator`] - model, texture and lighting swaps
//! - [`engine::ViewportResizeHandler`] - container size to camera
//! - [`options::Options`] - runtime configuration loaded from TOML
//!
//! # Architecture
//!
//! Host events become [`input::InputEvent`]s and
//! [`engine::ViewerCommand`]s. Drag moves rotate the live model at once;
//! everything else is drained by the first frame callback, which also
//! joins a finished background import. The [`gpu::StageRenderer`] then
//! draws the attached scene nodes in a single pass.

pub mod asset;
pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod lighting;
pub mod options;
pub mod scene;
pub mod texture;
pub mod ui;
pub mod util;
#[cfg(feature = "viewer")]
mod viewer;

pub use engine::{Stage, ViewerEngine};
pub use error::ViewerError;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
