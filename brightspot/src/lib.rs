// THEORY:
// This file is the main entry point for the `brightspot` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like the `visual_tester` binary).
//
// The primary goal is to export `BrightSpotPipeline` and its associated data
// structures (`PipelineConfig`, `Report`, `FrameSource`) as the clean, high-level
// interface for the engine. The grid math and the search itself live in
// `core_modules` and stay usable on their own for callers that only need a
// one-off `find_max` on a still frame.

pub mod cli;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::frame::Frame;
pub use core_modules::pixel::pixel::Pixel;
pub use error::{BrightSpotError, Result};
