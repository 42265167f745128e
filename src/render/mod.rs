//! Rendering pipeline.

pub mod renderer;
