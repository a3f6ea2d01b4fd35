//! WebGPU rendering module
//!
//! The scene is raymarched from signed distance fields in a single
//! fullscreen fragment pass.

pub mod scene_pipeline;

pub use scene_pipeline::{SceneRenderState, SceneView, frame_uniforms};
