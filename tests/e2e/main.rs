//! E2E test suite entry point.
//!
//! Each scenario runs the `smcron` binary against a local mock of the
//! Twitter v1.1 API.

#[path = "../common/mod.rs"]
mod common;
mod dump_workflow;
mod heatmap_workflow;
mod prune_workflow;
