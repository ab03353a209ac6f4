// Résumé pagination: blocks → measurement → greedy packing, driven by the cycle engine.
// Measurement is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod blocks;
pub mod engine;
pub mod font_metrics;
pub mod handlers;
pub mod measure;
pub mod packer;
pub mod theme;
