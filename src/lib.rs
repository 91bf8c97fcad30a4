//! Fusion: Multi-Source Data Fusion
//!
//! Clusters duplicate records across overlapping datasets, merges each cluster into one record
//! that keeps every contributed value with its provenance, resolves conflicting values with
//! configurable strategies and measures the result against a gold standard.

pub mod classify;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod logging;
pub mod merge;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod resolution;
pub mod tree;
pub mod types;
