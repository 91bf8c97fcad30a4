//! Property-based tests for clustering, measures and resolution
