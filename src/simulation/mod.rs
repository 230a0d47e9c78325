//! Random scenario generation for stress tests and benchmarks.
