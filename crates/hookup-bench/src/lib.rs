#![deny(clippy::all)]
#![warn(clippy::pedantic)]

//! Benchmark harness for hookup.
//!
//! Run benchmarks with: `cargo bench -p hookup-bench`
//!
//! Covers the per-specifier hot path: rewrite-table lookup and extension
//! probing against a real directory.
