//! ppmeter Test Harness - synthetic trials and end-to-end validation
//!
//! This crate provides:
//! - A drifting clock simulator with seeded jitter
//! - Device feed rendering for the live pipeline
//! - Cross-crate scenarios (file, live feed, band)

pub mod simulator;
pub mod integration;

pub use simulator::*;
pub use integration::*;
