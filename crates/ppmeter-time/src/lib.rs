//! ppmeter Time Engine - drift estimation from (actual, measured) samples
//!
//! This crate implements the estimation pipeline:
//! - Deviation filter: raw deviation and its exponential moving average
//! - Trial: one measurement run, fed one sample at a time or all at once
//! - Drift regressor: least-squares line over the smoothed deviation
//! - Band combiner: envelope between two trials' regression lines
//! - Reports: the series and estimates a presentation layer consumes

pub mod filter;
pub mod trial;
pub mod regress;
pub mod band;
pub mod engine;
pub mod report;

pub use filter::*;
pub use trial::*;
pub use regress::*;
pub use band::*;
pub use engine::*;
pub use report::*;
