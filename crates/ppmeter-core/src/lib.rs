//! ppmeter Core - Fundamental types for clock drift estimation
//!
//! This crate defines the types shared by every ppmeter crate:
//! - Samples (actual vs. measured elapsed time)
//! - Evaluation domains and drift unit constants
//! - The drift error taxonomy

pub mod sample;
pub mod time;
pub mod error;

pub use sample::*;
pub use time::*;
pub use error::*;
