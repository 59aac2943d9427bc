//! ppmeter Sources - where (actual, measured) samples come from
//!
//! - Batch: two-column CSV trial files, and a writer to record live runs
//! - Live: timestamp lines from a clock device turned into samples
//! - Acquisition: the async read loop with an explicit stop signal

pub mod error;
pub mod batch;
pub mod live;
pub mod acquire;

pub use error::*;
pub use batch::*;
pub use live::*;
pub use acquire::*;
