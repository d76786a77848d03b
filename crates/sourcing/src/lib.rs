//! Command line front end for the supplier landed-cost simulator
//!
//! Wraps `sourcing_core` with the pieces that touch the outside world:
//! registry files, the discount rate lookup, logging and report output.

pub mod format;
pub mod indicator;
pub mod logging;
pub mod registry;
pub mod report;

pub use logging::{default_data_dir, init_logging};
