//! Catalog and configuration loading for the simulator.

pub mod catalog;
pub mod config;
pub mod load;

pub use catalog::*;
pub use config::*;
pub use load::*;
