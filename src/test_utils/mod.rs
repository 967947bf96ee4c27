//! Test utilities for the trendvault codebase
//!
//! Builders, factories and mocks shared by the unit tests.

pub mod assertions;
pub mod builders;
pub mod factories;
pub mod mocks;

pub use assertions::*;
pub use builders::*;
pub use factories::*;
pub use mocks::*;
