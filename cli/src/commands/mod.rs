//! Command implementations

pub mod check;
pub mod plan;
pub mod provision;
pub mod version;
