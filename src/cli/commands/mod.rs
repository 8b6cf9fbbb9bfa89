//! Command implementations.

pub mod check;
pub mod completions;
pub mod export;
pub mod import;
pub mod layers;
pub mod list;
pub mod schema;
pub mod version;
