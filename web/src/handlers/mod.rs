//! HTTP request handlers.

mod files;
mod moves;

pub use files::*;
pub use moves::*;
