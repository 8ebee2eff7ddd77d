//! The browser-facing map view and the loader that mounts it.

mod lazy;
mod map;
mod page;

pub use lazy::*;
pub use map::*;
