//! Defines the data structures and models used throughout the application.
//!
//! This covers the proxy's query parameters and the normalized form of the
//! OpenAQ location records that the map renders.

mod openaq;

pub use openaq::*;
