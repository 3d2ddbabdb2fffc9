//! Taieba Academy client
//!
//! Facade over [`academy_core`]. See the `academy` binary for the terminal
//! front-end.

pub use academy_core::*;
