//! Audio file handling.

pub mod wav;
