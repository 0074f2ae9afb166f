//! Infrastructure layer
//!
//! Filesystem, process spawning, and NDK/build directory layout. Business
//! logic belongs in [`crate::core`].

pub mod dirs;
pub mod filesystem;
pub mod ndk;
pub mod process;
