//! # plugctl Core Kernel
//!
//! Shared foundations for the rest of the crate:
//!
//! - **Core Constants**: default paths, manifest file names and the dependency
//!   type tag, in the `constants` submodule.
//! - **Error Handling**: the crate-level [`Error`](error::Error) and its
//!   `Result` alias, in the `error` submodule.
pub mod constants;
pub mod error;

pub use error::{Error, Result};
