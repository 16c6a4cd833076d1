//! Python extension for the tetrapod environment.
//!
//! Build with `--features python` (e.g. through maturin). Without the feature
//! this crate is empty so the workspace tests never link against libpython.

#[cfg(feature = "python")]
mod bindings;
