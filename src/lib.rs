//! PBSEP - photo to 1-bit bitmap and vector outline
//!
//! The image stages live in the `bilevel` crate. This crate adds profiles,
//! the single-image pipeline, the matrix runner, artifact export with
//! pluggable tracing and preview backends, and the CLI.
//! This library exposes modules for integration testing.

pub mod assets;
pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
