//! Core types and trait definitions for the clinical trials mirror.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod normalize;
pub mod store;
pub mod trial;
pub mod watermark;

pub use error::{Error, Result};
pub use normalize::normalize;
pub use trial::{Intervention, TrialRecord};
