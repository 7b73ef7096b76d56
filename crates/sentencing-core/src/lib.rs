//! Core types for the sentencing estimation toolkit.
//!
//! The crime/factor catalog, the validity filter, the category → kind
//! taxonomy, the case-identifier parser and the sentence formatter all live
//! here. This crate is free of HTTP and async runtime dependencies; the
//! prediction service is reached through the [`prediction::PredictionService`]
//! trait, implemented by the presentation layers.

// Native `async fn`-style traits return `impl Future`; the `Send` bound is
// spelled out on each method instead.
#![allow(async_fn_in_trait)]

pub mod case_id;
pub mod catalog;
pub mod error;
pub mod prediction;
pub mod selection;
pub mod sentence;
pub mod taxonomy;
pub mod validity;

pub use error::{Error, Result};
