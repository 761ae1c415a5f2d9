//! # Hospital review dashboard
//!
//! Aggregation, corpus building and zero-shot classification over a table
//! of pre-labelled hospital reviews, plus the desktop dashboard that drives
//! them.

pub mod classify;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod views;

pub use error::{DashboardError, Result};
