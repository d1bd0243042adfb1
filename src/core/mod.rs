//! Core functionality for the Gateway
//!
//! - **backend**: the model server seam and its HTTP client
//! - **batch**: request queue and batch scheduler

pub mod backend;
pub mod batch;
