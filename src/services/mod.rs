//! Services module
//!
//! This module contains the service layer used by the transport handlers

pub mod inference;

pub use inference::InferenceService;
