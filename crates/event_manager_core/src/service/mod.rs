//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep request handling and rendering decoupled from storage details.

pub mod event_service;
pub mod listing_service;
pub mod rsvp_service;
