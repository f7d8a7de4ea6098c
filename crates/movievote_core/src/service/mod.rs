//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep calling layers decoupled from storage details.

pub mod movie_service;
pub mod vote_service;
