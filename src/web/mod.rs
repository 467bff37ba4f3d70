//! Web API module for Stowage.
//!
//! This module provides the HTTP surface around the upload policy: a
//! multipart upload endpoint and a health check.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
