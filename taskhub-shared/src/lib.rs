//! # TaskHub Shared Library
//!
//! This crate contains the types and business logic shared by the TaskHub
//! API server: database models, authentication primitives, the database
//! layer, and the external collaborators (email delivery, image processing).
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Session tokens, password hashing, auth middleware
//! - `db`: Connection pooling and migrations
//! - `email`: Welcome/farewell notification delivery
//! - `images`: Avatar normalization

pub mod auth;
pub mod db;
pub mod email;
pub mod images;
pub mod models;

/// Current version of the TaskHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
