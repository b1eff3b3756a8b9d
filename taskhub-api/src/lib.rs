/// Task management API server
///
/// HTTP API for user accounts, bearer-token sessions, and owner-scoped
/// tasks, backed by PostgreSQL.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
