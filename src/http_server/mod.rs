//! # Admissions HTTP Server
//!
//! JSON API over the student registry.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/metrics` - Counter snapshot
//! - `/students` - List (GET) and register (POST)
//! - `/students/:id` - Get, update (PUT/POST) and delete

pub mod config;
pub mod observability_routes;
pub mod server;
pub mod student_routes;

pub use config::HttpServerConfig;
pub use server::HttpServer;
