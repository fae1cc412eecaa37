//! HTTP surface
//!
//! `POST /consultar` for the front-end and `GET /health` for probes.

pub mod routes;
pub mod server;

pub use routes::router;
pub use server::{run, AppState};
