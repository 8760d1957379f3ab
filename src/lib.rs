//! # instore-assistant
//!
//! Client for the in-store shopping assistant backend. A shopper can search
//! the catalog, ask for recommendations, or type a natural-language request;
//! each of these is a "page" driven by the same query state machine.
//!
//! ## Architecture
//!
//! ```text
//!   user input ──► QueryController<Mode> ──► Gateway ──► backend (HTTP)
//!                        │  validate              │
//!                        │  Idle/Loading/         │  typed result or
//!                        │  Succeeded/Failed ◄────┘  GatewayError
//!                        ▼
//!                  render(state) ──► DisplayModel
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration: backend address, timeouts, resolution policy
//! - [`models`] - Catalog payloads returned by the backend
//! - [`gateway`] - The `Gateway` trait, `GatewayError`, and the reqwest-backed `HttpGateway`
//! - [`controller`] - Per-page request state machine, parameterized by query mode
//! - [`render`] - Pure mapping from request state to a display model
//! - [`shell`] - Line-oriented terminal host for the pages

pub mod config;
pub mod controller;
pub mod gateway;
pub mod models;
pub mod render;
pub mod shell;
