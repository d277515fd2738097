//! The per-hop wire contract and the HTTP client that speaks it.
//!
//! A hop request is a multipart body with `face` and `hat` parts plus `translate`/`rotate` query
//! parameters; the response is `{"finalBaby": "data:image/png;base64,..."}` or an
//! [`ErrorPayload`](crate::ErrorPayload) on failure.

/// Remote compositor client.
pub mod client;
/// Request parameters and response bodies.
pub mod wire;
