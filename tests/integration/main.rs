//! Integration tests against the in-memory store
//!
//! `service_tests` drives the service layer directly, `api_tests` sends
//! requests through the full router.

mod api_tests;
mod common;
mod service_tests;
