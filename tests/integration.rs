//! Integration test suite (requires a real Salesforce org).
//!
//! Run all integration tests with:
//!   SF_AUTH_URL=... cargo test --test integration -- --ignored --nocapture

#[path = "integration/common.rs"]
mod common;
#[path = "integration/chatter.rs"]
mod chatter;
