//! Integration tests for utxowatch
//!
//! These tests verify the interaction between the simulation engine,
//! the market updater, and the exchange-rate subsystem. Component-level
//! behavior is covered by unit tests inside utxowatch-core; the tests
//! here exercise the system through the public engine handle.

#[path = "integration/conversion_properties.rs"]
mod conversion_properties;
#[path = "integration/determinism.rs"]
mod determinism;
#[path = "integration/engine_lifecycle.rs"]
mod engine_lifecycle;
#[path = "integration/refresh_behavior.rs"]
mod refresh_behavior;
