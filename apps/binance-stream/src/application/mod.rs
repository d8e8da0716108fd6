//! Application Layer - Port definitions and the streaming engine.
//!
//! Services here depend only on the port traits, so the reconnect and
//! keep-alive logic can be driven by scripted fakes in tests.

/// Port interfaces for decoders, transports and the REST collaborator.
pub mod ports;

/// Stream listener, keep-alive task and user feed coordinator.
pub mod services;
