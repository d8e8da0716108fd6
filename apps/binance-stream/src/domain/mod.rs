//! Domain Layer - Event records and static tables.
//!
//! Everything here is plain data: no sockets, no clocks, no tasks.

/// Decoded event records, one per feed type.
pub mod events;

/// Candle interval tokens and their durations.
pub mod interval;

/// Feed endpoint descriptors.
pub mod endpoint;

/// User-data-stream feed token.
pub mod token;
