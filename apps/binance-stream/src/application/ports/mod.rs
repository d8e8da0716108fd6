//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following
//! the Hexagonal Architecture pattern. These are the contracts that
//! infrastructure adapters must implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - `Transport`: Duplex text-message connection to a feed URL
//! - `UserDataStreamApi`: REST operations that create and refresh listen keys
//!
//! ## Pure Ports
//!
//! - `Decoder`: Raw wire message to typed event

mod decoder;
mod transport;
mod user_stream;

pub use decoder::{DecodeError, Decoder};
pub use transport::{Frame, Transport, TransportError, TransportSession};
pub use user_stream::{RemoteError, UserDataStreamApi};

#[cfg(test)]
pub use user_stream::MockUserDataStreamApi;
