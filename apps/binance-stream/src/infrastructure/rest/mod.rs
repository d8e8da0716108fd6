//! Binance REST Collaborator
//!
//! Signed HTTP client used by the user feed for listen key management.

pub mod client;
pub mod signing;

pub use client::{
    AccountBalance, AccountInfo, DEFAULT_REST_URL, DEFAULT_TIMEOUT, FUTURES_REST_URL, RestClient,
    UserStreamScope,
};
pub use signing::{QueryString, sign};
