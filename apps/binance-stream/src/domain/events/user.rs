//! User data stream events (`<listenKey>`).
//!
//! The user feed multiplexes several event kinds on one socket,
//! distinguished by the `e` field. Kinds this crate does not model are
//! passed through as raw JSON rather than rejected, so a new exchange
//! event type never tears down the feed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const ACCOUNT_POSITION: &str = "outboundAccountPosition";
pub(crate) const BALANCE_UPDATE: &str = "balanceUpdate";
pub(crate) const EXECUTION_REPORT: &str = "executionReport";
pub(crate) const LISTEN_KEY_EXPIRED: &str = "listenKeyExpired";

/// One event from the authenticated user data stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UserEvent {
    /// Balances changed for one or more assets.
    AccountPosition(AccountPosition),
    /// Deposit, withdrawal or transfer.
    BalanceUpdate(BalanceUpdate),
    /// Order created, filled, cancelled, ...
    ExecutionReport(Box<ExecutionReport>),
    /// The listen key expired; the feed will receive nothing further
    /// until a new key is created.
    ListenKeyExpired(ListenKeyExpired),
    /// A well-formed event of a kind not modelled here.
    Other {
        /// Value of the `e` field
        event_type: String,
        /// Full payload
        payload: Value,
    },
}

impl UserEvent {
    /// Wire event type tag.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::AccountPosition(_) => ACCOUNT_POSITION,
            Self::BalanceUpdate(_) => BALANCE_UPDATE,
            Self::ExecutionReport(_) => EXECUTION_REPORT,
            Self::ListenKeyExpired(_) => LISTEN_KEY_EXPIRED,
            Self::Other { event_type, .. } => event_type,
        }
    }
}

/// Balance of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Balance {
    /// Asset
    #[serde(rename(deserialize = "a"))]
    pub asset: String,
    /// Free amount
    #[serde(rename(deserialize = "f"))]
    pub free: String,
    /// Locked amount
    #[serde(rename(deserialize = "l"))]
    pub locked: String,
}

/// Account balances after a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AccountPosition {
    /// Event time (ms since epoch)
    #[serde(rename(deserialize = "E"))]
    pub event_time: u64,
    /// Time of last account update (ms since epoch)
    #[serde(rename(deserialize = "u"))]
    pub last_update_time: u64,
    /// Changed balances
    #[serde(rename(deserialize = "B"))]
    pub balances: Vec<Balance>,
}

impl AccountPosition {
    /// Balance for `asset`, if it changed in this event.
    #[must_use]
    pub fn balance(&self, asset: &str) -> Option<&Balance> {
        self.balances.iter().find(|b| b.asset == asset)
    }
}

/// Balance delta from a deposit, withdrawal or internal transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct BalanceUpdate {
    /// Event time (ms since epoch)
    #[serde(rename(deserialize = "E"))]
    pub event_time: u64,
    /// Asset
    #[serde(rename(deserialize = "a"))]
    pub asset: String,
    /// Signed balance delta
    #[serde(rename(deserialize = "d"))]
    pub delta: String,
    /// Clear time (ms since epoch)
    #[serde(rename(deserialize = "T"))]
    pub clear_time: u64,
}

/// Order update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ExecutionReport {
    /// Event time (ms since epoch)
    #[serde(rename(deserialize = "E"))]
    pub event_time: u64,
    /// Symbol
    #[serde(rename(deserialize = "s"))]
    pub symbol: String,
    /// Client order ID
    #[serde(rename(deserialize = "c"))]
    pub client_order_id: String,
    /// BUY or SELL
    #[serde(rename(deserialize = "S"))]
    pub side: String,
    /// Order type
    #[serde(rename(deserialize = "o"))]
    pub order_type: String,
    /// Time in force
    #[serde(rename(deserialize = "f"))]
    pub time_in_force: String,
    /// Order quantity
    #[serde(rename(deserialize = "q"))]
    pub quantity: String,
    /// Order price
    #[serde(rename(deserialize = "p"))]
    pub price: String,
    /// Stop price
    #[serde(rename(deserialize = "P"))]
    pub stop_price: String,
    /// Execution type (NEW, TRADE, CANCELED, ...)
    #[serde(rename(deserialize = "x"))]
    pub execution_type: String,
    /// Order status
    #[serde(rename(deserialize = "X"))]
    pub order_status: String,
    /// Reject reason ("NONE" when not rejected)
    #[serde(rename(deserialize = "r"))]
    pub reject_reason: String,
    /// Order ID
    #[serde(rename(deserialize = "i"))]
    pub order_id: u64,
    /// Last executed quantity
    #[serde(rename(deserialize = "l"))]
    pub last_executed_quantity: String,
    /// Cumulative filled quantity
    #[serde(rename(deserialize = "z"))]
    pub cumulative_filled_quantity: String,
    /// Last executed price
    #[serde(rename(deserialize = "L"))]
    pub last_executed_price: String,
    /// Commission amount
    #[serde(rename(deserialize = "n"))]
    pub commission: String,
    /// Commission asset (null until the first fill)
    #[serde(rename(deserialize = "N"))]
    pub commission_asset: Option<String>,
    /// Transaction time (ms since epoch)
    #[serde(rename(deserialize = "T"))]
    pub transaction_time: u64,
    /// Trade ID (-1 when not a fill)
    #[serde(rename(deserialize = "t"))]
    pub trade_id: i64,
    /// Whether this fill was on the maker side
    #[serde(rename(deserialize = "m"))]
    pub is_maker: bool,
    /// Order creation time (ms since epoch)
    #[serde(rename(deserialize = "O"))]
    pub order_creation_time: u64,
    /// Cumulative quote asset transacted quantity
    #[serde(rename(deserialize = "Z"))]
    pub cumulative_quote_quantity: String,
}

impl ExecutionReport {
    /// Whether this report carries a fill.
    #[must_use]
    pub fn is_fill(&self) -> bool {
        self.execution_type == "TRADE"
    }
}

/// The listen key backing the feed has expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenKeyExpired {
    /// Event time (ms since epoch)
    #[serde(rename(deserialize = "E"))]
    pub event_time: u64,
    /// The expired key
    pub listen_key: String,
}
