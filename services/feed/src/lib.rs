//! Match feed service
//!
//! Fans committed ledger changes out to viewers:
//! - Per-match broadcast rooms (`commentary` then `matchUpdate`)
//! - Checksummed match snapshots for late-joiner reconciliation
//! - Viewer room membership and the WebSocket control messages
//! - A best-effort cache of each match's most recent events
//!
//! # Architecture
//!
//! ```text
//!      Ledger (per-match lock)
//!            │ ball_recorded / status_changed
//!      ┌─────┴──────┐
//!      │            │
//! ┌────▼────┐  ┌────▼─────┐
//! │ FeedHub │  │  Recent  │
//! └────┬────┘  │  cache   │
//!      │       └──────────┘
//! ┌────▼──────────────┐
//! │ WebSocket viewers │
//! └───────────────────┘
//! ```

pub mod hub;
pub mod recent;
pub mod registry;
pub mod signal;
pub mod snapshot;

pub use hub::{Broadcaster, FeedHub, Subscription, SubscriptionEvent, DEFAULT_FEED_CAPACITY};
pub use recent::{CacheError, CacheHandle, InMemoryRecentCache, RecentEventCache, RECENT_EVENT_LIMIT};
pub use registry::{
    parse_client_message, ClientId, ClientMessage, ClientRegistry, JoinOutcome, RegistryConfig,
    RegistryError, ServerMessage,
};
pub use signal::{Signal, SignalKind};
pub use snapshot::{compute_checksum, verify_snapshot, MatchSnapshot};

// Service version
pub const SERVICE_VERSION: &str = "0.1.0";
