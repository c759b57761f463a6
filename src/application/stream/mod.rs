//! Streaming session manager.
//!
//! - [`registry`]: the ordered subscription list and its replay/unsubscribe policies
//! - [`router`]: frame decoding, the balance table and consumer delivery
//! - [`backoff`]: the bounded reconnect schedule
//! - [`session`]: the task that owns the physical connection
//! - [`manager`]: the caller-facing [`StreamManager`] handle

pub mod backoff;
pub mod manager;
pub mod registry;
pub mod router;
pub mod session;

pub use backoff::ReconnectSchedule;
pub use manager::StreamManager;
pub use registry::SubscriptionRegistry;
pub use router::{BalanceTable, MessageRouter};
pub use session::SessionState;
