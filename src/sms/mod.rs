//! SMS dispatch path: pattern rotation, dedup guard, gateway client.

pub mod dedup;
pub mod dispatch;
pub mod gateway;
pub mod patterns;

pub use dedup::DedupCache;
pub use dispatch::{SmsDispatcher, SmsError};
pub use gateway::{GatewayError, IppanelClient};
pub use patterns::{PatternEntry, PatternError, PatternInfo, PatternStore};
