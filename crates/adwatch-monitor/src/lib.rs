//! Change-detection pipeline: fetch → extract → diff → notify → persist,
//! driven repeatedly by a jittered, budget-bounded scheduler.
//!
//! [`Monitor`] is the single context value built at startup; it owns the
//! fetcher, notifier, extraction rules and seen-set store and is passed by
//! reference into every pass.

pub mod error;
pub mod fetch;
pub mod monitor;
pub mod notify;
pub mod pass;
pub mod scheduler;
pub mod seen_store;

pub use error::MonitorError;
pub use fetch::PageFetcher;
pub use monitor::Monitor;
pub use notify::{DiscordNotifier, DryRunNotifier, Notifier, NotifyResult};
pub use pass::{next_seen_set, run_pass, PassOutcome, PassSummary};
pub use scheduler::{run_until_deadline, Jitter, RunSummary};
pub use seen_store::SeenStore;
