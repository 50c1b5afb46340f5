//! Application Layer - Launch orchestration
//!
//! Composes domain logic with ports: the vanity mint search, bundle
//! submission, and the launch and exit flows.

pub mod error;
pub mod exit;
pub mod launch;
pub mod session;
mod steps;
pub mod submitter;
pub mod vanity;

pub use error::{GroupReceipt, LaunchError, RunFailure, SubmissionFailure, EXPLORER_TX_URL};
pub use exit::{ExitOrchestrator, ExitReport, DEFAULT_SELL_PERCENT};
pub use launch::{LaunchOrchestrator, LaunchReport};
pub use session::{Phase, RunSession, RunState};
pub use submitter::{BundleSubmitter, DEFAULT_INTER_GROUP_DELAY};
pub use vanity::{
    validate_suffix, ProgressReporter, SearchProgress, VanityConfig, VanityError, VanityMatch,
    VanitySearch, MAX_WORKERS, SEARCH_BATCH_SIZE,
};
