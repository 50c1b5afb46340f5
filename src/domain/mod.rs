//! Domain Layer - Core launch logic
//!
//! Pure types and algorithms: signers, amounts, grouping, preflight and
//! intent construction. All external interactions happen through the
//! ports layer.

pub mod amount;
pub mod balance_preflight;
pub mod bundle_builder;
pub mod group_planner;
pub mod intent;
pub mod keypair_pool;
pub mod metadata;
pub mod mint;
pub mod signer;

pub use amount::{
    lamports_to_sol, sol_to_lamports, AmountError, AmountPlan, AmountPolicy, TradeAmount,
    LAMPORTS_PER_SOL,
};
pub use balance_preflight::{
    shortfalls, BalanceCheckResult, BalancePreflight, PreflightError, DEFAULT_BUFFER_LAMPORTS,
};
pub use bundle_builder::{BuildError, BundleBuilder, BundleRole, SubmissionGroup};
pub use group_planner::{
    GroupPlanner, GroupPlannerConfig, PlanError, PlannedGroup, FIRST_GROUP_BACKING_COUNT,
    MAX_BUNDLE_SIZE,
};
pub use intent::{FeeTier, TokenPayload, TradeAction, TradeIntent, Venue};
pub use keypair_pool::{KeypairPool, PoolError};
pub use metadata::{FeedPayload, LaunchStrategy, TokenMetadata};
pub use mint::MintIdentity;
pub use signer::{Signer, SignerRole};
