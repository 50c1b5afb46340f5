//! Steps shared by the launch and exit flows

use solana_sdk::pubkey::Pubkey;

use super::error::LaunchError;
use super::session::{RunSession, RunState};
use crate::domain::amount::{lamports_to_sol, AmountPlan};
use crate::domain::balance_preflight::{shortfalls, BalanceCheckResult, BalancePreflight};
use crate::domain::bundle_builder::{BundleBuilder, BundleRole, SubmissionGroup};
use crate::domain::group_planner::{GroupPlanner, PlannedGroup};
use crate::domain::keypair_pool::KeypairPool;
use crate::domain::signer::Signer;
use crate::ports::balances::BalanceSourcePort;
use crate::ports::wallet_store::WalletStorePort;

/// Load a fresh pool and step to `WalletsLoaded`
pub(crate) async fn load_wallets(
    session: &mut RunSession,
    store: &dyn WalletStorePort,
) -> Result<KeypairPool, LaunchError> {
    let pool = KeypairPool::load(store).await?;
    session.advance(RunState::WalletsLoaded)?;
    Ok(pool)
}

/// One preflight pass over every signer in the pool
///
/// Wallets missing from the plan are checked for the buffer alone.
pub(crate) async fn check_balances(
    pool: &KeypairPool,
    plan: &AmountPlan,
    source: &dyn BalanceSourcePort,
    preflight: &BalancePreflight,
) -> Result<Vec<BalanceCheckResult>, LaunchError> {
    let signers: Vec<&Signer> = pool.all().collect();
    let addresses: Vec<Pubkey> = signers.iter().map(|s| s.pubkey()).collect();
    let amounts: Vec<_> = addresses
        .iter()
        .map(|a| plan.get(a).map(|amount| amount.sol_spend()).unwrap_or_default())
        .collect();

    let balances = source.get_balances(&addresses).await?;
    Ok(preflight.check(&signers, &amounts, &balances)?)
}

/// Preflight and step to `BalancesVerified`; any shortfall stops the run
pub(crate) async fn verify_balances(
    session: &mut RunSession,
    pool: &KeypairPool,
    plan: &AmountPlan,
    source: &dyn BalanceSourcePort,
    preflight: &BalancePreflight,
) -> Result<Vec<BalanceCheckResult>, LaunchError> {
    let results = check_balances(pool, plan, source, preflight).await?;

    let missing = shortfalls(&results);
    if !missing.is_empty() {
        for result in &missing {
            tracing::warn!(
                wallet = %result.address,
                balance_sol = %lamports_to_sol(result.current_lamports),
                required_sol = %lamports_to_sol(result.required_lamports),
                "Insufficient balance"
            );
        }
        return Err(LaunchError::InsufficientFunds { shortfalls: missing });
    }

    session.advance(RunState::BalancesVerified)?;
    Ok(results)
}

/// Plan groups and step to `Grouped`
pub(crate) fn plan_groups<'a>(
    session: &mut RunSession,
    planner: &GroupPlanner,
    pool: &'a KeypairPool,
) -> Result<Vec<PlannedGroup<'a>>, LaunchError> {
    let groups = planner.plan_pool(pool);
    tracing::info!(
        groups = groups.len(),
        sizes = ?groups.iter().map(|g| g.len()).collect::<Vec<_>>(),
        "Planned submission groups"
    );
    session.advance(RunState::Grouped)?;
    Ok(groups)
}

/// Build every group and step to `Built`
pub(crate) fn build_groups(
    session: &mut RunSession,
    builder: &BundleBuilder,
    planned: &[PlannedGroup<'_>],
    role: BundleRole<'_>,
    plan: &AmountPlan,
    mint: &Pubkey,
) -> Result<Vec<SubmissionGroup>, LaunchError> {
    let groups = planned
        .iter()
        .map(|group| builder.build(group, role, plan, mint))
        .collect::<Result<Vec<_>, _>>()?;
    session.advance(RunState::Built)?;
    Ok(groups)
}

/// Log the drawn amounts that will be submitted
pub(crate) fn log_preview(plan: &AmountPlan) {
    for (wallet, amount) in plan.iter() {
        tracing::info!(wallet = %wallet, amount = %amount, "Planned trade");
    }
    tracing::info!(wallets = plan.len(), total_sol = %plan.total_sol(), "Preview total");
}
