//! Run session
//!
//! Explicit state for one launch or exit run. The orchestrator owns the
//! session; every transition is validated and logged.

use std::fmt;

use chrono::{DateTime, Utc};

use super::error::LaunchError;

/// Which flow a session drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Launch,
    Exit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Launch => f.write_str("launch"),
            Phase::Exit => f.write_str("exit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    WalletsLoaded,
    BalancesVerified,
    Grouped,
    Built,
    Submitting,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    /// The single forward step from this state
    fn next(&self) -> Option<RunState> {
        match self {
            RunState::Idle => Some(RunState::WalletsLoaded),
            RunState::WalletsLoaded => Some(RunState::BalancesVerified),
            RunState::BalancesVerified => Some(RunState::Grouped),
            RunState::Grouped => Some(RunState::Built),
            RunState::Built => Some(RunState::Submitting),
            RunState::Submitting => Some(RunState::Done),
            RunState::Done | RunState::Failed => None,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::WalletsLoaded => "wallets_loaded",
            RunState::BalancesVerified => "balances_verified",
            RunState::Grouped => "grouped",
            RunState::Built => "built",
            RunState::Submitting => "submitting",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct RunSession {
    phase: Phase,
    state: RunState,
    started_at: DateTime<Utc>,
    history: Vec<(RunState, DateTime<Utc>)>,
}

impl RunSession {
    pub fn new(phase: Phase) -> Self {
        let now = Utc::now();
        Self {
            phase,
            state: RunState::Idle,
            started_at: now,
            history: vec![(RunState::Idle, now)],
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// States visited so far, with entry times
    pub fn history(&self) -> &[(RunState, DateTime<Utc>)] {
        &self.history
    }

    /// Step forward; only the next state in sequence is accepted
    pub fn advance(&mut self, to: RunState) -> Result<(), LaunchError> {
        if self.state.next() != Some(to) {
            return Err(LaunchError::InvalidTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }

        self.enter(to);
        if to == RunState::Done {
            tracing::info!(phase = %self.phase, state = %to, outcome = "success", "Run complete");
        } else {
            tracing::info!(phase = %self.phase, state = %to, "State transition");
        }
        Ok(())
    }

    /// Move to `Failed` from any non-terminal state
    pub fn fail(&mut self, error: &LaunchError) {
        if self.state.is_terminal() {
            tracing::warn!(phase = %self.phase, state = %self.state, error = %error, "Error after run finished");
            return;
        }

        tracing::error!(
            phase = %self.phase,
            from = %self.state,
            error = %error,
            "Run failed"
        );
        self.enter(RunState::Failed);
    }

    fn enter(&mut self, state: RunState) {
        self.state = state;
        self.history.push((state, Utc::now()));
    }
}
