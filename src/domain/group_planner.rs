//! Group Planner
//!
//! Partitions the signer pool into submission groups. Group 0 is the creator
//! followed by the first backing signers; the rest are chunked in load order.
//! A short final group is kept as-is.

use thiserror::Error;

use super::keypair_pool::KeypairPool;
use super::signer::Signer;

/// Relay limit on transactions per bundle
pub const MAX_BUNDLE_SIZE: usize = 5;

/// Backing signers that ride in the creator's bundle
pub const FIRST_GROUP_BACKING_COUNT: usize = 4;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("max_bundle_size must be 1-5, got {0}")]
    InvalidBundleSize(usize),

    #[error("first_group_backing_count ({first}) must be below max_bundle_size ({max})")]
    FirstGroupTooLarge { first: usize, max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPlannerConfig {
    pub max_bundle_size: usize,
    pub first_group_backing_count: usize,
}

impl Default for GroupPlannerConfig {
    fn default() -> Self {
        Self {
            max_bundle_size: MAX_BUNDLE_SIZE,
            first_group_backing_count: FIRST_GROUP_BACKING_COUNT,
        }
    }
}

/// Signers assigned to one bundle, in submission order
#[derive(Debug, Clone)]
pub struct PlannedGroup<'a> {
    pub index: usize,
    pub members: Vec<&'a Signer>,
}

impl<'a> PlannedGroup<'a> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True for the group that carries the creator
    pub fn has_creator(&self) -> bool {
        self.members.iter().any(|s| s.is_creator())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupPlanner {
    config: GroupPlannerConfig,
}

impl GroupPlanner {
    pub fn new(config: GroupPlannerConfig) -> Result<Self, PlanError> {
        if config.max_bundle_size == 0 || config.max_bundle_size > MAX_BUNDLE_SIZE {
            return Err(PlanError::InvalidBundleSize(config.max_bundle_size));
        }
        if config.first_group_backing_count >= config.max_bundle_size {
            return Err(PlanError::FirstGroupTooLarge {
                first: config.first_group_backing_count,
                max: config.max_bundle_size,
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &GroupPlannerConfig {
        &self.config
    }

    /// Deterministic partition: sizes sum to 1 + backing.len()
    pub fn plan<'a>(&self, creator: &'a Signer, backing: &'a [Signer]) -> Vec<PlannedGroup<'a>> {
        let head = self.config.first_group_backing_count.min(backing.len());
        let (first, rest) = backing.split_at(head);

        let mut members = Vec::with_capacity(head + 1);
        members.push(creator);
        members.extend(first.iter());

        let mut groups = vec![PlannedGroup { index: 0, members }];
        for chunk in rest.chunks(self.config.max_bundle_size) {
            groups.push(PlannedGroup {
                index: groups.len(),
                members: chunk.iter().collect(),
            });
        }
        groups
    }

    pub fn plan_pool<'a>(&self, pool: &'a KeypairPool) -> Vec<PlannedGroup<'a>> {
        self.plan(pool.creator(), pool.backing())
    }
}
