//! Escrow milestone reconciliation
//!
//! An escrow locks `total_amount` for a deal and pays it out milestone by
//! milestone. `released_amount` and `status` are aggregates derived from the
//! milestone list; this module keeps them consistent:
//! - `validate_release` guards a release request before it reaches the chain
//! - `apply_release` records a confirmed release on a snapshot
//! - `reconcile` recomputes the aggregates from scratch to repair drift
//!
//! Every operation takes a snapshot and returns a new one. Callers persist the
//! result with their own optimistic-concurrency check.

use crate::error::EscrowError;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowStatus {
    Active,
    Completed,
    Disputed,
    Cancelled,
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EscrowStatus::Active => "ACTIVE",
            EscrowStatus::Completed => "COMPLETED",
            EscrowStatus::Disputed => "DISPUTED",
            EscrowStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Stable index matching the on-chain release event log
    pub index: u32,
    pub amount: u128,
    pub released: bool,
    pub released_at: Option<DateTime<Utc>>,
}

impl Milestone {
    pub fn new(index: u32, amount: u128) -> Self {
        Self {
            index,
            amount,
            released: false,
            released_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    pub id: String,
    pub total_amount: u128,
    pub released_amount: u128,
    pub status: EscrowStatus,
    pub milestones: Vec<Milestone>,
}

impl Escrow {
    /// New active escrow with milestones indexed `0..amounts.len()`
    pub fn new(id: impl Into<String>, total_amount: u128, amounts: &[u128]) -> Result<Self, EscrowError> {
        let milestones = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| Milestone::new(i as u32, *amount))
            .collect();
        Self::with_milestones(id, total_amount, milestones)
    }

    /// New active escrow from explicit milestones.
    ///
    /// Milestone amounts must add up to `total_amount` exactly, and indices must
    /// be unique.
    pub fn with_milestones(
        id: impl Into<String>,
        total_amount: u128,
        milestones: Vec<Milestone>,
    ) -> Result<Self, EscrowError> {
        if milestones.is_empty() {
            return Err(EscrowError::NoMilestones);
        }

        let mut seen = HashSet::new();
        let mut sum: u128 = 0;
        for milestone in &milestones {
            if !seen.insert(milestone.index) {
                return Err(EscrowError::DuplicateMilestone(milestone.index));
            }
            sum = sum.checked_add(milestone.amount).ok_or(EscrowError::Overflow)?;
        }
        if sum != total_amount {
            return Err(EscrowError::MilestoneSumMismatch {
                sum,
                total: total_amount,
            });
        }

        let escrow = Escrow {
            id: id.into(),
            total_amount,
            released_amount: 0,
            status: EscrowStatus::Active,
            milestones,
        };
        // Milestones handed in pre-released still need consistent aggregates
        EscrowReconciler::reconcile(&escrow)
    }

    pub fn milestone(&self, index: u32) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.index == index)
    }

    /// Funds still locked in the escrow
    pub fn available_to_release(&self) -> u128 {
        self.total_amount.saturating_sub(self.released_amount)
    }

    /// True when there is at least one milestone and all are released
    pub fn all_released(&self) -> bool {
        !self.milestones.is_empty() && self.milestones.iter().all(|m| m.released)
    }

    fn derived_released_amount(&self) -> u128 {
        self.milestones
            .iter()
            .filter(|m| m.released)
            .fold(0u128, |acc, m| acc.saturating_add(m.amount))
    }
}

/// Stored aggregates that disagree with the milestone list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowDrift {
    pub escrow_id: String,
    pub stored_released_amount: u128,
    pub derived_released_amount: u128,
    pub stored_status: EscrowStatus,
    pub derived_status: EscrowStatus,
}

pub struct EscrowReconciler;

impl EscrowReconciler {
    /// Check a release request; returns the milestone amount the chain writer
    /// should expect to move.
    pub fn validate_release(escrow: &Escrow, milestone_index: u32) -> Result<u128, EscrowError> {
        let milestone = escrow.milestone(milestone_index).ok_or_else(|| {
            warn!("escrow {}: release of unknown milestone {}", escrow.id, milestone_index);
            EscrowError::MilestoneNotFound(milestone_index)
        })?;

        if milestone.released {
            warn!("escrow {}: milestone {} already released", escrow.id, milestone_index);
            return Err(EscrowError::AlreadyReleased(milestone_index));
        }

        if escrow.status != EscrowStatus::Active {
            warn!(
                "escrow {}: release of milestone {} while {}",
                escrow.id, milestone_index, escrow.status
            );
            return Err(EscrowError::EscrowNotActive(escrow.status));
        }

        Ok(milestone.amount)
    }

    /// Record a release confirmed by the caller.
    ///
    /// Does not re-validate: call `validate_release` first. Releasing an
    /// unknown milestone leaves the snapshot unchanged, and an existing
    /// `released_at` is never overwritten. Status only ever moves from Active
    /// to Completed here.
    pub fn apply_release(escrow: &Escrow, milestone_index: u32, released_at: DateTime<Utc>) -> Escrow {
        let mut updated = escrow.clone();

        match updated.milestones.iter_mut().find(|m| m.index == milestone_index) {
            Some(milestone) => {
                milestone.released = true;
                milestone.released_at.get_or_insert(released_at);
            }
            None => {
                warn!("escrow {}: apply_release for unknown milestone {}", escrow.id, milestone_index);
                return updated;
            }
        }

        updated.released_amount = updated.derived_released_amount();
        if updated.status == EscrowStatus::Active && updated.all_released() {
            updated.status = EscrowStatus::Completed;
        }
        updated
    }

    /// Recompute `released_amount` and `status` from the milestone list.
    ///
    /// Idempotent. A stored Completed with unreleased milestones is repaired to
    /// Active; Disputed and Cancelled overrides are kept.
    pub fn reconcile(escrow: &Escrow) -> Result<Escrow, EscrowError> {
        let (released_amount, status) = Self::derive(escrow)?;
        if released_amount != escrow.released_amount || status != escrow.status {
            info!(
                "escrow {}: reconciled released {} -> {}, status {} -> {}",
                escrow.id, escrow.released_amount, released_amount, escrow.status, status
            );
        }

        Ok(Escrow {
            released_amount,
            status,
            ..escrow.clone()
        })
    }

    /// Report stored aggregates that `reconcile` would change, without changing them
    pub fn detect_drift(escrow: &Escrow) -> Result<Option<EscrowDrift>, EscrowError> {
        let (released_amount, status) = Self::derive(escrow)?;
        if released_amount == escrow.released_amount && status == escrow.status {
            return Ok(None);
        }
        Ok(Some(EscrowDrift {
            escrow_id: escrow.id.clone(),
            stored_released_amount: escrow.released_amount,
            derived_released_amount: released_amount,
            stored_status: escrow.status,
            derived_status: status,
        }))
    }

    /// Explicit status change requested by an operator or dispute process.
    ///
    /// Allowed: Active -> Disputed, Active -> Cancelled, Disputed -> Active.
    /// Completion only happens through releases.
    pub fn transition(escrow: &Escrow, target: EscrowStatus) -> Result<Escrow, EscrowError> {
        let allowed = matches!(
            (escrow.status, target),
            (EscrowStatus::Active, EscrowStatus::Disputed)
                | (EscrowStatus::Active, EscrowStatus::Cancelled)
                | (EscrowStatus::Disputed, EscrowStatus::Active)
        );
        if !allowed {
            return Err(EscrowError::InvalidTransition {
                from: escrow.status,
                to: target,
            });
        }

        let moved = Escrow {
            status: target,
            ..escrow.clone()
        };
        // A dispute resolved after every milestone was paid lands on Completed
        Self::reconcile(&moved)
    }

    fn derive(escrow: &Escrow) -> Result<(u128, EscrowStatus), EscrowError> {
        let released_amount = escrow.derived_released_amount();
        if released_amount > escrow.total_amount {
            return Err(EscrowError::ReleasedExceedsTotal {
                released: released_amount,
                total: escrow.total_amount,
            });
        }
        Ok((released_amount, Self::derive_status(escrow)))
    }

    fn derive_status(escrow: &Escrow) -> EscrowStatus {
        match escrow.status {
            EscrowStatus::Disputed | EscrowStatus::Cancelled => escrow.status,
            EscrowStatus::Active | EscrowStatus::Completed => {
                if escrow.all_released() {
                    EscrowStatus::Completed
                } else {
                    EscrowStatus::Active
                }
            }
        }
    }
}
