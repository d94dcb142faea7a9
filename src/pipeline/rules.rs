//! Stage transition and engagement-point rules (pure, no DB).
//!
//! Every operation takes the current pipeline fields of a contact plus an
//! explicit `as_of` time and returns the fields to write back. Persisting the
//! result and appending the audit record is the caller's job.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::stage::Stage;

/// Point total at which an early-stage contact is promoted to warm prospect.
pub const WARM_PROSPECT_POINT_THRESHOLD: u32 = 3;

/// Stages eligible for automatic promotion when the threshold is reached.
pub const AUTO_PROMOTION_SOURCES: [Stage; 3] = [Stage::Lead, Stage::WarmLead, Stage::Prospect];

/// Days a contact may sit in warm prospect before it is flagged overdue.
pub const WARM_PROSPECT_OVERDUE_DAYS: i64 = 90;

/// Points awarded for completing a scheduled follow-up.
pub const FOLLOW_UP_COMPLETION_POINTS: u32 = 1;

/// The lifecycle-relevant fields of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    pub stage: Stage,
    pub engagement_points: u32,
    pub warm_prospect_started_at: Option<DateTime<Utc>>,
}

impl PipelineState {
    /// A freshly created contact: lead, zero points, no warm-prospect clock.
    pub fn new() -> Self {
        Self {
            stage: Stage::Lead,
            engagement_points: 0,
            warm_prospect_started_at: None,
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a successful point award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsOutcome {
    pub state: PipelineState,
    pub old_points: u32,
    pub new_points: u32,
    /// True when this award moved the contact to warm prospect.
    pub promoted: bool,
}

/// Result of a manual stage move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageChange {
    pub state: PipelineState,
    pub old_stage: Stage,
    pub new_stage: Stage,
}

/// Award `points_to_add` engagement points.
///
/// Returns `None` when `points_to_add < 1`; the caller's state is left as it
/// was. When the new total reaches [`WARM_PROSPECT_POINT_THRESHOLD`] and the
/// contact is in one of [`AUTO_PROMOTION_SOURCES`], the contact moves to
/// warm prospect and its warm-prospect clock starts at `as_of`.
pub fn add_points(
    state: &PipelineState,
    points_to_add: i64,
    as_of: DateTime<Utc>,
) -> Option<PointsOutcome> {
    if points_to_add < 1 {
        return None;
    }
    let increment = u32::try_from(points_to_add).unwrap_or(u32::MAX);
    Some(award(state, increment, as_of))
}

/// Apply an already validated award.
fn award(state: &PipelineState, increment: u32, as_of: DateTime<Utc>) -> PointsOutcome {
    let new_points = state.engagement_points.saturating_add(increment);

    let mut next = PipelineState {
        engagement_points: new_points,
        ..*state
    };

    let promoted = new_points >= WARM_PROSPECT_POINT_THRESHOLD
        && AUTO_PROMOTION_SOURCES.contains(&state.stage);
    if promoted {
        next.stage = Stage::WarmProspect;
        next.warm_prospect_started_at = Some(as_of);
    }

    PointsOutcome {
        state: next,
        old_points: state.engagement_points,
        new_points,
        promoted,
    }
}

/// Move the contact to `target`. Any direction is allowed.
///
/// Entering warm prospect always restarts the clock, including re-entry.
/// Leaving warm prospect keeps the old timestamp.
pub fn change_stage(state: &PipelineState, target: Stage, as_of: DateTime<Utc>) -> StageChange {
    let mut next = PipelineState {
        stage: target,
        ..*state
    };
    if target == Stage::WarmProspect {
        next.warm_prospect_started_at = Some(as_of);
    }

    StageChange {
        state: next,
        old_stage: state.stage,
        new_stage: target,
    }
}

/// Completing a follow-up is worth exactly one point.
pub fn on_follow_up_completed(state: &PipelineState, as_of: DateTime<Utc>) -> PointsOutcome {
    award(state, FOLLOW_UP_COMPLETION_POINTS, as_of)
}

/// True when a warm prospect has been waiting for at least
/// [`WARM_PROSPECT_OVERDUE_DAYS`]. Always false for other stages.
pub fn is_overdue(state: &PipelineState, as_of: DateTime<Utc>) -> bool {
    if state.stage != Stage::WarmProspect {
        return false;
    }
    match state.warm_prospect_started_at {
        Some(started) => as_of - started >= Duration::days(WARM_PROSPECT_OVERDUE_DAYS),
        None => false,
    }
}
