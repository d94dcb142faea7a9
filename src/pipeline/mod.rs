//! Pipeline stages and engagement scoring.
//!
//! `stage` defines the closed six-step funnel; `rules` computes the effect of
//! point awards, manual stage moves and follow-up completion on a contact's
//! pipeline fields. Everything here is pure: callers persist the returned
//! state and append the audit record.

pub mod rules;
pub mod stage;

pub use rules::{
    add_points, change_stage, is_overdue, on_follow_up_completed, PipelineState,
    PointsOutcome, StageChange, AUTO_PROMOTION_SOURCES, FOLLOW_UP_COMPLETION_POINTS,
    WARM_PROSPECT_OVERDUE_DAYS, WARM_PROSPECT_POINT_THRESHOLD,
};
pub use stage::Stage;
