//! Per-stage result slot with last-request-wins sequencing.

use gcmp_core::EngineError;
use serde::Serialize;

/// The three independent data-fetch stages of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Stores,
    Search,
    Comparison,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Stores => write!(f, "stores"),
            Stage::Search => write!(f, "search"),
            Stage::Comparison => write!(f, "comparison"),
        }
    }
}

/// Identifies one issued request. Only the ticket with the latest sequence
/// number for its stage may settle that stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    stage: Stage,
    seq: u64,
}

impl Ticket {
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What happened to a result when it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The result was the latest for its stage and is now visible.
    Applied,
    /// A newer request was issued first; the result was dropped.
    Superseded,
}

/// Borrowed view of a slot.
#[derive(Debug, PartialEq)]
pub enum StageStatus<'a, T> {
    NotStarted,
    InProgress,
    Settled(&'a T),
    Failed(&'a EngineError),
}

/// Payload-free form of [`StageStatus`] for owned views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    NotStarted,
    InProgress,
    Settled,
    Failed,
}

/// Owned snapshot of a slot. `value` is the last successfully settled result,
/// which stays visible while a newer request is in flight or after it fails.
#[derive(Debug, Clone, PartialEq)]
pub struct StageView<T> {
    pub state: StageState,
    pub value: Option<T>,
    pub error: Option<EngineError>,
}

#[derive(Debug, Clone)]
pub struct StageSlot<T> {
    stage: Stage,
    latest_seq: u64,
    pending: bool,
    value: Option<T>,
    error: Option<EngineError>,
}

impl<T> StageSlot<T> {
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            latest_seq: 0,
            pending: false,
            value: None,
            error: None,
        }
    }

    /// Issues a new request, superseding any request still in flight.
    pub fn begin(&mut self) -> Ticket {
        self.latest_seq += 1;
        self.pending = true;
        self.error = None;
        tracing::debug!(stage = %self.stage, seq = self.latest_seq, "request issued");
        Ticket {
            stage: self.stage,
            seq: self.latest_seq,
        }
    }

    /// Whether `ticket` is the newest outstanding request for this slot.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.pending && ticket.stage == self.stage && ticket.seq == self.latest_seq
    }

    /// Records the outcome of `ticket`'s request.
    ///
    /// Stale tickets are ignored. On failure the previously settled value is
    /// kept and the error recorded alongside it.
    pub fn settle(&mut self, ticket: Ticket, result: Result<T, EngineError>) -> Settlement {
        if !self.is_current(ticket) {
            tracing::debug!(
                stage = %self.stage,
                seq = ticket.seq,
                latest_seq = self.latest_seq,
                "discarding stale result"
            );
            return Settlement::Superseded;
        }

        self.pending = false;
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            Err(err) => {
                tracing::debug!(stage = %self.stage, seq = ticket.seq, error = %err, "request failed");
                self.error = Some(err);
            }
        }
        Settlement::Applied
    }

    /// Drops the value and error, and invalidates any in-flight ticket.
    pub fn clear(&mut self) {
        self.latest_seq += 1;
        self.pending = false;
        self.value = None;
        self.error = None;
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&EngineError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> StageStatus<'_, T> {
        if self.pending {
            StageStatus::InProgress
        } else if let Some(err) = &self.error {
            StageStatus::Failed(err)
        } else if let Some(value) = &self.value {
            StageStatus::Settled(value)
        } else {
            StageStatus::NotStarted
        }
    }

    #[must_use]
    pub fn state(&self) -> StageState {
        match self.status() {
            StageStatus::NotStarted => StageState::NotStarted,
            StageStatus::InProgress => StageState::InProgress,
            StageStatus::Settled(_) => StageState::Settled,
            StageStatus::Failed(_) => StageState::Failed,
        }
    }
}

impl<T: Clone> StageSlot<T> {
    #[must_use]
    pub fn view(&self) -> StageView<T> {
        StageView {
            state: self.state(),
            value: self.value.clone(),
            error: self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_slot_is_not_started() {
        let slot: StageSlot<u32> = StageSlot::new(Stage::Stores);
        assert_eq!(slot.status(), StageStatus::NotStarted);
    }

    #[test]
    fn begin_marks_in_progress() {
        let mut slot: StageSlot<u32> = StageSlot::new(Stage::Stores);
        let ticket = slot.begin();
        assert_eq!(ticket.seq(), 1);
        assert_eq!(slot.status(), StageStatus::InProgress);
    }

    #[test]
    fn settle_applies_current_ticket() {
        let mut slot = StageSlot::new(Stage::Search);
        let ticket = slot.begin();
        assert_eq!(slot.settle(ticket, Ok(7)), Settlement::Applied);
        assert_eq!(slot.status(), StageStatus::Settled(&7));
    }

    #[test]
    fn later_request_wins_when_earlier_resolves_last() {
        let mut slot = StageSlot::new(Stage::Stores);
        let r1 = slot.begin();
        let r2 = slot.begin();

        assert_eq!(slot.settle(r2, Ok("second")), Settlement::Applied);
        assert_eq!(slot.settle(r1, Ok("first")), Settlement::Superseded);
        assert_eq!(slot.value(), Some(&"second"));
    }

    #[test]
    fn stale_result_does_not_end_newer_request() {
        let mut slot = StageSlot::new(Stage::Stores);
        let r1 = slot.begin();
        let _r2 = slot.begin();

        assert_eq!(slot.settle(r1, Ok(1)), Settlement::Superseded);
        assert_eq!(slot.status(), StageStatus::InProgress);
    }

    #[test]
    fn failure_keeps_prior_value() {
        let mut slot = StageSlot::new(Stage::Comparison);
        let first = slot.begin();
        slot.settle(first, Ok(10));

        let second = slot.begin();
        let err = EngineError::ServiceUnavailable("timeout".to_string());
        assert_eq!(slot.settle(second, Err(err.clone())), Settlement::Applied);

        assert_eq!(slot.status(), StageStatus::Failed(&err));
        assert_eq!(slot.value(), Some(&10));
    }

    #[test]
    fn failure_without_prior_value_has_no_value() {
        let mut slot: StageSlot<u32> = StageSlot::new(Stage::Search);
        let ticket = slot.begin();
        slot.settle(ticket, Err(EngineError::InvalidQuery));
        assert_eq!(slot.state(), StageState::Failed);
        assert!(slot.value().is_none());
    }

    #[test]
    fn begin_clears_previous_error() {
        let mut slot: StageSlot<u32> = StageSlot::new(Stage::Search);
        let ticket = slot.begin();
        slot.settle(ticket, Err(EngineError::InvalidQuery));
        slot.begin();
        assert!(slot.error().is_none());
        assert_eq!(slot.state(), StageState::InProgress);
    }

    #[test]
    fn clear_invalidates_in_flight_ticket() {
        let mut slot = StageSlot::new(Stage::Stores);
        let ticket = slot.begin();
        slot.clear();
        assert_eq!(slot.settle(ticket, Ok(1)), Settlement::Superseded);
        assert_eq!(slot.status(), StageStatus::NotStarted);
    }

    #[test]
    fn ticket_from_other_stage_is_rejected() {
        let mut stores: StageSlot<u32> = StageSlot::new(Stage::Stores);
        let mut search: StageSlot<u32> = StageSlot::new(Stage::Search);
        let search_ticket = search.begin();
        stores.begin();
        assert_eq!(stores.settle(search_ticket, Ok(1)), Settlement::Superseded);
    }

    #[test]
    fn view_clones_value_and_error() {
        let mut slot = StageSlot::new(Stage::Stores);
        let t = slot.begin();
        slot.settle(t, Ok(vec![1, 2]));
        let view = slot.view();
        assert_eq!(view.state, StageState::Settled);
        assert_eq!(view.value, Some(vec![1, 2]));
        assert!(view.error.is_none());
    }
}
