use tracing::debug;

use crate::backend::SuggestedSlot;

/// Slot-selection sub-flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SchedulingState {
    #[default]
    Inactive,
    /// Never constructed with an empty list
    Offering(Vec<SuggestedSlot>),
}

/// Holds the current offer and turns a pick back into an utterance
#[derive(Debug, Default)]
pub struct SchedulingFlow {
    state: SchedulingState,
}

impl SchedulingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SchedulingState {
        &self.state
    }

    pub fn is_offering(&self) -> bool {
        matches!(self.state, SchedulingState::Offering(_))
    }

    /// Currently offered slots, empty when inactive
    pub fn slots(&self) -> &[SuggestedSlot] {
        match &self.state {
            SchedulingState::Offering(slots) => slots,
            SchedulingState::Inactive => &[],
        }
    }

    /// Replace the offer wholesale. An empty list leaves the state untouched.
    pub fn offer(&mut self, slots: Vec<SuggestedSlot>) -> bool {
        if slots.is_empty() {
            return false;
        }
        debug!(count = slots.len(), "offering slots");
        self.state = SchedulingState::Offering(slots);
        true
    }

    /// Consume the offer and produce the booking utterance for `slot`.
    ///
    /// Returns `None`, leaving the offer open, if `slot` is not part of it.
    pub fn select(&mut self, slot: &SuggestedSlot) -> Option<String> {
        if !self.slots().contains(slot) {
            debug!(date = %slot.date, time = %slot.time, "ignoring slot outside the offer");
            return None;
        }
        self.state = SchedulingState::Inactive;
        Some(Self::utterance_for(slot))
    }

    /// Select by position in the current offer
    pub fn select_index(&mut self, index: usize) -> Option<String> {
        let slot = self.slots().get(index).cloned()?;
        self.select(&slot)
    }

    /// Close the offer without choosing anything
    pub fn dismiss(&mut self) -> bool {
        let was_offering = self.is_offering();
        self.state = SchedulingState::Inactive;
        was_offering
    }

    pub fn utterance_for(slot: &SuggestedSlot) -> String {
        format!(
            "I would like to book the appointment on {} at {}",
            slot.date, slot.time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn slots(n: usize) -> Vec<SuggestedSlot> {
        (0..n)
            .map(|i| SuggestedSlot::new("2024-06-01", format!("1{}:00", i)))
            .collect()
    }

    #[test]
    fn test_offer_replaces() {
        let mut flow = SchedulingFlow::new();
        assert!(flow.offer(slots(3)));
        assert!(flow.offer(slots(1)));
        assert_eq!(flow.slots().len(), 1);
    }

    #[test]
    fn test_empty_offer_is_noop() {
        let mut flow = SchedulingFlow::new();
        assert!(!flow.offer(vec![]));
        assert_eq!(flow.state(), &SchedulingState::Inactive);

        flow.offer(slots(2));
        assert!(!flow.offer(vec![]));
        assert_eq!(flow.slots().len(), 2);
    }

    #[test]
    fn test_select_consumes_offer() {
        let mut flow = SchedulingFlow::new();
        flow.offer(slots(2));

        let utterance = flow.select(&SuggestedSlot::new("2024-06-01", "10:00"));
        assert_eq!(
            utterance.as_deref(),
            Some("I would like to book the appointment on 2024-06-01 at 10:00")
        );
        assert_eq!(flow.state(), &SchedulingState::Inactive);
    }

    #[test]
    fn test_select_when_inactive() {
        let mut flow = SchedulingFlow::new();
        assert!(flow.select(&SuggestedSlot::new("d", "t")).is_none());
        assert!(!flow.is_offering());
    }

    #[test]
    fn test_select_unoffered_slot_keeps_offer() {
        let mut flow = SchedulingFlow::new();
        flow.offer(slots(2));

        assert!(flow.select(&SuggestedSlot::new("1999-01-01", "03:00")).is_none());
        assert_eq!(flow.slots(), slots(2).as_slice());
    }

    #[test]
    fn test_select_index() {
        let mut flow = SchedulingFlow::new();
        flow.offer(slots(2));
        assert!(flow.select_index(5).is_none());
        assert!(flow.is_offering());

        let utterance = flow.select_index(1).unwrap();
        assert!(utterance.ends_with("at 11:00"));
        assert!(!flow.is_offering());
    }

    #[test]
    fn test_dismiss() {
        let mut flow = SchedulingFlow::new();
        assert!(!flow.dismiss());
        flow.offer(slots(1));
        assert!(flow.dismiss());
        assert!(flow.slots().is_empty());
    }
}
