use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::models::{Jamaah, PrayerLog, PrayerStatus, PrayerType};

/// Explicit states of the multi-step log submission flow. The machine is
/// independent of any rendering concern; the CLI (or any other front end)
/// drives it with events and reads the state back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    SelectingStatus,
    SelectingJamaah,
    ShowingReward,
    SelectingFridaySunnah,
    Committed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    ChooseStatus(PrayerStatus),
    ChooseJamaah(bool),
    AcknowledgeReward,
    ToggleFridayItem(String),
    ConfirmChecklist,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("event {event:?} is not valid in state {state:?}")]
    InvalidTransition { state: FlowState, event: FlowEvent },
    #[error("flow has not been committed yet")]
    NotCommitted,
}

/// One in-flight log submission: status choice, optional congregation
/// choice, reward reveal, optional Friday checklist, commit.
#[derive(Debug, Clone)]
pub struct LogFlow {
    date: NaiveDate,
    prayer: PrayerType,
    state: FlowState,
    status: Option<PrayerStatus>,
    jamaah: Jamaah,
    friday_items: BTreeSet<String>,
}

impl LogFlow {
    pub fn new(date: NaiveDate, prayer: PrayerType) -> Self {
        Self {
            date,
            prayer,
            state: FlowState::SelectingStatus,
            status: None,
            jamaah: Jamaah::Absent,
            friday_items: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn status(&self) -> Option<PrayerStatus> {
        self.status
    }

    pub fn jamaah(&self) -> Jamaah {
        self.jamaah
    }

    /// The Friday checklist only opens for an on-time Dhuhr in
    /// congregation on an actual Friday.
    fn friday_checklist_applies(&self) -> bool {
        self.date.weekday() == Weekday::Fri
            && self.prayer == PrayerType::Dhuhr
            && self.status == Some(PrayerStatus::OnTime)
            && self.jamaah == Jamaah::Yes
    }

    pub fn on_event(&mut self, event: FlowEvent) -> Result<FlowState, FlowError> {
        let next = match (self.state, &event) {
            (FlowState::SelectingStatus, FlowEvent::ChooseStatus(status)) => {
                self.status = Some(*status);
                if *status == PrayerStatus::OnTime {
                    FlowState::SelectingJamaah
                } else {
                    // congregation is meaningless off time; store Absent
                    self.jamaah = Jamaah::Absent;
                    FlowState::ShowingReward
                }
            }
            (FlowState::SelectingJamaah, FlowEvent::ChooseJamaah(yes)) => {
                self.jamaah = if *yes { Jamaah::Yes } else { Jamaah::No };
                FlowState::ShowingReward
            }
            (FlowState::ShowingReward, FlowEvent::AcknowledgeReward) => {
                if self.friday_checklist_applies() {
                    FlowState::SelectingFridaySunnah
                } else {
                    FlowState::Committed
                }
            }
            (FlowState::SelectingFridaySunnah, FlowEvent::ToggleFridayItem(item)) => {
                if !self.friday_items.remove(item) {
                    self.friday_items.insert(item.clone());
                }
                FlowState::SelectingFridaySunnah
            }
            (FlowState::SelectingFridaySunnah, FlowEvent::ConfirmChecklist) => FlowState::Committed,
            (state, _) => {
                return Err(FlowError::InvalidTransition { state, event });
            }
        };
        self.state = next;
        Ok(next)
    }

    /// The validated draft log. Only available once the machine reached
    /// `Committed`.
    pub fn into_log(self, logged_at: DateTime<Utc>) -> Result<PrayerLog, FlowError> {
        if self.state != FlowState::Committed {
            return Err(FlowError::NotCommitted);
        }
        let status = self.status.ok_or(FlowError::NotCommitted)?;
        Ok(PrayerLog {
            id: None,
            date: self.date,
            prayer: self.prayer,
            status,
            jamaah: self.jamaah,
            friday_sunnah: self.friday_items.into_iter().collect(),
            logged_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-06-06 is a Friday
    fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 6).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn off_time_status_skips_jamaah_selection() {
        let mut flow = LogFlow::new(monday(), PrayerType::Asr);
        let state = flow
            .on_event(FlowEvent::ChooseStatus(PrayerStatus::Missed))
            .unwrap();
        assert_eq!(state, FlowState::ShowingReward);
        assert_eq!(flow.jamaah(), Jamaah::Absent);

        flow.on_event(FlowEvent::AcknowledgeReward).unwrap();
        let log = flow.into_log(Utc::now()).unwrap();
        assert_eq!(log.status, PrayerStatus::Missed);
        assert!(log.friday_sunnah.is_empty());
    }

    #[test]
    fn on_time_goes_through_jamaah() {
        let mut flow = LogFlow::new(monday(), PrayerType::Fajr);
        flow.on_event(FlowEvent::ChooseStatus(PrayerStatus::OnTime))
            .unwrap();
        assert_eq!(flow.state(), FlowState::SelectingJamaah);
        flow.on_event(FlowEvent::ChooseJamaah(true)).unwrap();
        assert_eq!(flow.state(), FlowState::ShowingReward);
        // not a Friday Dhuhr, so acknowledging commits directly
        let state = flow.on_event(FlowEvent::AcknowledgeReward).unwrap();
        assert_eq!(state, FlowState::Committed);
    }

    #[test]
    fn friday_dhuhr_in_jamaah_opens_checklist() {
        let mut flow = LogFlow::new(friday(), PrayerType::Dhuhr);
        flow.on_event(FlowEvent::ChooseStatus(PrayerStatus::OnTime))
            .unwrap();
        flow.on_event(FlowEvent::ChooseJamaah(true)).unwrap();
        let state = flow.on_event(FlowEvent::AcknowledgeReward).unwrap();
        assert_eq!(state, FlowState::SelectingFridaySunnah);

        flow.on_event(FlowEvent::ToggleFridayItem("ghusl".into()))
            .unwrap();
        flow.on_event(FlowEvent::ToggleFridayItem("surah_kahf".into()))
            .unwrap();
        // toggling twice removes
        flow.on_event(FlowEvent::ToggleFridayItem("ghusl".into()))
            .unwrap();
        flow.on_event(FlowEvent::ConfirmChecklist).unwrap();

        let log = flow.into_log(Utc::now()).unwrap();
        assert_eq!(log.friday_sunnah, vec!["surah_kahf".to_string()]);
    }

    #[test]
    fn friday_dhuhr_alone_gets_no_checklist() {
        let mut flow = LogFlow::new(friday(), PrayerType::Dhuhr);
        flow.on_event(FlowEvent::ChooseStatus(PrayerStatus::OnTime))
            .unwrap();
        flow.on_event(FlowEvent::ChooseJamaah(false)).unwrap();
        let state = flow.on_event(FlowEvent::AcknowledgeReward).unwrap();
        assert_eq!(state, FlowState::Committed);
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let mut flow = LogFlow::new(monday(), PrayerType::Fajr);
        let err = flow.on_event(FlowEvent::ChooseJamaah(true)).unwrap_err();
        assert!(matches!(err, FlowError::InvalidTransition { .. }));
        // state unchanged after the rejected event
        assert_eq!(flow.state(), FlowState::SelectingStatus);
    }

    #[test]
    fn uncommitted_flow_yields_no_log() {
        let flow = LogFlow::new(monday(), PrayerType::Fajr);
        assert_eq!(flow.into_log(Utc::now()).unwrap_err(), FlowError::NotCommitted);
    }
}
