// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Button entity specific logic.

use crate::controller::Snapshot;
use serde::Serialize;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ButtonKind {
    StartTimer,
    StopTimer,
    CancelTimer,
    Refresh,
}

impl ButtonKind {
    /// Buttons are only available with data. Start is available if no timer is running, stop and
    /// cancel only with a running timer.
    pub fn is_available(&self, snapshot: Option<&Snapshot>) -> bool {
        let Some(snapshot) = snapshot else {
            return false;
        };
        match self {
            ButtonKind::StartTimer => !snapshot.timer_running(),
            ButtonKind::StopTimer | ButtonKind::CancelTimer => snapshot.timer_running(),
            ButtonKind::Refresh => true,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ButtonState {
    pub entity_id: ButtonKind,
    pub available: bool,
}

pub fn button_states(snapshot: Option<&Snapshot>) -> Vec<ButtonState> {
    use strum::IntoEnumIterator;

    ButtonKind::iter()
        .map(|kind| ButtonState {
            entity_id: kind,
            available: kind.is_available(snapshot),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Overview, Timer};
    use rstest::rstest;
    use std::str::FromStr;

    fn snapshot(timer_running: bool) -> Snapshot {
        let timer = timer_running.then(Timer::default);
        Snapshot::new(timer, Overview::default(), vec![], vec![], vec![])
    }

    #[rstest]
    #[case(ButtonKind::StartTimer, true, false)]
    #[case(ButtonKind::StartTimer, false, true)]
    #[case(ButtonKind::StopTimer, true, true)]
    #[case(ButtonKind::StopTimer, false, false)]
    #[case(ButtonKind::CancelTimer, true, true)]
    #[case(ButtonKind::CancelTimer, false, false)]
    #[case(ButtonKind::Refresh, true, true)]
    #[case(ButtonKind::Refresh, false, true)]
    fn availability_follows_timer(
        #[case] kind: ButtonKind,
        #[case] timer_running: bool,
        #[case] available: bool,
    ) {
        assert_eq!(available, kind.is_available(Some(&snapshot(timer_running))));
    }

    #[rstest]
    #[case(ButtonKind::StartTimer)]
    #[case(ButtonKind::StopTimer)]
    #[case(ButtonKind::CancelTimer)]
    #[case(ButtonKind::Refresh)]
    fn unavailable_without_data(#[case] kind: ButtonKind) {
        assert!(!kind.is_available(None));
    }

    #[test]
    fn button_key() {
        assert_eq!(Ok(ButtonKind::CancelTimer), ButtonKind::from_str("cancel_timer"));
        assert_eq!("start_timer", ButtonKind::StartTimer.to_string());
        assert!(ButtonKind::from_str("pause_timer").is_err());
    }

    #[test]
    fn button_states_serialize_keys() {
        let states = button_states(Some(&snapshot(false)));
        assert_eq!(4, states.len());
        assert_eq!(
            serde_json::json!({ "entity_id": "start_timer", "available": true }),
            serde_json::to_value(&states[0]).unwrap()
        );
    }
}
