// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Sensor entity specific logic.

use crate::client::Timer;
use crate::controller::Snapshot;
use crate::entity::EntityState;
use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde_json::{Map, Value, json};
use std::fmt::Display;
use strum::IntoEnumIterator;

const UNIT_SECONDS: &str = "s";
const UNIT_DAYS: &str = "d";

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum SensorKind {
    /// Overtime display string, e.g. `12:30`.
    Overtime,
    OvertimeSeconds,
    VacationRemaining,
    VacationRedeemed,
    /// Duration display string of the running timer.
    TimerDuration,
    TimerDurationSeconds,
    /// Start of the running timer as RFC 3339 timestamp.
    TimerStartTime,
    TimerProject,
    TimerTask,
    /// Number of team members with a running timer.
    TeamPresentCount,
}

impl SensorKind {
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            SensorKind::OvertimeSeconds | SensorKind::TimerDurationSeconds => Some(UNIT_SECONDS),
            SensorKind::VacationRemaining | SensorKind::VacationRedeemed => Some(UNIT_DAYS),
            _ => None,
        }
    }

    pub fn value<Tz>(&self, snapshot: &Snapshot, tz: &Tz) -> Value
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let overview = snapshot.overview();
        let timer = snapshot.timer();
        match self {
            SensorKind::Overtime => overview.overtime.as_str().into(),
            SensorKind::OvertimeSeconds => overview.overtime_in_seconds.into(),
            SensorKind::VacationRemaining => overview.vacation.remaining_days.into(),
            SensorKind::VacationRedeemed => overview.vacation.redeemed_days.into(),
            SensorKind::TimerDuration => timer.map(|t| t.duration.as_str()).into(),
            SensorKind::TimerDurationSeconds => timer.map(|t| t.duration_in_seconds).into(),
            SensorKind::TimerStartTime => timer
                .and_then(|t| timer_start_time(t, tz))
                .map(|start| start.to_rfc3339())
                .into(),
            SensorKind::TimerProject => timer
                .and_then(|t| t.project.as_ref())
                .map(|p| p.display_name())
                .into(),
            SensorKind::TimerTask => timer
                .and_then(|t| t.task.as_ref())
                .map(|t| t.name.as_str())
                .into(),
            SensorKind::TeamPresentCount => snapshot
                .presence()
                .iter()
                .filter(|p| p.has_timer_running)
                .count()
                .into(),
        }
    }

    pub fn attributes(&self, snapshot: &Snapshot) -> Map<String, Value> {
        let mut attributes = Map::new();
        match self {
            SensorKind::TimerDuration => {
                if let Some(timer) = snapshot.timer() {
                    attributes.insert("note".into(), timer.note.clone().into());
                    if let Some(user) = &timer.user {
                        attributes.insert("user_name".into(), user.name.clone().into());
                        attributes.insert("user_id".into(), user.id.into());
                    }
                }
            }
            SensorKind::TeamPresentCount => {
                let presence = snapshot.presence();
                let present: Vec<_> = presence
                    .iter()
                    .filter(|p| p.has_timer_running)
                    .map(|p| p.user.name.as_str())
                    .collect();
                let absent: Vec<_> = presence
                    .iter()
                    .filter(|p| p.is_absent())
                    .map(|p| p.user.name.as_str())
                    .collect();
                attributes.insert("present_users".into(), json!(present));
                attributes.insert("absent_users".into(), json!(absent));
                attributes.insert("total_users".into(), presence.len().into());
            }
            _ => {}
        }
        attributes
    }

    pub fn state<Tz>(&self, snapshot: Option<&Snapshot>, tz: &Tz) -> EntityState
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let Some(snapshot) = snapshot else {
            return EntityState {
                unit: self.unit(),
                ..EntityState::unknown(self.to_string())
            };
        };
        EntityState {
            entity_id: self.to_string(),
            value: self.value(snapshot, tz),
            unit: self.unit(),
            attributes: self.attributes(snapshot),
        }
    }
}

pub fn sensor_states<Tz>(snapshot: Option<&Snapshot>, tz: &Tz) -> Vec<EntityState>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    SensorKind::iter()
        .map(|kind| kind.state(snapshot, tz))
        .collect()
}

/// Start of a timer in the given time zone.
///
/// The API returns the local start date and an `HH:MM` start time. Returns `None` if the start
/// time is invalid or doesn't exist in the time zone.
pub fn timer_start_time<Tz: TimeZone>(timer: &Timer, tz: &Tz) -> Option<DateTime<Tz>> {
    let start = format!("{} {}", timer.date, timer.start_time);
    let start = NaiveDateTime::parse_from_str(&start, "%Y-%m-%d %H:%M").ok()?;
    tz.from_local_datetime(&start).earliest()
}
