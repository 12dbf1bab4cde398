// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Entity projection of a [`Snapshot`]: sensor, binary sensor and button states.

mod binary_sensor;
mod button;
mod sensor;

pub use binary_sensor::*;
pub use button::*;
pub use sensor::*;

use crate::controller::Snapshot;
use chrono::TimeZone;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Display;

/// Projected state of a single entity.
///
/// The value is `null` if no snapshot is available yet or the snapshot doesn't contain the data,
/// e.g. timer sensors without a running timer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityState {
    pub entity_id: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    pub(crate) fn unknown(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            value: Value::Null,
            unit: None,
            attributes: Map::new(),
        }
    }
}

/// All projected sensor states of a snapshot.
#[derive(Debug, Serialize)]
pub struct EntityStates {
    pub sensors: Vec<EntityState>,
    pub binary_sensors: Vec<EntityState>,
    /// One presence sensor per team member of the snapshot.
    pub team: Vec<EntityState>,
}

/// Project all sensor entities of a snapshot. Timestamps are converted into the given time zone.
pub fn project_entities<Tz>(snapshot: Option<&Snapshot>, tz: &Tz) -> EntityStates
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    EntityStates {
        sensors: sensor_states(snapshot, tz),
        binary_sensors: vec![timer_running_state(snapshot)],
        team: snapshot.map(team_member_states).unwrap_or_default(),
    }
}
