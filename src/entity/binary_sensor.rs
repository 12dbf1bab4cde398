// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Binary sensor entities: timer state and team member presence.

use crate::client::{PresenceEntry, ProjectRef};
use crate::controller::Snapshot;
use crate::entity::EntityState;
use serde_json::{Map, Value, json};

pub const TIMER_RUNNING: &str = "timer_running";
const TEAM_PREFIX: &str = "team_";

/// Timer running binary sensor with the details of the running timer as attributes.
pub fn timer_running_state(snapshot: Option<&Snapshot>) -> EntityState {
    let Some(snapshot) = snapshot else {
        return EntityState::unknown(TIMER_RUNNING);
    };

    let mut attributes = Map::new();
    if let Some(timer) = snapshot.timer() {
        attributes.insert("start_time".into(), timer.start_time.clone().into());
        attributes.insert("duration".into(), timer.duration.clone().into());
        attributes.insert("duration_seconds".into(), timer.duration_in_seconds.into());
        attributes.insert("note".into(), timer.note.clone().into());
        attributes.insert("date".into(), timer.date.to_string().into());
        if let Some(task) = &timer.task {
            attributes.insert("task".into(), task.name.clone().into());
            attributes.insert("task_id".into(), task.id.into());
        }
        if let Some(project) = &timer.project {
            if let ProjectRef::Object(p) = project {
                attributes.insert("project".into(), p.name.clone().into());
            }
            attributes.insert("project_id".into(), project.id().into());
        }
        if let Some(user) = &timer.user {
            attributes.insert("user_name".into(), user.name.clone().into());
            attributes.insert("user_id".into(), user.id.into());
        }
    }

    EntityState {
        entity_id: TIMER_RUNNING.into(),
        value: snapshot.timer_running().into(),
        unit: None,
        attributes,
    }
}

/// Presence binary sensors for all team members: on if the member has a running timer.
pub fn team_member_states(snapshot: &Snapshot) -> Vec<EntityState> {
    snapshot
        .presence()
        .iter()
        .filter(|p| p.user.id != 0 && !p.user.name.is_empty())
        .map(team_member_state)
        .collect()
}

/// Entity identifier of a team member presence sensor.
pub fn team_member_entity_id(user_id: u64) -> String {
    format!("{TEAM_PREFIX}{user_id}")
}

fn team_member_state(member: &PresenceEntry) -> EntityState {
    let user = &member.user;
    let mut attributes = Map::with_capacity(6);
    attributes.insert("user_id".into(), user.id.into());
    attributes.insert("user_name".into(), user.name.clone().into());
    attributes.insert(
        "absent_first_half_day".into(),
        member.absent_first_half_day.into(),
    );
    attributes.insert(
        "absent_second_half_day".into(),
        member.absent_second_half_day.into(),
    );
    let groups: Vec<&str> = user.groups.iter().map(|g| g.name()).collect();
    attributes.insert("groups".into(), json!(groups));
    attributes.insert("status".into(), user.status.clone().into());

    EntityState {
        entity_id: team_member_entity_id(user.id),
        value: Value::Bool(member.has_timer_running),
        unit: None,
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{GroupRef, NamedRef, Overview, Timer, User};
    use chrono::NaiveDate;

    fn snapshot(timer: Option<Timer>, presence: Vec<PresenceEntry>) -> Snapshot {
        Snapshot::new(timer, Overview::default(), presence, vec![], vec![])
    }

    #[test]
    fn timer_running_without_snapshot_is_unknown() {
        let state = timer_running_state(None);
        assert_eq!("timer_running", state.entity_id);
        assert_eq!(Value::Null, state.value);
    }

    #[test]
    fn timer_not_running_has_no_attributes() {
        let state = timer_running_state(Some(&snapshot(None, vec![])));
        assert_eq!(Value::Bool(false), state.value);
        assert!(state.attributes.is_empty());
    }

    #[test]
    fn timer_running_attributes() {
        let timer = Timer {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            start_time: "08:15".into(),
            duration: "00:10".into(),
            duration_in_seconds: 600,
            task: Some(NamedRef {
                id: 3,
                name: "Development".into(),
            }),
            project: Some(ProjectRef::Id(12)),
            ..Default::default()
        };

        let state = timer_running_state(Some(&snapshot(Some(timer), vec![])));

        assert_eq!(Value::Bool(true), state.value);
        let attributes = &state.attributes;
        assert_eq!(Some(&json!("2024-03-04")), attributes.get("date"));
        assert_eq!(Some(&json!(600)), attributes.get("duration_seconds"));
        assert_eq!(Some(&json!("Development")), attributes.get("task"));
        assert_eq!(Some(&json!(3)), attributes.get("task_id"));
        assert_eq!(Some(&json!(12)), attributes.get("project_id"));
        assert_eq!(None, attributes.get("project"));
        assert_eq!(Some(&Value::Null), attributes.get("note"));
        assert_eq!(None, attributes.get("user_id"));
    }

    #[test]
    fn team_member_presence() {
        let member = PresenceEntry {
            user: User {
                id: 5,
                name: "Ben".into(),
                status: Some("active".into()),
                groups: vec![
                    GroupRef::Name("Dev".into()),
                    GroupRef::Object(NamedRef {
                        id: 1,
                        name: "Ops".into(),
                    }),
                ],
            },
            absent_second_half_day: true,
            has_timer_running: true,
            ..Default::default()
        };
        let unnamed = PresenceEntry {
            user: User {
                id: 6,
                ..Default::default()
            },
            ..Default::default()
        };

        let states = team_member_states(&snapshot(None, vec![member, unnamed]));

        assert_eq!(1, states.len());
        let state = &states[0];
        assert_eq!("team_5", state.entity_id);
        assert_eq!(Value::Bool(true), state.value);
        assert_eq!(Some(&json!(["Dev", "Ops"])), state.attributes.get("groups"));
        assert_eq!(Some(&json!(true)), state.attributes.get("absent_second_half_day"));
        assert_eq!(Some(&json!("active")), state.attributes.get("status"));
    }
}
