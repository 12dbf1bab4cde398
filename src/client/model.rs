// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Hakuna REST API data structure definitions for JSON serialization & deserialization.
//!
//! All records are decoded once at the client boundary. Missing fields and explicit `null` values
//! of non-optional fields are defaulted and unknown fields are ignored, so the rest of the application never has to check for the presence
//! of a key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

/// Reference to another object with an id and a name, e.g. the task or user of a timer.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NamedRef {
    #[serde_as(as = "DefaultOnNull")]
    pub id: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
}

/// A project is either returned as object or only as raw project id.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ProjectRef {
    Object(NamedRef),
    Id(u64),
}

impl ProjectRef {
    pub fn id(&self) -> u64 {
        match self {
            ProjectRef::Object(p) => p.id,
            ProjectRef::Id(id) => *id,
        }
    }

    /// Project name, or the project id as text if only the id is known.
    pub fn display_name(&self) -> String {
        match self {
            ProjectRef::Object(p) => p.name.clone(),
            ProjectRef::Id(id) => id.to_string(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ProjectRef::Object(p) => Some(&p.name),
            ProjectRef::Id(_) => None,
        }
    }
}

/// A user group is either a plain group name or a group object.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GroupRef {
    Name(String),
    Object(NamedRef),
}

impl GroupRef {
    pub fn name(&self) -> &str {
        match self {
            GroupRef::Name(name) => name,
            GroupRef::Object(group) => &group.name,
        }
    }
}

/// Running timer: `GET /timer`.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Timer {
    #[serde_as(as = "DefaultOnNull")]
    pub date: NaiveDate,
    /// Start time in `HH:MM` format.
    #[serde_as(as = "DefaultOnNull")]
    pub start_time: String,
    /// Duration display string in `HH:MM` format.
    #[serde_as(as = "DefaultOnNull")]
    pub duration: String,
    #[serde_as(as = "DefaultOnNull")]
    pub duration_in_seconds: i64,
    pub note: Option<String>,
    pub user: Option<NamedRef>,
    pub task: Option<NamedRef>,
    pub project: Option<ProjectRef>,
}

/// Request body of `POST /timer`.
#[derive(Debug, Default, PartialEq, Serialize)]
pub(crate) struct StartTimerMsg<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'a str>,
}

impl StartTimerMsg<'_> {
    pub fn is_empty(&self) -> bool {
        self.task_id.is_none() && self.project_id.is_none() && self.note.is_none()
    }
}

/// Overtime and vacation overview: `GET /overview`.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Overview {
    /// Overtime display string in `HH:MM` format.
    #[serde_as(as = "DefaultOnNull")]
    pub overtime: String,
    #[serde_as(as = "DefaultOnNull")]
    pub overtime_in_seconds: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub vacation: Vacation,
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Vacation {
    #[serde_as(as = "DefaultOnNull")]
    pub redeemed_days: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub remaining_days: f64,
}

/// User as returned in `GET /users` and `GET /presence`.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct User {
    #[serde_as(as = "DefaultOnNull")]
    pub id: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    pub status: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    pub groups: Vec<GroupRef>,
}

/// Today's presence of a team member: `GET /presence`.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PresenceEntry {
    #[serde_as(as = "DefaultOnNull")]
    pub user: User,
    #[serde_as(as = "DefaultOnNull")]
    pub absent_first_half_day: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub absent_second_half_day: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub has_timer_running: bool,
}

impl PresenceEntry {
    /// Absent for at least half a day.
    pub fn is_absent(&self) -> bool {
        self.absent_first_half_day || self.absent_second_half_day
    }
}

/// `GET /tasks`
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Task {
    #[serde_as(as = "DefaultOnNull")]
    pub id: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub default: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub archived: bool,
}

/// `GET /projects`
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Project {
    #[serde_as(as = "DefaultOnNull")]
    pub id: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub archived: bool,
}

/// `GET /time_entries` and `GET /time_entries/{id}`, also returned when stopping a timer.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeEntry {
    #[serde_as(as = "DefaultOnNull")]
    pub id: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub date: NaiveDate,
    #[serde_as(as = "DefaultOnNull")]
    pub start_time: String,
    pub end_time: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    pub duration: String,
    #[serde_as(as = "DefaultOnNull")]
    pub duration_in_seconds: i64,
    pub note: Option<String>,
    pub user: Option<NamedRef>,
    pub task: Option<NamedRef>,
    pub project: Option<ProjectRef>,
}

/// `GET /absences`
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Absence {
    #[serde_as(as = "DefaultOnNull")]
    pub id: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub start_date: NaiveDate,
    #[serde_as(as = "DefaultOnNull")]
    pub end_date: NaiveDate,
    #[serde_as(as = "DefaultOnNull")]
    pub first_half_day: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub second_half_day: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub is_recurring: bool,
    pub weekly_repeating_interval: Option<u32>,
    pub user: Option<NamedRef>,
    pub absence_type: Option<AbsenceType>,
}

/// `GET /absence_types`
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AbsenceType {
    #[serde_as(as = "DefaultOnNull")]
    pub id: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub grants_work_time: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub is_illness: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub is_vacation: bool,
}

/// `GET /company`
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Company {
    #[serde_as(as = "DefaultOnNull")]
    pub company_name: String,
    pub duration_format: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    pub absence_requests_enabled: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub projects_enabled: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub groups_enabled: bool,
}

/// `GET /ping`
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Pong {
    pub pong: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timer_with_project_object() {
        let timer: Timer = serde_json::from_value(json!({
            "date": "2016-11-08",
            "start_time": "19:00",
            "duration": "02:16",
            "duration_in_seconds": 8138,
            "note": "Did a lot of work.",
            "user": { "id": 1, "name": "Hans Muster", "status": "active" },
            "task": { "id": 2, "name": "Development", "default": true },
            "project": { "id": 3, "name": "Intranet", "archived": false }
        }))
        .expect("valid timer");

        assert_eq!(NaiveDate::from_ymd_opt(2016, 11, 8).unwrap(), timer.date);
        assert_eq!("19:00", timer.start_time);
        assert_eq!(8138, timer.duration_in_seconds);
        assert_eq!(Some("Development"), timer.task.as_ref().map(|t| t.name.as_str()));
        let project = timer.project.expect("project");
        assert_eq!(3, project.id());
        assert_eq!(Some("Intranet"), project.name());
    }

    #[test]
    fn timer_with_raw_project_id() {
        let timer: Timer = serde_json::from_value(json!({
            "date": "2016-11-08",
            "start_time": "19:00",
            "project": 42
        }))
        .expect("valid timer");

        assert_eq!(Some(ProjectRef::Id(42)), timer.project);
        assert_eq!("42", timer.project.unwrap().display_name());
        assert_eq!(None, timer.note);
        assert_eq!(None, timer.task);
    }

    #[test]
    fn overview_missing_fields_are_defaulted() {
        let overview: Overview =
            serde_json::from_value(json!({ "overtime": "470:30" })).expect("valid overview");
        assert_eq!("470:30", overview.overtime);
        assert_eq!(0, overview.overtime_in_seconds);
        assert_eq!(0.0, overview.vacation.remaining_days);
    }

    #[test]
    fn presence_entry_with_group_names_and_objects() {
        let entries: Vec<PresenceEntry> = serde_json::from_value(json!([
            {
                "user": { "id": 1, "name": "Anna", "status": "active", "groups": ["Dev"] },
                "absent_first_half_day": false,
                "absent_second_half_day": true,
                "has_timer_running": false
            },
            {
                "user": { "id": 2, "name": "Beat", "groups": [{ "id": 7, "name": "Ops" }] },
                "has_timer_running": true
            }
        ]))
        .expect("valid presence");

        assert_eq!(2, entries.len());
        assert!(entries[0].is_absent());
        assert_eq!("Dev", entries[0].user.groups[0].name());
        assert!(!entries[1].is_absent());
        assert!(entries[1].has_timer_running);
        assert_eq!("Ops", entries[1].user.groups[0].name());
        assert_eq!(None, entries[1].user.status);
    }

    #[test]
    fn overview_null_fields_are_defaulted() {
        let overview: Overview = serde_json::from_value(json!({
            "overtime": null,
            "overtime_in_seconds": null,
            "vacation": { "redeemed_days": 2.5, "remaining_days": null }
        }))
        .expect("valid overview");
        assert_eq!("", overview.overtime);
        assert_eq!(0, overview.overtime_in_seconds);
        assert_eq!(2.5, overview.vacation.redeemed_days);
        assert_eq!(0.0, overview.vacation.remaining_days);

        let overview: Overview = serde_json::from_value(json!({ "vacation": null }))
            .expect("valid overview");
        assert_eq!(Vacation::default(), overview.vacation);
    }

    #[test]
    fn timer_null_display_strings_are_defaulted() {
        let timer: Timer = serde_json::from_value(json!({
            "date": "2024-03-04",
            "start_time": "08:15",
            "duration": null,
            "duration_in_seconds": null,
            "task": { "id": 3, "name": null }
        }))
        .expect("valid timer");
        assert_eq!("", timer.duration);
        assert_eq!(0, timer.duration_in_seconds);
        assert_eq!(Some(""), timer.task.as_ref().map(|t| t.name.as_str()));
    }

    #[test]
    fn presence_with_null_groups_keeps_all_members() {
        let entries: Vec<PresenceEntry> = serde_json::from_value(json!([
            {
                "user": { "id": 1, "name": "Anna", "groups": null },
                "absent_first_half_day": null,
                "has_timer_running": true
            },
            {
                "user": { "id": 2, "name": "Beat", "groups": ["Dev"] },
                "has_timer_running": null
            }
        ]))
        .expect("valid presence");

        assert_eq!(2, entries.len());
        assert!(entries[0].user.groups.is_empty());
        assert!(!entries[0].is_absent());
        assert!(entries[0].has_timer_running);
        assert!(!entries[1].has_timer_running);
    }

    #[test]
    fn task_null_flags_are_defaulted() {
        let tasks: Vec<Task> = serde_json::from_value(json!([
            { "id": 1, "name": "Dev", "default": null, "archived": null }
        ]))
        .expect("valid tasks");
        assert!(!tasks[0].default);
        assert!(!tasks[0].archived);
    }

    #[test]
    fn start_timer_msg_skips_missing_fields() {
        let msg = StartTimerMsg {
            task_id: Some(5),
            ..Default::default()
        };
        assert_eq!(json!({ "task_id": 5 }), serde_json::to_value(&msg).unwrap());
        assert!(!msg.is_empty());
        assert!(StartTimerMsg::default().is_empty());
    }
}
