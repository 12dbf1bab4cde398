// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Aggregated result of one refresh cycle.

use serde::Serialize;

use crate::client::{Overview, PresenceEntry, Task, Timer, User};

/// Immutable aggregate of one successful refresh cycle.
///
/// Derived fields are computed once at construction: `timer_running` always reflects the
/// presence of a timer, `default_task_id` is selected from the tasks.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    timer: Option<Timer>,
    overview: Overview,
    presence: Vec<PresenceEntry>,
    users: Vec<User>,
    tasks: Vec<Task>,
    default_task_id: Option<u64>,
    timer_running: bool,
}

impl Snapshot {
    pub fn new(
        timer: Option<Timer>,
        overview: Overview,
        presence: Vec<PresenceEntry>,
        users: Vec<User>,
        tasks: Vec<Task>,
    ) -> Self {
        Self {
            timer_running: timer.is_some(),
            default_task_id: default_task_id(&tasks),
            timer,
            overview,
            presence,
            users,
            tasks,
        }
    }

    pub fn timer(&self) -> Option<&Timer> {
        self.timer.as_ref()
    }

    pub fn overview(&self) -> &Overview {
        &self.overview
    }

    pub fn presence(&self) -> &[PresenceEntry] {
        &self.presence
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Task used when starting a timer without an explicit task.
    pub fn default_task_id(&self) -> Option<u64> {
        self.default_task_id
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    /// Presence information of a team member.
    pub fn presence_of(&self, user_id: u64) -> Option<&PresenceEntry> {
        self.presence.iter().find(|p| p.user.id == user_id)
    }
}

/// Select the default task: the first non-archived task flagged as default, otherwise the first
/// non-archived task.
pub fn default_task_id(tasks: &[Task]) -> Option<u64> {
    tasks
        .iter()
        .find(|t| t.default && !t.archived)
        .or_else(|| tasks.iter().find(|t| !t.archived))
        .map(|t| t.id)
}
