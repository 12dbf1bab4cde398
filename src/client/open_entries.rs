// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Report of users with suspicious, not properly closed time entries.

use chrono::{Days, Local, NaiveDate};
use log::warn;
use serde::Serialize;

use crate::client::{HakunaClient, TimeEntry, User};

/// Number of days before the cutoff date which are checked for open entries.
const LOOKBACK_DAYS: u64 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OpenEntryIssue {
    /// Entry without a recorded duration.
    ZeroDuration,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OpenTimeEntry {
    pub user: User,
    pub entry: TimeEntry,
    pub issue: OpenEntryIssue,
}

impl HakunaClient {
    /// Get users with time entries older than `older_than_days` without a duration.
    ///
    /// Only the first problematic entry per user is reported. This requires supervisor or admin
    /// permissions for the time entries of other users. API errors are logged and the issues
    /// found so far are returned.
    pub async fn get_users_with_open_time_entries(&self, older_than_days: u64) -> Vec<OpenTimeEntry> {
        let today = Local::now().date_naive();
        let Some((start_date, cutoff)) = report_range(today, older_than_days) else {
            return Vec::new();
        };

        let mut issues = Vec::new();
        let users = match self.get_users().await {
            Ok(users) => users,
            Err(e) => {
                warn!("[{}] Could not check for open time entries: {e}", self.id());
                return issues;
            }
        };

        for user in users {
            match self
                .get_time_entries(start_date, Some(cutoff), Some(user.id))
                .await
            {
                Ok(entries) => {
                    if let Some(entry) = find_open_entry(&entries, cutoff) {
                        issues.push(OpenTimeEntry {
                            user,
                            entry: entry.clone(),
                            issue: OpenEntryIssue::ZeroDuration,
                        });
                    }
                }
                Err(e) => {
                    warn!("[{}] Could not check for open time entries: {e}", self.id());
                    break;
                }
            }
        }

        issues
    }
}

/// Date range `(start, cutoff)` which is checked for open entries.
fn report_range(today: NaiveDate, older_than_days: u64) -> Option<(NaiveDate, NaiveDate)> {
    let cutoff = today.checked_sub_days(Days::new(older_than_days))?;
    let start = cutoff.checked_sub_days(Days::new(LOOKBACK_DAYS))?;
    Some((start, cutoff))
}

/// First entry before the cutoff date without a duration.
fn find_open_entry(entries: &[TimeEntry], cutoff: NaiveDate) -> Option<&TimeEntry> {
    entries
        .iter()
        .find(|entry| entry.date < cutoff && entry.duration_in_seconds == 0)
}
