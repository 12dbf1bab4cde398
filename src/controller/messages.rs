// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix actor message definitions used to communicate with the [`Coordinator`].
//!
//! These messages are the consumer-facing interface: reading the latest snapshot, requesting a
//! refresh and forwarding timer actions.

use std::sync::Arc;

#[allow(unused_imports)] // used for doc links
use crate::controller::Coordinator;
use crate::controller::Snapshot;
use crate::errors::ServiceError;
use actix::prelude::Message;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Get the latest published snapshot.
///
/// Returns `None` before the first successful refresh cycle.
#[derive(Debug, Default, Message)]
#[rtype(result = "Option<Arc<Snapshot>>")]
pub struct GetSnapshot;

/// Request a refresh cycle and wait for its result.
///
/// If a cycle is already in progress the request joins it instead of starting a new one.
/// Returns [`ServiceError::Refresh`] if a critical fetch failed.
#[derive(Debug, Default, Message)]
#[rtype(result = "Result<Arc<Snapshot>, ServiceError>")]
pub struct Refresh;

/// Start a new timer and refresh afterward.
///
/// Without `task_id` the default task of the latest snapshot is used.
#[derive(Debug, Default, Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct StartTimer {
    pub task_id: Option<u64>,
    pub project_id: Option<u64>,
    pub note: Option<String>,
}

/// Stop the running timer, which creates a time entry, and refresh afterward.
#[derive(Debug, Default, Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct StopTimer;

/// Discard the running timer without creating a time entry and refresh afterward.
#[derive(Debug, Default, Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct CancelTimer;

/// Get the coordinator status.
#[derive(Debug, Default, Message)]
#[rtype(result = "CoordinatorStatus")]
pub struct GetStatus;

/// Outcome of the last refresh cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoordinatorStatus {
    /// Last cycle succeeded. `false` before the first cycle completed.
    pub last_update_success: bool,
    /// Error of the last cycle, if it failed.
    pub last_error: Option<String>,
    /// Last authentication failure requires a new API token.
    pub auth_failed: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub refreshing: bool,
    pub update_interval_sec: u64,
}
