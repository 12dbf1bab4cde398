// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Refresh coordinator: periodically aggregates the Hakuna data into a [`Snapshot`] and forwards
//! timer actions.

mod handler;
mod messages;
mod snapshot;

pub use messages::*;
pub use snapshot::*;

use crate::client::HakunaClient;
use crate::errors::RefreshError;
use actix::prelude::{Actor, AsyncContext, Context};
use chrono::{DateTime, Utc};
use futures::channel::oneshot;
use log::{debug, error, info, warn};
use rust_fsm::*;
use std::sync::Arc;
use std::time::Duration;

state_machine! {
    derive(Debug)
    RefreshCycle(Idle)

    Idle(Trigger) => Refreshing,
    Refreshing(Complete) => Idle,
}

type RefreshResult = Result<Arc<Snapshot>, RefreshError>;

pub struct Coordinator {
    api: HakunaClient,
    update_interval: Duration,
    machine: StateMachine<RefreshCycle>,
    /// Latest published snapshot. Replaced as a whole, never modified.
    snapshot: Option<Arc<Snapshot>>,
    last_update: Option<DateTime<Utc>>,
    /// `None` before the first completed cycle.
    last_result: Option<Result<(), RefreshError>>,
    /// Callers waiting for the in-flight refresh cycle.
    waiters: Vec<oneshot::Sender<RefreshResult>>,
}

impl Coordinator {
    pub fn new(api: HakunaClient, update_interval: Duration) -> Self {
        Self {
            api,
            update_interval,
            machine: StateMachine::new(),
            snapshot: None,
            last_update: None,
            last_result: None,
            waiters: Vec::new(),
        }
    }

    fn is_refreshing(&self) -> bool {
        matches!(self.machine.state(), RefreshCycleState::Refreshing)
    }

    fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            last_update_success: matches!(self.last_result, Some(Ok(()))),
            last_error: match &self.last_result {
                Some(Err(e)) => Some(e.to_string()),
                _ => None,
            },
            auth_failed: matches!(self.last_result, Some(Err(RefreshError::Auth(_)))),
            last_update: self.last_update,
            refreshing: self.is_refreshing(),
            update_interval_sec: self.update_interval.as_secs(),
        }
    }

    /// Start a new refresh cycle, or join the in-flight cycle.
    ///
    /// The optional `waiter` is notified with the result of the cycle.
    fn start_refresh(
        &mut self,
        ctx: &mut Context<Self>,
        waiter: Option<oneshot::Sender<RefreshResult>>,
    ) {
        if let Some(waiter) = waiter {
            self.waiters.push(waiter);
        }

        if self.machine.consume(&RefreshCycleInput::Trigger).is_err() {
            debug!("[{}] Refresh in progress, joining cycle", self.api.id());
            return;
        }

        debug!("[{}] Starting refresh cycle", self.api.id());
        self.spawn_refresh(ctx);
    }

    /// Publish the result of a refresh cycle and notify all waiting callers.
    fn complete_refresh(&mut self, result: Result<Snapshot, RefreshError>) {
        if self.machine.consume(&RefreshCycleInput::Complete).is_err() {
            error!(
                "[{}] Refresh completed in state {:?}",
                self.api.id(),
                self.machine.state()
            );
        }

        let result = match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                if self.last_result.as_ref().is_some_and(|r| r.is_err()) {
                    info!("[{}] Fetching data recovered", self.api.id());
                }
                debug!(
                    "[{}] Refresh finished: timer running={}, presence={}, users={}, tasks={}",
                    self.api.id(),
                    snapshot.timer_running(),
                    snapshot.presence().len(),
                    snapshot.users().len(),
                    snapshot.tasks().len()
                );
                self.snapshot = Some(snapshot.clone());
                self.last_update = Some(Utc::now());
                self.last_result = Some(Ok(()));
                Ok(snapshot)
            }
            Err(e) => {
                match &e {
                    RefreshError::Auth(_) => error!("[{}] {e}", self.api.id()),
                    RefreshError::Fetch(_) => warn!("[{}] {e}", self.api.id()),
                }
                self.last_result = Some(Err(e.clone()));
                Err(e)
            }
        };

        for waiter in self.waiters.drain(..) {
            // receiver might be gone, e.g. a dropped HTTP request
            let _ = waiter.send(result.clone());
        }
    }
}

impl Actor for Coordinator {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Context<Self>) {
        info!(
            "[{}] Coordinator started, update interval: {:?}",
            self.api.id(),
            self.update_interval
        );
        ctx.run_interval(self.update_interval, |act, ctx| {
            act.start_refresh(ctx, None);
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        debug!("[{}] Coordinator stopped", self.api.id());
    }
}
