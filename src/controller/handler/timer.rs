// Copyright (c) 2023 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix message handlers for timer actions.

use crate::controller::{CancelTimer, Coordinator, Refresh, StartTimer, StopTimer};
use crate::errors::{ApiError, ServiceError};
use actix::{Addr, AsyncContext, Handler, ResponseFuture};
use log::{error, info, warn};
use std::future::Future;

impl Handler<StartTimer> for Coordinator {
    type Result = ResponseFuture<Result<(), ServiceError>>;

    fn handle(&mut self, msg: StartTimer, ctx: &mut Self::Context) -> Self::Result {
        let task_id = msg
            .task_id
            .or_else(|| self.snapshot.as_ref().and_then(|s| s.default_task_id()));
        if task_id.is_none() {
            warn!(
                "[{}] No default task found, starting timer without task",
                self.api.id()
            );
        }

        let api = self.api.clone();
        run_action(ctx.address(), "start_timer", async move {
            api.start_timer(task_id, msg.project_id, msg.note.as_deref())
                .await?;
            info!("[{}] Timer started with task: {task_id:?}", api.id());
            Ok(())
        })
    }
}

impl Handler<StopTimer> for Coordinator {
    type Result = ResponseFuture<Result<(), ServiceError>>;

    fn handle(&mut self, _: StopTimer, ctx: &mut Self::Context) -> Self::Result {
        let api = self.api.clone();
        run_action(ctx.address(), "stop_timer", async move {
            let entry = api.stop_timer().await?;
            match entry {
                Some(entry) => info!(
                    "[{}] Timer stopped, created time entry {} ({})",
                    api.id(),
                    entry.id,
                    entry.duration
                ),
                None => info!("[{}] Timer stopped", api.id()),
            }
            Ok(())
        })
    }
}

impl Handler<CancelTimer> for Coordinator {
    type Result = ResponseFuture<Result<(), ServiceError>>;

    fn handle(&mut self, _: CancelTimer, ctx: &mut Self::Context) -> Self::Result {
        let api = self.api.clone();
        run_action(ctx.address(), "cancel_timer", async move {
            api.cancel_timer().await?;
            info!("[{}] Timer cancelled", api.id());
            Ok(())
        })
    }
}

/// Execute a timer action and refresh the snapshot if it succeeded.
///
/// A failed refresh afterward doesn't fail the action, its error is available in the coordinator
/// status.
fn run_action<F>(
    addr: Addr<Coordinator>,
    action: &'static str,
    call: F,
) -> ResponseFuture<Result<(), ServiceError>>
where
    F: Future<Output = Result<(), ApiError>> + 'static,
{
    Box::pin(async move {
        if let Err(e) = call.await {
            error!("Error executing {action}: {e}");
            return Err(e.into());
        }

        match addr.send(Refresh).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("Refresh after {action} failed: {e}"),
            Err(e) => warn!("Refresh after {action} not possible: {e}"),
        }
        Ok(())
    })
}
