// Copyright (c) 2023 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix message handlers for refresh cycles and snapshot access.

use crate::client::HakunaClient;
use crate::controller::{Coordinator, GetSnapshot, GetStatus, Refresh, Snapshot};
use crate::errors::{RefreshError, ServiceError};
use actix::{
    ActorFutureExt, AsyncContext, Context, Handler, MessageResult, ResponseFuture, WrapFuture,
};
use futures::channel::oneshot;
use log::warn;
use std::sync::Arc;

impl Handler<GetSnapshot> for Coordinator {
    type Result = Option<Arc<Snapshot>>;

    fn handle(&mut self, _: GetSnapshot, _ctx: &mut Self::Context) -> Self::Result {
        self.snapshot.clone()
    }
}

impl Handler<GetStatus> for Coordinator {
    type Result = MessageResult<GetStatus>;

    fn handle(&mut self, _: GetStatus, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.status())
    }
}

impl Handler<Refresh> for Coordinator {
    type Result = ResponseFuture<Result<Arc<Snapshot>, ServiceError>>;

    fn handle(&mut self, _: Refresh, ctx: &mut Self::Context) -> Self::Result {
        let (tx, rx) = oneshot::channel();
        self.start_refresh(ctx, Some(tx));

        Box::pin(async move {
            match rx.await {
                Ok(result) => result.map_err(ServiceError::from),
                Err(_) => Err(ServiceError::InternalServerError(
                    "Refresh cycle aborted".into(),
                )),
            }
        })
    }
}

impl Coordinator {
    /// Run the fetch phase of a refresh cycle in the actor context.
    pub(in crate::controller) fn spawn_refresh(&mut self, ctx: &mut Context<Self>) {
        let api = self.api.clone();
        ctx.spawn(
            async move { fetch_snapshot(&api).await }
                .into_actor(self)
                .map(|result, act, _ctx| act.complete_refresh(result)),
        );
    }
}

/// Fetch all data of a refresh cycle concurrently.
///
/// Timer and overview are critical: any failure fails the whole cycle. Presence, users and tasks
/// are best-effort and fall back to an empty list.
pub(crate) async fn fetch_snapshot(api: &HakunaClient) -> Result<Snapshot, RefreshError> {
    let (timer, overview, presence, users, tasks) = futures::join!(
        api.get_timer(),
        api.get_overview(None),
        api.get_presence(),
        api.get_users(),
        api.get_tasks(),
    );

    let timer = timer?;
    let overview = overview?;
    let presence = presence.unwrap_or_else(|e| {
        warn!("[{}] Could not fetch presence data: {e}", api.id());
        Vec::new()
    });
    let users = users.unwrap_or_else(|e| {
        warn!("[{}] Could not fetch users: {e}", api.id());
        Vec::new()
    });
    let tasks = tasks.unwrap_or_else(|e| {
        warn!("[{}] Could not fetch tasks: {e}", api.id());
        Vec::new()
    });

    Ok(Snapshot::new(timer, overview, presence, users, tasks))
}
