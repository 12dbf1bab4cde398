// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Local REST API exposing the coordinator snapshot, the projected entities and the timer
//! actions.

use std::str::FromStr;

use actix::Addr;
use actix_web::{HttpResponse, get, post, web};
use chrono::Local;
use log::info;

use crate::APP_VERSION;
use crate::configuration::ApiSettings;
use crate::controller::{
    CancelTimer, Coordinator, GetSnapshot, GetStatus, Refresh, StartTimer, StopTimer,
};
use crate::entity::{ButtonKind, button_states, project_entities};
use crate::errors::ServiceError;
pub use web_model::*;

mod web_model;

/// Register all REST API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_status)
        .service(get_snapshot)
        .service(get_sensors)
        .service(get_buttons)
        .service(press_button)
        .service(refresh);
}

#[get("/api/status")]
async fn get_status(
    coordinator: web::Data<Addr<Coordinator>>,
    settings: web::Data<ApiSettings>,
) -> Result<HttpResponse, ServiceError> {
    let status = coordinator.send(GetStatus).await?;
    Ok(HttpResponse::Ok().json(StatusResponse {
        version: APP_VERSION,
        company: settings.company.as_deref(),
        coordinator: status,
    }))
}

#[get("/api/snapshot")]
async fn get_snapshot(
    coordinator: web::Data<Addr<Coordinator>>,
) -> Result<HttpResponse, ServiceError> {
    match coordinator.send(GetSnapshot).await? {
        Some(snapshot) => Ok(HttpResponse::Ok().json(snapshot.as_ref())),
        None => Err(ServiceError::ServiceUnavailable(
            "No data available yet".into(),
        )),
    }
}

#[get("/api/sensors")]
async fn get_sensors(
    coordinator: web::Data<Addr<Coordinator>>,
) -> Result<HttpResponse, ServiceError> {
    let snapshot = coordinator.send(GetSnapshot).await?;
    Ok(HttpResponse::Ok().json(project_entities(snapshot.as_deref(), &Local)))
}

#[get("/api/buttons")]
async fn get_buttons(
    coordinator: web::Data<Addr<Coordinator>>,
) -> Result<HttpResponse, ServiceError> {
    let snapshot = coordinator.send(GetSnapshot).await?;
    Ok(HttpResponse::Ok().json(button_states(snapshot.as_deref())))
}

#[post("/api/buttons/{key}")]
async fn press_button(
    key: web::Path<String>,
    body: web::Bytes,
    coordinator: web::Data<Addr<Coordinator>>,
) -> Result<HttpResponse, ServiceError> {
    let button = ButtonKind::from_str(&key)
        .map_err(|_| ServiceError::NotFound(format!("Unknown button: {key}")))?;

    let snapshot = coordinator.send(GetSnapshot).await?;
    if !button.is_available(snapshot.as_deref()) {
        return Err(ServiceError::NotAvailable(format!(
            "Button {button} is not available"
        )));
    }

    match button {
        ButtonKind::StartTimer => {
            let request = StartTimerRequest::from_body(&body)?;
            coordinator
                .send(StartTimer {
                    task_id: request.task_id,
                    project_id: request.project_id,
                    note: request.note,
                })
                .await??
        }
        ButtonKind::StopTimer => coordinator.send(StopTimer).await??,
        ButtonKind::CancelTimer => coordinator.send(CancelTimer).await??,
        ButtonKind::Refresh => {
            info!("Data refresh requested");
            coordinator.send(Refresh).await??;
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::new("OK", button.to_string().as_str())))
}

#[post("/api/refresh")]
async fn refresh(coordinator: web::Data<Addr<Coordinator>>) -> Result<HttpResponse, ServiceError> {
    let snapshot = coordinator.send(Refresh).await??;
    Ok(HttpResponse::Ok().json(snapshot.as_ref()))
}
