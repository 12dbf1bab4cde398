// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

#![forbid(non_ascii_idents)]
#![deny(unsafe_code)]

use std::net::TcpListener;
use std::path::Path;

use actix::Actor;
use actix_web::{App, HttpServer, middleware, web};
use anyhow::bail;
use clap::{Command, arg};
use hakuna_bridge::client::HakunaClient;
use hakuna_bridge::configuration::{DEF_CONFIG_FILE, get_configuration};
use hakuna_bridge::server::{self, json_error_handler};
use hakuna_bridge::{APP_VERSION, Coordinator, Refresh, built_info, install_crypto_provider};
use log::{error, info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Command::new(built_info::PKG_NAME)
        .author("Unfolded Circle ApS")
        .version(APP_VERSION)
        .about("Hakuna time tracking bridge")
        .arg(arg!(-c --config <FILE> "Configuration file").required(false))
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    install_crypto_provider();

    let cfg_file = match args.get_one::<String>("config") {
        None => {
            if Path::new(DEF_CONFIG_FILE).exists() {
                info!("Loading default configuration file: {DEF_CONFIG_FILE}");
                Some(DEF_CONFIG_FILE)
            } else {
                None
            }
        }
        Some(c) => Some(c.as_str()),
    };
    let cfg = get_configuration(cfg_file)?;
    if !cfg.api.has_token() {
        bail!(
            "Hakuna API token is missing: set api.token in the configuration file or HAKUNA_API_TOKEN"
        );
    }
    info!("Hakuna API: {}", cfg.api);

    let api = HakunaClient::new(&cfg.api);
    let coordinator = Coordinator::new(api, cfg.api.update_interval()).start();

    // first refresh: the service still starts if Hakuna is not reachable
    match coordinator.send(Refresh).await? {
        Ok(snapshot) => info!(
            "Initial refresh finished. Timer running: {}",
            snapshot.timer_running()
        ),
        Err(e) => warn!("Initial refresh failed: {e}"),
    }

    if !cfg.integration.http.enabled {
        info!("REST API disabled, only polling Hakuna");
        // keep the coordinator running until the process is terminated
        futures::future::pending::<()>().await;
        return Ok(());
    }

    let address = format!(
        "{}:{}",
        cfg.integration.interface, cfg.integration.http.port
    );
    let listener = TcpListener::bind(&address)?;
    println!("{} listening on: {address}", built_info::PKG_NAME);

    let coordinator = web::Data::new(coordinator);
    let api_settings = web::Data::new(cfg.api.clone());
    let http_server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(
                web::JsonConfig::default()
                    .limit(16 * 1024) // limit size of the payload (global configuration)
                    .error_handler(json_error_handler),
            )
            .app_data(coordinator.clone())
            .app_data(api_settings.clone())
            .configure(server::configure)
    })
    .workers(1)
    .listen(listener)?;

    if let Err(e) = http_server.run().await {
        error!("REST server error: {e}");
        return Err(e.into());
    }

    Ok(())
}
