// Copyright (c) 2023 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use crate::USER_AGENT;
use awc::http::header;
use std::time::Duration;

/// Create a new HTTP client for the Hakuna REST API.
///
/// TLS is handled by the default awc connector with rustls. The crypto provider must be installed
/// with [`crate::install_crypto_provider`] before the first HTTPS request.
/// Creating a client is sufficient once per account: it keeps the connection pool for all
/// requests.
pub fn new_http_client(connection_timeout: Duration, request_timeout: Duration) -> awc::Client {
    let connector = awc::Connector::new().timeout(connection_timeout);
    awc::ClientBuilder::new()
        .timeout(request_timeout)
        .connector(connector)
        .add_default_header((header::USER_AGENT, USER_AGENT))
        .finish()
}
