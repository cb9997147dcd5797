//! Public status page for front-end identification.

use std::sync::Arc;

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::envelope::Envelope;

/// Structured configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct Status {
    pub version: String,
    pub name: String,
}

/// Public server status (configuration).
pub async fn status(State(config): State<Arc<Configuration>>) -> Envelope<Status> {
    Envelope::ok(
        "Server is up.",
        Status {
            version: config.version.clone(),
            name: config.name.clone(),
        },
    )
}
