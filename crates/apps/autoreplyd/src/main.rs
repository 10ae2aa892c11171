//! autoreplyd - Gmail vacation auto-reply daemon
//!
//! Authenticates against Gmail, resolves the reply label, then serves
//! the trigger endpoint; the first `GET /` starts the poll loop.

use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;

use autoreply::{GmailAuth, GmailClient, GmailCredentials, ResponderSettings, Supervisor};

/// Trigger endpoint port, overridable via AUTOREPLYD_PORT
const DEFAULT_PORT: u16 = 8080;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    autoreply::config::init().context("Failed to initialize config directory")?;

    let settings = ResponderSettings::load().context("Failed to load responder settings")?;
    info!(
        "Responder configured: filter '{}', label '{}', interval {}ms",
        settings.sender_filter_query, settings.label_name, settings.poll_interval_ms
    );

    // Load Gmail credentials from config file or environment
    let creds = match GmailCredentials::load() {
        Ok(creds) => creds,
        Err(e) => {
            if let Some(path) = GmailCredentials::default_credentials_path() {
                warn!(
                    "To configure Gmail access, either:\n\
                     1. Place your Google OAuth credentials at: {}\n\
                     2. Or set environment variables: GMAIL_CLIENT_ID and GMAIL_CLIENT_SECRET",
                    path.display()
                );
            }
            return Err(e).context("Gmail credentials not found");
        }
    };

    let auth = GmailAuth::new(creds.client_id, creds.client_secret)?;
    let client = GmailClient::new(auth);

    // No decision loop may run without a valid credential
    client
        .authenticate()
        .context("Gmail authentication failed")?;
    info!("Gmail client authenticated");

    // Resolve the reply label once at startup; created if absent
    let label_id = client
        .ensure_label(&settings.label_name)
        .context("Failed to resolve reply label")?;
    info!(
        "Using reply label '{}' ({})",
        settings.label_name,
        label_id.as_str()
    );

    let store_path =
        autoreply::default_store_path().context("Could not determine replied-senders path")?;

    let supervisor = Arc::new(Supervisor::new(
        Arc::new(client),
        settings,
        label_id,
        store_path,
    ));

    autoreply::trigger::serve(trigger_port(), supervisor)
}

fn trigger_port() -> u16 {
    match std::env::var("AUTOREPLYD_PORT") {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!("Invalid AUTOREPLYD_PORT '{}'; using {}", value, DEFAULT_PORT);
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    }
}
