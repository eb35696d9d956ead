use std::env;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use gradescope_api::client::{Auth, Client};
use gradescope_api::creds::Creds;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, registry, EnvFilter};
use url::Url;

pub const EMAIL_VAR: &str = "GS_EMAIL";
pub const PASSWORD_VAR: &str = "GS_PASSWORD";
pub const BASE_URL_VAR: &str = "GS_BASE_URL";

/// Loads `.env` if there is one and logs in with the credentials it (or the environment) holds.
pub async fn init_from_env() -> Result<Client<Auth>> {
    if let Err(err) = dotenv() {
        debug!(%err, "no .env loaded");
    }

    let creds = creds_from_env()?;
    let gradescope = match base_url_from_env()? {
        Some(base_url) => Client::with_base_url(creds, base_url)?,
        None => Client::new(creds)?,
    };

    gradescope
        .setup()
        .await
        .context("could not log in to Gradescope")
}

pub fn creds_from_env() -> Result<Creds> {
    let email = env::var(EMAIL_VAR).with_context(|| format!("{EMAIL_VAR} is not set"))?;
    let password = env::var(PASSWORD_VAR).with_context(|| format!("{PASSWORD_VAR} is not set"))?;
    Ok(Creds::new(email, password))
}

pub fn base_url_from_env() -> Result<Option<Url>> {
    match env::var(BASE_URL_VAR) {
        Ok(base_url) => Url::parse(&base_url)
            .map(Some)
            .with_context(|| format!("{BASE_URL_VAR} `{base_url}` is not a URL")),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("could not read {BASE_URL_VAR}")),
    }
}

pub fn init_tracing() {
    registry()
        .with(
            fmt::layer()
                .event_format(format().pretty())
                .with_writer(std::io::stderr),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}
