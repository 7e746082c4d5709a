//! Runtime pieces shared by the session-aware subcommands.

use std::error::Error;
use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{CoachApi, HttpCoachApi};
use crate::cli::Args;
use crate::core::config::Config;
use crate::core::session::{SessionHandle, SessionStore};
use crate::core::token_store::TokenStore;
use crate::utils::url::normalize_base_url;

pub const API_URL_ENV: &str = "HUDDLE_API_URL";
pub const TOKEN_ENV: &str = "HUDDLE_TOKEN";

pub struct CliContext {
    pub config: Config,
    pub api_base_url: String,
    pub api: Arc<dyn CoachApi>,
    pub session: SessionHandle,
    pub tokens: TokenStore,
}

impl CliContext {
    pub fn from_env(args: &Args, config: Config) -> Result<Self, Box<dyn Error>> {
        let env_url = std::env::var(API_URL_ENV).ok();
        let env_token = std::env::var(TOKEN_ENV).ok();
        Self::build(args, config, env_url.as_deref(), env_token.as_deref())
    }

    pub fn build(
        args: &Args,
        config: Config,
        env_url: Option<&str>,
        env_token: Option<&str>,
    ) -> Result<Self, Box<dyn Error>> {
        let api_base_url = resolve_api_base_url(args.api_url.as_deref(), env_url, &config);
        reqwest::Url::parse(&api_base_url)
            .map_err(|err| format!("invalid API URL '{api_base_url}': {err}"))?;
        debug!(api_base_url = %api_base_url, "resolved API base URL");

        let tokens = token_store_for(args.env_only, config.use_keyring(), env_token)?;
        let session = SessionHandle::new(SessionStore::new(config.temperature()));
        let api: Arc<dyn CoachApi> = Arc::new(HttpCoachApi::new(&api_base_url));

        Ok(Self {
            config,
            api_base_url,
            api,
            session,
            tokens,
        })
    }
}

/// `--api-url`, then `HUDDLE_API_URL`, then the config file, then the default.
pub fn resolve_api_base_url(
    cli_url: Option<&str>,
    env_url: Option<&str>,
    config: &Config,
) -> String {
    [cli_url, env_url]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(normalize_base_url)
        .unwrap_or_else(|| config.api_base_url().to_string())
}

/// A token from the environment lives for this process only and is never
/// written to the keyring.
pub fn token_store_for(
    env_only: bool,
    use_keyring: bool,
    env_token: Option<&str>,
) -> Result<TokenStore, Box<dyn Error>> {
    if let Some(token) = env_token.map(str::trim).filter(|t| !t.is_empty()) {
        info!("using auth token from {TOKEN_ENV}");
        let store = TokenStore::in_memory();
        store.set_token(token)?;
        return Ok(store);
    }
    Ok(TokenStore::new(use_keyring && !env_only))
}
