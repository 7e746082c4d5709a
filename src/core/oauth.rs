//! OAuth sign-in.
//!
//! The browser finishes the provider dance and is redirected to a loopback
//! listener owned by this process. The callback URL is then handed to
//! [`handle_oauth_callback`], which trades the code for an API token. That
//! step has exactly two outcomes: signed in, or back to the login screen.

use std::error::Error;
use std::time::Duration;

use base64::Engine as _;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::CoachApi;
use crate::core::oauth_page::{render_oauth_callback_page, OAuthCallbackVariant};
use crate::core::routes::{OAuthProvider, Route};
use crate::core::session::SessionHandle;
use crate::core::token_store::TokenStore;
use crate::core::user::User;
use crate::utils::url::construct_api_url;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRedirectReason {
    InvalidCallbackUrl(String),
    UnknownProvider(String),
    ProviderError(String),
    MissingCode,
    ExchangeFailed(String),
    TokenNotSaved(String),
}

impl std::fmt::Display for LoginRedirectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginRedirectReason::InvalidCallbackUrl(detail) => {
                write!(f, "invalid callback URL: {detail}")
            }
            LoginRedirectReason::UnknownProvider(path) => {
                write!(f, "no OAuth provider matches callback path {path}")
            }
            LoginRedirectReason::ProviderError(detail) => {
                write!(f, "provider rejected the sign-in: {detail}")
            }
            LoginRedirectReason::MissingCode => write!(f, "callback did not include a code"),
            LoginRedirectReason::ExchangeFailed(detail) => {
                write!(f, "code exchange failed: {detail}")
            }
            LoginRedirectReason::TokenNotSaved(detail) => {
                write!(f, "could not save the auth token: {detail}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Authenticated { user: User, route: Route },
    RedirectToLogin { reason: LoginRedirectReason },
}

impl CallbackOutcome {
    pub fn route(&self) -> Route {
        match self {
            CallbackOutcome::Authenticated { route, .. } => *route,
            CallbackOutcome::RedirectToLogin { .. } => Route::Login,
        }
    }

    fn redirect(reason: LoginRedirectReason) -> Self {
        warn!(%reason, "oauth callback failed");
        CallbackOutcome::RedirectToLogin { reason }
    }
}

/// What the callback URL carries once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub provider: OAuthProvider,
    pub code: String,
}

pub fn parse_callback_url(callback_url: &str) -> Result<CallbackParams, LoginRedirectReason> {
    let url = reqwest::Url::parse(callback_url)
        .map_err(|err| LoginRedirectReason::InvalidCallbackUrl(err.to_string()))?;

    let provider = OAuthProvider::from_callback_path(url.path())
        .ok_or_else(|| LoginRedirectReason::UnknownProvider(url.path().to_string()))?;

    let mut code = None::<String>;
    let mut error = None::<String>;
    let mut error_description = None::<String>;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.to_string()),
            "error" => error = Some(value.to_string()),
            "error_description" => error_description = Some(value.to_string()),
            _ => {}
        }
    }

    if let Some(error) = error {
        let detail = match error_description {
            Some(description) => format!("{error} ({description})"),
            None => error,
        };
        return Err(LoginRedirectReason::ProviderError(detail));
    }

    let code = code
        .filter(|code| !code.trim().is_empty())
        .ok_or(LoginRedirectReason::MissingCode)?;

    Ok(CallbackParams { provider, code })
}

/// Exchanges the callback's code for a token, stores it and signs the user
/// in. Runs once; nothing here retries.
pub async fn handle_oauth_callback(
    api: &dyn CoachApi,
    session: &SessionHandle,
    tokens: &TokenStore,
    callback_url: &str,
    redirect_uri: Option<&str>,
) -> CallbackOutcome {
    let params = match parse_callback_url(callback_url) {
        Ok(params) => params,
        Err(reason) => return CallbackOutcome::redirect(reason),
    };

    let response = match api
        .oauth2_callback(params.provider, &params.code, redirect_uri)
        .await
    {
        Ok(response) => response,
        Err(err) => {
            return CallbackOutcome::redirect(LoginRedirectReason::ExchangeFailed(err.to_string()))
        }
    };

    if let Err(err) = tokens.set_token(&response.token) {
        return CallbackOutcome::redirect(LoginRedirectReason::TokenNotSaved(err.to_string()));
    }

    let user = response.user;
    let token = response.token;
    let signed_in = user.clone();
    session
        .update(move |store| {
            store.set_token(token);
            store.set_user(signed_in);
        })
        .await;

    info!(provider = params.provider.as_str(), user = %user.email, "signed in");
    CallbackOutcome::Authenticated {
        user,
        route: Route::Dashboard,
    }
}

/// Where the provider should send the browser, given our loopback address.
pub fn build_authorization_url(
    api_base_url: &str,
    provider: OAuthProvider,
    redirect_uri: &str,
    state: &str,
) -> Result<reqwest::Url, Box<dyn Error>> {
    let endpoint = construct_api_url(api_base_url, &format!("auth/{}/authorize", provider.as_str()));
    let mut url = reqwest::Url::parse(&endpoint)?;
    url.query_pairs_mut()
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("state", state);
    Ok(url)
}

pub fn random_state(bytes_len: usize) -> Result<String, Box<dyn Error>> {
    let mut bytes = vec![0_u8; bytes_len];
    getrandom::fill(&mut bytes).map_err(|err| format!("random source unavailable: {err}"))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// A loopback listener waiting for one provider redirect.
pub struct LoopbackCallback {
    listener: TcpListener,
    provider: OAuthProvider,
}

impl LoopbackCallback {
    pub async fn bind(provider: OAuthProvider) -> Result<Self, Box<dyn Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener, provider })
    }

    pub fn redirect_uri(&self) -> Result<String, Box<dyn Error>> {
        let port = self.listener.local_addr()?.port();
        Ok(format!(
            "http://127.0.0.1:{port}{}",
            self.provider.callback_path()
        ))
    }

    /// Accepts a single request, checks `state`, answers the browser and
    /// returns the full callback URL for [`handle_oauth_callback`].
    pub async fn wait(self, expected_state: &str) -> Result<String, Box<dyn Error>> {
        let redirect_uri = self.redirect_uri()?;
        let (mut stream, _) =
            tokio::time::timeout(CALLBACK_TIMEOUT, self.listener.accept()).await??;
        let mut buffer = vec![0_u8; 16 * 1024];
        let bytes_read = stream.read(&mut buffer).await?;
        if bytes_read == 0 {
            return Err("OAuth callback received no data".into());
        }
        let request = String::from_utf8_lossy(&buffer[..bytes_read]);
        let target = request
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .ok_or("OAuth callback request line missing")?;
        let base = reqwest::Url::parse(&redirect_uri)?;
        let callback_url = base.join(target)?;

        let state = callback_url
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned());
        let has_error = callback_url.query_pairs().any(|(key, _)| key == "error");

        let (status, heading, detail, variant) = if state.as_deref() != Some(expected_state) {
            (
                "400 Bad Request",
                "Sign-in could not be verified",
                "The callback did not match this login attempt. Close this tab and retry in huddle.",
                OAuthCallbackVariant::Error,
            )
        } else if has_error {
            (
                "400 Bad Request",
                "Sign-in was not completed",
                "The provider rejected the request. Close this tab and retry in huddle.",
                OAuthCallbackVariant::Error,
            )
        } else {
            (
                "200 OK",
                "You're signed in to huddle",
                "Close this tab and return to your terminal.",
                OAuthCallbackVariant::Success,
            )
        };
        write_callback_response(&mut stream, status, heading, detail, variant).await?;

        if state.as_deref() != Some(expected_state) {
            return Err("OAuth callback state mismatch".into());
        }
        Ok(callback_url.to_string())
    }
}

async fn write_callback_response(
    stream: &mut tokio::net::TcpStream,
    status: &str,
    heading: &str,
    detail: &str,
    variant: OAuthCallbackVariant,
) -> Result<(), Box<dyn Error>> {
    let body = render_oauth_callback_page("huddle sign-in", heading, detail, variant);
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

pub fn open_in_browser(url: &str) -> Result<(), Box<dyn Error>> {
    #[cfg(target_os = "macos")]
    {
        let status = std::process::Command::new("open").arg(url).status()?;
        if status.success() {
            return Ok(());
        }
        return Err("failed to launch browser with open".into());
    }
    #[cfg(target_os = "windows")]
    {
        let status = std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .status()?;
        if status.success() {
            return Ok(());
        }
        return Err("failed to launch browser with start".into());
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        let status = std::process::Command::new("xdg-open").arg(url).status()?;
        if status.success() {
            return Ok(());
        }
        return Err("failed to launch browser with xdg-open".into());
    }

    #[allow(unreachable_code)]
    Err(format!("no browser launcher configured for URL: {url}").into())
}
