use std::error::Error;

use tracing::warn;

use crate::cli::context::CliContext;
use crate::core::oauth::{
    build_authorization_url, handle_oauth_callback, open_in_browser, random_state,
    CallbackOutcome, LoopbackCallback,
};
use crate::core::routes::OAuthProvider;

/// Signs in through `provider`.
///
/// Normally this opens the browser and waits on a loopback listener for the
/// redirect. With `pasted_callback` the redirect URL is taken as given, for
/// machines where the browser runs elsewhere.
pub async fn run(
    ctx: &CliContext,
    provider: OAuthProvider,
    pasted_callback: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let (callback_url, redirect_uri) = match pasted_callback {
        Some(url) => (url.to_string(), None),
        None => {
            let listener = LoopbackCallback::bind(provider).await?;
            let redirect_uri = listener.redirect_uri()?;
            let state = random_state(32)?;
            let authorize_url =
                build_authorization_url(&ctx.api_base_url, provider, &redirect_uri, &state)?;

            println!("Opening {} sign-in in your browser…", provider.display_name());
            println!("If nothing opens, visit:\n  {authorize_url}");
            if let Err(err) = open_in_browser(authorize_url.as_str()) {
                warn!(error = %err, "could not launch browser");
            }

            let callback_url = listener.wait(&state).await?;
            (callback_url, Some(redirect_uri))
        }
    };

    let outcome = handle_oauth_callback(
        ctx.api.as_ref(),
        &ctx.session,
        &ctx.tokens,
        &callback_url,
        redirect_uri.as_deref(),
    )
    .await;
    report(outcome)
}

fn report(outcome: CallbackOutcome) -> Result<(), Box<dyn Error>> {
    match outcome {
        CallbackOutcome::Authenticated { user, .. } => {
            println!("✅ Signed in as {} <{}>", user.display_name(), user.email);
            Ok(())
        }
        CallbackOutcome::RedirectToLogin { reason } => Err(format!(
            "Sign-in failed: {reason}. Run `huddle login` to try again."
        )
        .into()),
    }
}
