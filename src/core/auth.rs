use std::error::Error;

use tracing::{info, warn};

use crate::api::CoachApi;
use crate::core::session::SessionHandle;
use crate::core::token_store::{TokenStore, TokenStoreError};
use crate::core::user::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    SignedIn(User),
    /// No stored token.
    SignedOut,
    /// A token was stored but the server no longer accepts it. It has been
    /// removed.
    Expired,
}

/// Signs back in with a previously stored token, if there is one.
pub async fn restore_session(
    api: &dyn CoachApi,
    session: &SessionHandle,
    tokens: &TokenStore,
) -> Result<RestoreOutcome, Box<dyn Error>> {
    let Some(token) = tokens.get_token()? else {
        return Ok(RestoreOutcome::SignedOut);
    };

    match api.current_user(&token).await {
        Ok(user) => {
            let signed_in = user.clone();
            session
                .update(move |store| {
                    store.set_token(token);
                    store.set_user(signed_in);
                })
                .await;
            info!(user = %user.email, "restored session");
            Ok(RestoreOutcome::SignedIn(user))
        }
        Err(err) if err.is_unauthenticated() => {
            warn!("stored token rejected; clearing it");
            tokens.clear()?;
            session.update(|store| store.logout()).await;
            Ok(RestoreOutcome::Expired)
        }
        Err(err) => Err(Box::new(err)),
    }
}

pub async fn logout(session: &SessionHandle, tokens: &TokenStore) -> Result<bool, TokenStoreError> {
    let removed = tokens.clear()?;
    session.update(|store| store.logout()).await;
    info!(removed, "logged out");
    Ok(removed)
}
