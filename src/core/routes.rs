//! Navigation targets and the OAuth providers that can call back into them.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuthProvider {
    Google,
    Github,
    Microsoft,
}

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 3] = [
        OAuthProvider::Google,
        OAuthProvider::Github,
        OAuthProvider::Microsoft,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
            OAuthProvider::Microsoft => "microsoft",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            OAuthProvider::Google => "Google",
            OAuthProvider::Github => "GitHub",
            OAuthProvider::Microsoft => "Microsoft",
        }
    }

    pub fn callback_path(self) -> String {
        format!("/auth/{}/callback", self.as_str())
    }

    /// Infers the provider from a callback path such as
    /// `/auth/google/callback`. Any leading mount prefix is ignored.
    pub fn from_callback_path(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        segments.windows(3).find_map(|window| match window {
            ["auth", provider, "callback"] => provider.parse().ok(),
            _ => None,
        })
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for OAuthProvider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        OAuthProvider::ALL
            .into_iter()
            .find(|provider| provider.as_str() == lowered)
            .ok_or_else(|| format!("unknown OAuth provider: {value}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Debug,
    OAuthCallback(OAuthProvider),
}

impl Route {
    pub fn path(self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Debug => "/debug".to_string(),
            Route::OAuthCallback(provider) => provider.callback_path(),
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        match trimmed.trim_end_matches('/') {
            "/login" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            "/debug" => Some(Route::Debug),
            other => OAuthProvider::from_callback_path(other).map(Route::OAuthCallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        let routes = [
            Route::Login,
            Route::Dashboard,
            Route::Debug,
            Route::OAuthCallback(OAuthProvider::Google),
            Route::OAuthCallback(OAuthProvider::Microsoft),
        ];
        for route in routes {
            assert_eq!(Route::from_path(&route.path()), Some(route));
        }
    }

    #[test]
    fn provider_is_inferred_from_path() {
        assert_eq!(
            OAuthProvider::from_callback_path("/auth/github/callback"),
            Some(OAuthProvider::Github)
        );
        assert_eq!(
            OAuthProvider::from_callback_path("/app/auth/Google/callback/"),
            Some(OAuthProvider::Google)
        );
        assert_eq!(OAuthProvider::from_callback_path("/auth/callback"), None);
        assert_eq!(OAuthProvider::from_callback_path("/auth/myspace/callback"), None);
    }

    #[test]
    fn query_strings_are_ignored_when_matching() {
        assert_eq!(Route::from_path("/login?next=/dashboard"), Some(Route::Login));
        assert_eq!(Route::from_path("/nowhere"), None);
    }
}
