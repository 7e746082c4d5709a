pub enum OAuthCallbackVariant {
    Success,
    Error,
}

const CALLBACK_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{TITLE}}</title>
<style>
body { font-family: system-ui, sans-serif; display: flex; min-height: 100vh; margin: 0; align-items: center; justify-content: center; }
main { max-width: 32rem; padding: 2rem; border-top: 4px solid {{ACCENT}}; }
h1 { color: {{ACCENT}}; font-size: 1.4rem; }
</style>
</head>
<body>
<main>
<h1>{{HEADING}}</h1>
<p>{{DETAIL}}</p>
</main>
</body>
</html>
"#;

pub fn render_oauth_callback_page(
    title: &str,
    heading: &str,
    detail: &str,
    variant: OAuthCallbackVariant,
) -> String {
    let accent = match variant {
        OAuthCallbackVariant::Success => "#2e7d32",
        OAuthCallbackVariant::Error => "#c62828",
    };

    CALLBACK_TEMPLATE
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{HEADING}}", &escape_html(heading))
        .replace("{{DETAIL}}", &escape_html(detail))
        .replace("{{ACCENT}}", accent)
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::{render_oauth_callback_page, OAuthCallbackVariant};

    #[test]
    fn page_includes_text_and_accent() {
        let html = render_oauth_callback_page(
            "huddle sign-in",
            "You're signed in to huddle",
            "Close this tab and return to your terminal.",
            OAuthCallbackVariant::Success,
        );

        assert!(html.contains("You&#39;re signed in to huddle"));
        assert!(html.contains("Close this tab and return to your terminal."));
        assert!(html.contains("#2e7d32"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn page_escapes_html() {
        let html = render_oauth_callback_page(
            "<title>",
            "<heading>",
            "\"detail\" & more",
            OAuthCallbackVariant::Error,
        );

        assert!(html.contains("&lt;title&gt;"));
        assert!(html.contains("&lt;heading&gt;"));
        assert!(html.contains("&quot;detail&quot; &amp; more"));
        assert!(html.contains("#c62828"));
    }
}
