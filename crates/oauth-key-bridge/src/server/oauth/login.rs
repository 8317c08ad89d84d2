//! HTML form collecting the upstream API key during authorization.

/// Render the API key entry page.
///
/// All parameters are HTML-escaped to prevent XSS.
pub fn render_api_key_form(
    client_name: &str,
    client_id: &str,
    redirect_uri: &str,
    state: Option<&str>,
    error_message: Option<&str>,
) -> String {
    let error_html = error_message
        .map(|msg| {
            format!(
                r#"<div style="background:#fee;border:1px solid #c00;color:#c00;padding:10px;border-radius:4px;margin-bottom:16px">{}</div>"#,
                html_escape(msg)
            )
        })
        .unwrap_or_default();

    let state_html = state
        .map(|s| format!(r#"<input type="hidden" name="state" value="{}">"#, html_escape(s)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>API Key Authorization</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f5f5; margin: 0; display: flex; justify-content: center; align-items: center; min-height: 100vh; }}
.card {{ background: #fff; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); padding: 32px; max-width: 440px; width: 100%; }}
h1 {{ font-size: 20px; margin: 0 0 8px; color: #333; }}
.subtitle {{ color: #666; font-size: 14px; margin: 0 0 24px; }}
label {{ display: block; font-size: 14px; font-weight: 500; margin-bottom: 6px; color: #333; }}
input[type="password"] {{ width: 100%; padding: 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 14px; box-sizing: border-box; }}
input[type="password"]:focus {{ outline: none; border-color: #007cba; box-shadow: 0 0 0 2px rgba(0,124,186,0.2); }}
button {{ width: 100%; padding: 10px; background: #007cba; color: #fff; border: none; border-radius: 4px; font-size: 14px; font-weight: 500; cursor: pointer; margin-top: 16px; }}
button:hover {{ background: #005a87; }}
.note {{ color: #666; font-size: 12px; margin-top: 20px; }}
</style>
</head>
<body>
<div class="card">
<h1>API Key Authorization</h1>
<p class="subtitle"><strong>{client_name}</strong> needs your API key to make authenticated requests on your behalf.</p>
{error_html}
<form method="POST" action="/authorize">
<input type="hidden" name="redirect_uri" value="{redirect_uri_escaped}">
<input type="hidden" name="client_id" value="{client_id_escaped}">
{state_html}
<label for="api_key">Enter your API key</label>
<input type="password" id="api_key" name="api_key" placeholder="Enter your API key here..." required autofocus>
<button type="submit">Authorize Application</button>
</form>
<p class="note">The key is sealed inside a signed token and is only used for requests to the upstream service.</p>
</div>
</body>
</html>"#,
        client_name = html_escape(client_name),
        error_html = error_html,
        redirect_uri_escaped = html_escape(redirect_uri),
        client_id_escaped = html_escape(client_id),
        state_html = state_html,
    )
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("xss")</script>"#),
            "&lt;script&gt;alert(&quot;xss&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_render_without_error() {
        let html = render_api_key_form("Test App", "client123", "http://localhost/cb", None, None);
        assert!(html.contains("Test App"));
        assert!(html.contains(r#"name="client_id" value="client123""#));
        assert!(html.contains(r#"name="api_key""#));
        assert!(!html.contains(r#"name="state""#));
        assert!(!html.contains("background:#fee"));
    }

    #[test]
    fn test_render_with_state_and_error() {
        let html = render_api_key_form("App", "id", "uri", Some("xyz"), Some("API key is required"));
        assert!(html.contains(r#"name="state" value="xyz""#));
        assert!(html.contains("API key is required"));
        assert!(html.contains("background:#fee"));
    }

    #[test]
    fn test_redirect_uri_escaped() {
        let html = render_api_key_form("App", "id", r#"https://a/cb"><script>"#, None, None);
        assert!(!html.contains("<script>"));
    }
}
