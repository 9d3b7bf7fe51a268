//! Page HTML affichée à la place d'un chargement échoué.

use crate::engine::LoadError;

const STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; \
padding: 50px; text-align: center; background: #f5f5f5; }\
h1 { color: #333; }\
.error-code { color: #666; font-size: 14px; }\
.url { color: #0066cc; word-break: break-all; }\
.retry-btn { display: inline-block; margin-top: 20px; padding: 10px 20px; \
background: #0066cc; color: white; border-radius: 5px; font-size: 16px; text-decoration: none; }\
.retry-btn:hover { background: #0055aa; }";

/// Construit le document d'erreur pour `error`.
///
/// Le bouton « Retry » pointe vers l'URL échouée : un simple rechargement
/// rechargerait la page d'erreur elle-même.
pub fn render(error: &LoadError, locale: &str) -> String {
    let url = html_escape(&error.failed_url);
    let reason = format!("{} ({})", html_escape(&error.text), error.code);
    document(locale, &reason, &url, &url, "")
}

/// Texte remplacé par Servo dans la page d'erreur réseau.
pub const ENGINE_REASON: &str = "${reason}";

/// Page servie à Servo comme `neterror.html`. Servo la charge à l'adresse
/// échouée et y remplace [`ENGINE_REASON`] : le lien vide recharge donc
/// cette adresse, et l'URL affichée est celle du document.
pub fn engine_template(locale: &str) -> String {
    document(
        locale,
        ENGINE_REASON,
        "",
        "",
        "<script>document.querySelector('.url').textContent = location.href;</script>",
    )
}

fn document(locale: &str, reason: &str, url: &str, href: &str, script: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"{lang}\"><head><meta charset=\"utf-8\">\
         <title>Load Error</title><style>{STYLE}</style></head><body>\
         <h1>This page isn't working</h1>\
         <p class=\"error-code\">Error: {reason}</p>\
         <p class=\"url\">{url}</p>\
         <a class=\"retry-btn\" href=\"{href}\">Retry</a>\
         {script}</body></html>",
        lang = html_escape(language_tag(locale)),
    )
}

/// `en-US` → `en-US`, `fr_FR.UTF-8` → `fr_FR`.
fn language_tag(locale: &str) -> &str {
    let tag = locale.split('.').next().unwrap_or_default();
    if tag.is_empty() { "en" } else { tag }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LoadErrorCode;

    #[test]
    fn test_contains_url_and_reason() {
        let err = LoadError::new(LoadErrorCode::NameNotResolved, "https://nowhere.invalid/");
        let html = render(&err, "en-US");
        assert!(html.contains("https://nowhere.invalid/"));
        assert!(html.contains("Error: ERR_NAME_NOT_RESOLVED (-105)"));
        assert!(html.contains("<title>Load Error</title>"));
        assert!(html.contains("This page isn't working"));
    }

    #[test]
    fn test_retry_links_failed_url() {
        let err = LoadError::new(LoadErrorCode::TimedOut, "https://slow.example/");
        let html = render(&err, "en-US");
        assert!(html.contains("href=\"https://slow.example/\">Retry</a>"));
    }

    #[test]
    fn test_locale_in_lang_attribute() {
        let err = LoadError::new(LoadErrorCode::Failed, "https://a/");
        assert!(render(&err, "fr_FR.UTF-8").contains("<html lang=\"fr_FR\">"));
        assert!(render(&err, "").contains("<html lang=\"en\">"));
    }

    #[test]
    fn test_markup_escaped() {
        let err = LoadError::new(LoadErrorCode::Failed, "https://a/?q=<script>\"x\"")
            .with_text("<b>boom</b>");
        let html = render(&err, "en-US");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;b&gt;boom&lt;/b&gt;"));
        assert!(html.contains("&quot;x&quot;"));
    }

    #[test]
    fn test_query_url_rendered_literally() {
        let failed = "https://nowhere.invalid/search?a=1&b=2";
        let html = render(&LoadError::new(LoadErrorCode::NameNotResolved, failed), "en-US");

        // Balisage échappé, texte affiché identique à l'URL
        assert!(html.contains("<p class=\"url\">https://nowhere.invalid/search?a=1&amp;b=2</p>"));
        assert!(!html.contains("a=1&b=2"));
        let shown = html
            .split("<p class=\"url\">")
            .nth(1)
            .and_then(|rest| rest.split("</p>").next())
            .unwrap();
        assert_eq!(unescape(shown), failed);

        let href = html.split("href=\"").nth(1).and_then(|rest| rest.split('"').next()).unwrap();
        assert_eq!(unescape(href), failed);
    }

    #[test]
    fn test_engine_template_keeps_placeholder() {
        let html = engine_template("fr_FR.UTF-8");
        assert!(html.contains("<p class=\"error-code\">Error: ${reason}</p>"));
        assert!(html.contains("<html lang=\"fr_FR\">"));
        assert!(html.contains("This page isn't working"));
        assert!(html.contains("href=\"\">Retry</a>"));
        assert!(html.contains("location.href"));

        // Ce que Servo en fait
        let page = html.replace(ENGINE_REASON, "DNS resolution failed");
        assert!(page.contains("Error: DNS resolution failed"));
    }

    fn unescape(s: &str) -> String {
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&")
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("it's"), "it&#39;s");
    }
}
