//! Encodage d'un contenu en-mémoire en URI `data:`.
//!
//! Forme produite : `data:<mime>;base64,<pct(base64(bytes))>`. L'alphabet
//! base64 est standard avec padding, puis tout octet hors `[A-Za-z0-9-._~]`
//! est échappé en `%XX` : `+`, `/` et `=` deviennent `%2B`, `%2F`, `%3D`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Caractères laissés tels quels : alphanumériques et non-réservés RFC 3986.
const DATA_URI_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Construit une URI `data:` base64 pour `bytes`.
pub fn data_uri(bytes: &[u8], mime_type: &str) -> String {
    let encoded = STANDARD.encode(bytes);
    format!(
        "data:{mime_type};base64,{}",
        utf8_percent_encode(&encoded, DATA_URI_ESCAPE)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode_payload(uri: &str, mime: &str) -> Vec<u8> {
        let prefix = format!("data:{mime};base64,");
        let payload = uri.strip_prefix(&prefix).unwrap();
        let unescaped: Vec<u8> = percent_encoding::percent_decode_str(payload).collect();
        STANDARD.decode(unescaped).unwrap()
    }

    #[test]
    fn test_prefix() {
        let uri = data_uri(b"<p>hi</p>", "text/html");
        assert!(uri.starts_with("data:text/html;base64,"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(data_uri(b"", "text/html"), "data:text/html;base64,");
    }

    #[test]
    fn test_reserved_base64_chars_escaped() {
        // 0xfb 0xff → "+/8=" en base64
        let uri = data_uri(&[0xfb, 0xff], "application/octet-stream");
        assert_eq!(uri, "data:application/octet-stream;base64,%2B%2F8%3D");
    }

    #[test]
    fn test_decodes_back() {
        let html = "<html><body>Erreur : é</body></html>";
        let uri = data_uri(html.as_bytes(), "text/html");
        assert_eq!(decode_payload(&uri, "text/html"), html.as_bytes());
    }

    proptest! {
        #[test]
        fn prop_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let uri = data_uri(&bytes, "text/html");
            prop_assert_eq!(decode_payload(&uri, "text/html"), bytes);
        }

        #[test]
        fn prop_payload_is_url_safe(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
            let uri = data_uri(&bytes, "text/html");
            let payload = &uri["data:text/html;base64,".len()..];
            prop_assert!(payload.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'%'));
        }
    }
}
