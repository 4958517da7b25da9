use std::sync::LazyLock;

use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::StatusCode;
use url::Url;

use crate::fetcher::types::PageResponse;

/// How much of the body is searched for a declared charset.
const SNIFF_WINDOW: usize = 4096;

static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

pub fn process_response(
    url_final: Url,
    status: StatusCode,
    body_raw: Bytes,
    content_type: &str,
) -> PageResponse {
    let declared = sniff_encoding(content_type, &body_raw);
    // A BOM overrides the declared encoding.
    let (decoded, used, lossy) = declared.decode(&body_raw);

    PageResponse {
        url_final,
        status,
        encoding: used.name(),
        body_utf8: decoded.into_owned(),
        body_raw,
        lossy,
        fetched_at: Utc::now(),
    }
}

/// Header charset first, then the document's own declarations, then a
/// statistical guess over the start of the body.
fn sniff_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    let head = &body[..body.len().min(SNIFF_WINDOW)];
    let head_text = String::from_utf8_lossy(head);

    [
        (&*HEADER_CHARSET, content_type),
        (&*META_CHARSET, head_text.as_ref()),
        (&*META_HTTP_EQUIV, head_text.as_ref()),
    ]
    .into_iter()
    .find_map(|(pattern, haystack)| declared_encoding(pattern, haystack))
    .unwrap_or_else(|| {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(head, head.len() == body.len());
        detector.guess(None, true)
    })
}

fn declared_encoding(pattern: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = pattern.captures(haystack)?.get(1)?.as_str();
    Encoding::for_label(label.trim().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(content_type: &str, body: &'static [u8]) -> PageResponse {
        process_response(
            Url::parse("https://sn.coinafrique.com/").unwrap(),
            StatusCode::OK,
            Bytes::from_static(body),
            content_type,
        )
    }

    #[test]
    fn header_charset_wins() {
        let before = Utc::now();
        let page = decode("text/html; charset=utf-8", b"<html><body>Dakar</body></html>");
        assert_eq!(page.encoding, "UTF-8");
        assert!(!page.lossy);
        assert!(page.fetched_at >= before && page.fetched_at <= Utc::now());
    }

    #[test]
    fn meta_charset_is_honoured() {
        let page = decode(
            "text/html",
            b"<html><head><meta charset=\"iso-8859-1\"></head><body>S\xe9n\xe9gal</body></html>",
        );
        // encoding_rs maps latin-1 labels to windows-1252
        assert_eq!(page.encoding, "windows-1252");
        assert!(page.body_utf8.contains("Sénégal"));
    }

    #[test]
    fn meta_http_equiv_is_honoured() {
        let page = decode(
            "text/html",
            b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"></head><body>Thi\xe8s</body></html>",
        );
        assert_eq!(page.encoding, "windows-1252");
        assert!(page.body_utf8.contains("Thiès"));
    }

    #[test]
    fn undeclared_utf8_is_detected() {
        let page = decode("text/html", "<p>10 000 CFA · Médina</p>".as_bytes());
        assert_eq!(page.body_utf8, "<p>10 000 CFA · Médina</p>");
    }

    #[test]
    fn invalid_bytes_are_replaced_not_fatal() {
        let page = decode("text/html; charset=utf-8", b"<p>prix \xff</p>");
        assert!(page.lossy);
        assert!(page.body_utf8.starts_with("<p>prix "));
    }
}
