use std::collections::BTreeMap;

pub(crate) fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
}

pub(super) fn host_header_value(parsed: &url::Url) -> Option<String> {
    let host = parsed.host_str()?;
    match (parsed.scheme(), parsed.port()) {
        ("http", Some(port)) if port != 80 => Some(format!("{host}:{port}")),
        ("https", Some(port)) if port != 443 => Some(format!("{host}:{port}")),
        _ => Some(host.to_string()),
    }
}

/// Lowercased header names, sorted; repeated headers are joined with `, `.
pub(super) fn merge_headers(map: &http::HeaderMap) -> Vec<(String, String)> {
    let mut merged: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes());
        match merged.get_mut(name.as_str()) {
            Some(cur) => {
                cur.push_str(", ");
                cur.push_str(&value);
            }
            None => {
                merged.insert(name.as_str().to_ascii_lowercase(), value.into_owned());
            }
        }
    }
    merged.into_iter().collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn host_header_omits_default_ports() {
        let http = url::Url::parse("http://example.com:80/x").unwrap();
        let https = url::Url::parse("https://example.com/x").unwrap();
        let custom = url::Url::parse("http://127.0.0.1:8080/").unwrap();

        assert_eq!(host_header_value(&http).as_deref(), Some("example.com"));
        assert_eq!(host_header_value(&https).as_deref(), Some("example.com"));
        assert_eq!(
            host_header_value(&custom).as_deref(),
            Some("127.0.0.1:8080")
        );
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut map = http::HeaderMap::new();
        map.append("set-cookie", http::HeaderValue::from_static("a=1"));
        map.append("set-cookie", http::HeaderValue::from_static("b=2"));
        map.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );

        let merged = merge_headers(&map);
        assert_eq!(
            merged,
            vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("set-cookie".to_string(), "a=1, b=2".to_string()),
            ]
        );
    }

    #[test]
    fn header_lookup_ignores_case() {
        let headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        assert!(has_header(&headers, "content-type"));
        assert!(!has_header(&headers, "authorization"));
    }
}
