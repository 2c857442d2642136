//! 命中 URL / 路径的可达性验证（结果只记录，不回流扫描核心）
use std::collections::HashSet;
use std::time::Duration;

use infofinder_core::RequestConfig;
use tracing::{info, warn};

/// 对 URL 规则与路径规则的命中做主动探测
/// 路径命中没有宿主信息，逐一拼接到 URL 命中中出现过的 origin 上探测
pub fn scan_active(urls: &[String], uris: &[String], request_config: &RequestConfig) {
    let client = match reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(request_config.request_timeout))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            warn!(%err, "failed to build http client, skipping active validation");
            return;
        }
    };

    for url in urls {
        probe(&client, url);
    }

    let origins = collect_origins(urls);
    for uri in uris {
        let sep = if uri.starts_with('/') { "" } else { "/" };
        for origin in &origins {
            probe(&client, &format!("{origin}{sep}{uri}"));
        }
    }
}

fn probe(client: &reqwest::blocking::Client, url: &str) {
    match client.get(url).send() {
        Ok(response) => info!(url = %url, status = %response.status(), "probe"),
        Err(err) => info!(url = %url, %err, "probe failed"),
    }
}

/// 从 URL 命中提取去重后的 `scheme://host[:port]` 列表（保序）
fn collect_origins(urls: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for url in urls {
        if let Some(origin) = origin_of(url) {
            if seen.insert(origin.clone()) {
                out.push(origin);
            }
        }
    }
    out
}

fn origin_of(url: &str) -> Option<String> {
    let scheme_end = url.find("://")?;
    let rest = &url[scheme_end + 3..];
    let host_end = rest.find('/').unwrap_or(rest.len());
    if rest[..host_end].is_empty() {
        return None;
    }
    Some(format!("{}{}", &url[..scheme_end + 3], &rest[..host_end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_keeps_scheme_host_and_port() {
        assert_eq!(
            origin_of("https://api.example.com/v1/login").as_deref(),
            Some("https://api.example.com")
        );
        assert_eq!(
            origin_of("http://10.0.0.1:8080/admin").as_deref(),
            Some("http://10.0.0.1:8080")
        );
        assert_eq!(
            origin_of("https://bare.example.com").as_deref(),
            Some("https://bare.example.com")
        );
    }

    #[test]
    fn origin_rejects_non_urls() {
        assert_eq!(origin_of("not a url"), None);
        assert_eq!(origin_of("https:///missing-host"), None);
    }

    #[test]
    fn origins_are_deduplicated_in_order() {
        let urls = vec![
            "https://a.example.com/x".to_string(),
            "https://b.example.com/y".to_string(),
            "https://a.example.com/z".to_string(),
        ];
        assert_eq!(
            collect_origins(&urls),
            ["https://a.example.com", "https://b.example.com"]
        );
    }
}
