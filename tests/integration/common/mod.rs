//! Helpers shared by the integration tests

#![allow(dead_code)]

use normativa_harvest::config::{parse_config, Config};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a validated configuration for a mock server, with every output
/// under `dir`
pub fn config_for(server: &MockServer, dir: &Path) -> Config {
    let base = server.uri();
    let out = |name: &str| dir.join(name).to_string_lossy().into_owned();

    let toml = format!(
        r#"
[site]
seed-url = "{base}/Normativa/index.aspx"
base-prefix = "{base}/Normativa/"
allowed-domains = ["127.0.0.1"]

[politeness]
min-request-interval-ms = 1000
max-requests-per-minute = 60
request-timeout-secs = 5
audit-log-path = '{audit}'

[user-agent]
crawler-name = "NormativaHarvest"
crawler-version = "1.0"
contact-url = "https://example.org/about"
contact-email = "admin@example.org"

[output]
manifest-path = '{manifest}'
documents-dir = '{documents}'
records-dir = '{records}'

[store]
database-path = '{database}'
"#,
        base = base,
        audit = out("audit.log"),
        manifest = out("links.json"),
        documents = out("pdfs"),
        records = out("records"),
        database = out("normativa.db"),
    );

    parse_config(&toml).expect("test configuration is valid")
}

/// Wraps links in the content container the crawler reads from
pub fn content_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();

    format!(
        r#"<html><body>
<nav><a href="/Normativa/menu.aspx">Menu</a></nav>
<div class="container_blanco">{}</div>
</body></html>"#,
        anchors
    )
}

pub async fn mount_page(server: &MockServer, route: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(content_page(links)),
        )
        .mount(server)
        .await;
}

pub async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n% test document\n%%EOF\n";
