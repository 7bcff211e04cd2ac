//! Integration tests for crawling and downloading
//!
//! These tests use wiremock to stand in for the regulatory site and run
//! the crawl and download stages end-to-end through the politeness gate.

mod common;

use common::{config_for, mount_page, mount_robots, PDF_BYTES};
use normativa_harvest::model::{CrawlManifest, Link, LinkKind};
use normativa_harvest::output::SeedStatus;
use normativa_harvest::pipeline::Pipeline;
use normativa_harvest::politeness::AuditLog;
use normativa_harvest::HarvestError;
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_crawl_collects_links_and_writes_manifest() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());
    let base = server.uri();

    mount_page(&server, "/Normativa/index.aspx", &["a.aspx", "docs/doc1.pdf"]).await;
    mount_page(&server, "/Normativa/a.aspx", &["index.aspx"]).await;

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let report = pipeline.run_crawl(None).await.unwrap();

    assert_eq!(report.get("pages visited"), Some(2));
    assert_eq!(report.get("links collected"), Some(2));
    assert_eq!(report.get("documents"), Some(1));
    assert!(report.errors.is_empty());

    let manifest = CrawlManifest::load(Path::new(&config.output.manifest_path)).unwrap();
    assert_eq!(manifest.total_links, 2);
    assert_eq!(
        manifest.links,
        vec![
            Link::page(format!("{}/Normativa/a.aspx", base)),
            Link::document(format!("{}/Normativa/docs/doc1.pdf", base)),
        ]
    );
}

#[tokio::test]
async fn test_crawl_ignores_navigation_and_outside_prefix() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    mount_page(
        &server,
        "/Normativa/index.aspx",
        &[
            "docs/doc1.pdf",
            "/Normativa/docs/doc1.pdf",
            "/otros/fuera.pdf",
            "https://elsewhere.example.org/Normativa/x.pdf",
            "anexo.docx",
        ],
    )
    .await;

    let pipeline = Pipeline::new(config.clone()).unwrap();
    pipeline.run_crawl(None).await.unwrap();

    let manifest = CrawlManifest::load(Path::new(&config.output.manifest_path)).unwrap();
    // menu.aspx lives outside the content container
    assert_eq!(manifest.total_links, 1);
    assert_eq!(manifest.links[0].kind, LinkKind::Document);
}

#[tokio::test]
async fn test_crawl_respects_max_pages_without_duplicates() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    mount_page(
        &server,
        "/Normativa/index.aspx",
        &["p1.aspx", "p2.aspx", "p3.aspx", "p1.aspx", "p4.aspx"],
    )
    .await;
    mount_page(&server, "/Normativa/p1.aspx", &["p2.aspx", "p5.aspx"]).await;

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let report = pipeline.run_crawl(Some(2)).await.unwrap();

    assert_eq!(report.get("pages visited"), Some(2));

    let manifest = CrawlManifest::load(Path::new(&config.output.manifest_path)).unwrap();
    let urls: HashSet<&str> = manifest.links.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(urls.len(), manifest.links.len());
    assert_eq!(manifest.total_links, 5);

    // Only the seed and p1 were requested
    let requests = server.received_requests().await.unwrap();
    let pages: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path().ends_with(".aspx"))
        .collect();
    assert_eq!(pages.len(), 2);
}

#[tokio::test]
async fn test_crawl_honors_robots_disallow() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    mount_robots(&server, "User-agent: *\nDisallow: /Normativa/privado/\n").await;
    mount_page(&server, "/Normativa/index.aspx", &["privado/oculto.aspx", "publico.aspx"]).await;
    mount_page(&server, "/Normativa/publico.aspx", &[]).await;
    Mock::given(method("GET"))
        .and(path("/Normativa/privado/oculto.aspx"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(config.clone()).unwrap();
    pipeline.run_crawl(None).await.unwrap();

    let audit = AuditLog::new(&config.politeness.audit_log_path, "test");
    let entries = audit.read_entries().unwrap();
    assert!(entries
        .iter()
        .any(|e| e.url.ends_with("/privado/oculto.aspx") && e.outcome == "denied-robots"));
    assert!(entries.iter().any(|e| e.outcome == "granted"));
}

#[tokio::test]
async fn test_crawl_records_failed_pages_and_continues() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    mount_page(&server, "/Normativa/index.aspx", &["roto.aspx", "bueno.aspx"]).await;
    Mock::given(method("GET"))
        .and(path("/Normativa/roto.aspx"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/Normativa/bueno.aspx", &["docs/d.pdf"]).await;

    let pipeline = Pipeline::new(config).unwrap();
    let report = pipeline.run_crawl(None).await.unwrap();

    assert_eq!(report.get("pages visited"), Some(3));
    assert_eq!(report.get("documents"), Some(1));
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].subject.ends_with("/roto.aspx"));
}

#[tokio::test]
async fn test_download_is_idempotent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/Normativa/docs/doc1.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BYTES))
        .expect(1)
        .mount(&server)
        .await;

    CrawlManifest::new(vec![
        Link::page(format!("{}/Normativa/a.aspx", base)),
        Link::document(format!("{}/Normativa/docs/doc1.pdf", base)),
    ])
    .save(Path::new(&config.output.manifest_path))
    .unwrap();

    let pipeline = Pipeline::new(config.clone()).unwrap();

    let first = pipeline.run_download().await.unwrap();
    assert_eq!(first.get("fetched"), Some(1));

    let second = pipeline.run_download().await.unwrap();
    assert_eq!(second.get("fetched"), Some(0));
    assert_eq!(second.get("already present"), Some(1));

    let stored = Path::new(&config.output.documents_dir).join("doc1.pdf");
    assert_eq!(std::fs::read(&stored).unwrap(), PDF_BYTES);

    let files: Vec<_> = std::fs::read_dir(&config.output.documents_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_download_failure_is_recorded() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/Normativa/docs/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    CrawlManifest::new(vec![Link::document(format!(
        "{}/Normativa/docs/missing.pdf",
        base
    ))])
    .save(Path::new(&config.output.manifest_path))
    .unwrap();

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let report = pipeline.run_download().await.unwrap();

    assert_eq!(report.get("failed"), Some(1));
    assert_eq!(report.errors.len(), 1);
    assert!(!Path::new(&config.output.documents_dir)
        .join("missing.pdf")
        .exists());
    assert!(!Path::new(&config.output.documents_dir)
        .join("missing.pdf.part")
        .exists());
}

#[tokio::test]
async fn test_download_off_allow_list_is_policy_violation() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    CrawlManifest::new(vec![Link::document(
        "https://elsewhere.example.org/Normativa/x.pdf",
    )])
    .save(Path::new(&config.output.manifest_path))
    .unwrap();

    let pipeline = Pipeline::new(config).unwrap();
    let result = pipeline.run_download().await;

    assert!(matches!(result, Err(HarvestError::PolicyViolation { .. })));
}

#[tokio::test]
async fn test_download_without_manifest() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    let pipeline = Pipeline::new(config).unwrap();
    let result = pipeline.run_download().await;

    assert!(matches!(result, Err(HarvestError::ManifestMissing(_))));
}

#[tokio::test]
async fn test_download_mixed_batch_keeps_good_documents() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/Normativa/docs/bad.pdf"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Normativa/docs/good.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PDF_BYTES))
        .mount(&server)
        .await;

    CrawlManifest::new(vec![
        Link::document(format!("{}/Normativa/docs/bad.pdf", base)),
        Link::document(format!("{}/Normativa/docs/good.pdf", base)),
    ])
    .save(Path::new(&config.output.manifest_path))
    .unwrap();

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let report = pipeline.run_download().await.unwrap();

    assert_eq!(report.get("fetched"), Some(1));
    assert_eq!(report.get("failed"), Some(1));
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].subject.ends_with("bad.pdf"));

    let documents = Path::new(&config.output.documents_dir);
    assert_eq!(std::fs::read(documents.join("good.pdf")).unwrap(), PDF_BYTES);
    assert!(!documents.join("bad.pdf").exists());
}

#[tokio::test]
async fn test_single_worker_downloads_one_at_a_time() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = config_for(&server, dir.path());
    config.download.max_workers = 1;
    let base = server.uri();

    // Each response outlasts the request interval, so a second worker
    // would start before the first finished
    let delay = Duration::from_millis(1500);
    for name in ["uno.pdf", "dos.pdf"] {
        Mock::given(method("GET"))
            .and(path(format!("/Normativa/docs/{}", name)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(PDF_BYTES)
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    CrawlManifest::new(vec![
        Link::document(format!("{}/Normativa/docs/uno.pdf", base)),
        Link::document(format!("{}/Normativa/docs/dos.pdf", base)),
    ])
    .save(Path::new(&config.output.manifest_path))
    .unwrap();

    let pipeline = Pipeline::new(config).unwrap();
    let start = Instant::now();
    let report = pipeline.run_download().await.unwrap();

    assert_eq!(report.get("fetched"), Some(2));
    assert!(
        start.elapsed() >= delay * 2,
        "downloads overlapped: finished in {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_crawl_resolves_links_against_requested_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/Normativa/index.aspx"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/Normativa/Paginas/listado.aspx", base).as_str()),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/Normativa/Paginas/listado.aspx", &["docs/doc1.pdf"]).await;

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let report = pipeline.run_crawl(None).await.unwrap();

    assert_eq!(report.get("pages visited"), Some(1));
    let manifest = CrawlManifest::load(Path::new(&config.output.manifest_path)).unwrap();
    assert_eq!(
        manifest.links,
        vec![Link::document(format!("{}/Normativa/docs/doc1.pdf", base))]
    );
}

#[tokio::test]
async fn test_check_environment_requests_seed_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    Mock::given(method("GET"))
        .and(path("/Normativa/index.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let report = pipeline.check_environment().await.unwrap();

    assert_eq!(report.seed, SeedStatus::Reachable(200));
    let names: Vec<_> = report.tools.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["pdftotext", "pdftoppm", "tesseract"]);
    assert!(Path::new(&config.output.documents_dir).is_dir());
    assert!(Path::new(&config.output.records_dir).is_dir());

    let entries = AuditLog::new(&config.politeness.audit_log_path, "test")
        .read_entries()
        .unwrap();
    assert!(entries.iter().any(|e| e.outcome == "granted"));
}

#[tokio::test]
async fn test_check_environment_reports_seed_status() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    Mock::given(method("GET"))
        .and(path("/Normativa/index.aspx"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(config).unwrap();
    let report = pipeline.check_environment().await.unwrap();

    assert_eq!(report.seed, SeedStatus::HttpError(503));
    assert!(!report.is_ready());
}

#[tokio::test]
async fn test_check_environment_honors_robots() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, dir.path());

    mount_robots(&server, "User-agent: *\nDisallow: /Normativa/\n").await;
    Mock::given(method("GET"))
        .and(path("/Normativa/index.aspx"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(config).unwrap();
    let report = pipeline.check_environment().await.unwrap();

    assert_eq!(report.seed, SeedStatus::Disallowed);
}
