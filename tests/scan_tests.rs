//! End-to-end sweeps over loopback blocks with mock origins

use std::net::Ipv4Addr;

use ipx::config::ScanConfig;
use ipx::probe::{HttpProber, Scheme};
use ipx::{CidrBlock, Evidence, ScanCoordinator, ScanError, StatusFilter};
use reqwest::Method;
use tokio::sync::mpsc;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn page_server(body_len: usize) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(body_len)))
        .mount(&server)
        .await;
    server
}

fn coordinator(port: u16, tolerance: u64) -> ScanCoordinator<HttpProber> {
    let config = ScanConfig {
        timeout_secs: 5,
        scheme: Scheme::Http,
        port: Some(port),
        tolerance,
        concurrency: 8,
        ..ScanConfig::default()
    };
    let prober = HttpProber::new(&config).expect("Failed to create prober");
    ScanCoordinator::new(prober, config)
}

async fn collect(mut rx: mpsc::Receiver<Evidence>) -> Vec<Evidence> {
    let mut hits = Vec::new();
    while let Some(ev) = rx.recv().await {
        hits.push(ev);
    }
    hits
}

#[tokio::test]
async fn origin_found_among_dead_addresses() {
    let server = page_server(1000).await;
    let domain = server.address().to_string();
    let block = CidrBlock::parse("127.0.0.0/30").unwrap();

    let (tx, rx) = mpsc::channel(16);
    let summary = coordinator(server.address().port(), 0)
        .find_origin(&block, &domain, tx)
        .await
        .expect("Scan failed");
    let hits = collect(rx).await;

    assert_eq!(summary.probed, 4);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.discarded, 3);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].address, Ipv4Addr::LOCALHOST);
    assert_eq!(hits[0].body_length, 1000);
    assert_eq!(hits[0].host_header, domain);
}

#[tokio::test]
async fn tolerance_decides_near_lengths() {
    let proxied = page_server(1000).await;
    let origin = page_server(1030).await;
    let block = CidrBlock::parse("127.0.0.1/32").unwrap();
    let domain = proxied.address().to_string();

    let (tx, rx) = mpsc::channel(4);
    let strict = coordinator(origin.address().port(), 10)
        .find_origin(&block, &domain, tx)
        .await
        .unwrap();
    assert_eq!(strict.matched, 0);
    assert_eq!(strict.non_matched, 1);
    assert!(collect(rx).await.is_empty());

    let (tx, rx) = mpsc::channel(4);
    let loose = coordinator(origin.address().port(), 50)
        .find_origin(&block, &domain, tx)
        .await
        .unwrap();
    assert_eq!(loose.matched, 1);
    let hits = collect(rx).await;
    assert_eq!(hits[0].body_length, 1030);
    assert_eq!(hits[0].baseline_length, Some(1000));
}

#[tokio::test]
async fn candidate_redirecting_to_proxied_site_is_not_a_hit() {
    let proxied = page_server(1000).await;
    let domain = proxied.address().to_string();
    let redirector = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", format!("{}/", proxied.uri()).as_str()))
        .mount(&redirector)
        .await;
    let block = CidrBlock::parse("127.0.0.1/32").unwrap();

    let (tx, rx) = mpsc::channel(4);
    let summary = coordinator(redirector.address().port(), 0)
        .find_origin(&block, &domain, tx)
        .await
        .unwrap();
    assert_eq!(summary.matched, 0);
    assert_eq!(summary.non_matched, 1);
    assert!(collect(rx).await.is_empty());

    // opting in lets the redirect through, and with it the proxied page
    let config = ScanConfig {
        timeout_secs: 5,
        scheme: Scheme::Http,
        port: Some(redirector.address().port()),
        follow_redirects: true,
        ..ScanConfig::default()
    };
    let opted_in = ScanCoordinator::new(HttpProber::new(&config).unwrap(), config);
    let (tx, rx) = mpsc::channel(4);
    let summary = opted_in.find_origin(&block, &domain, tx).await.unwrap();
    assert_eq!(summary.matched, 1);
    assert_eq!(collect(rx).await[0].body_length, 1000);
}

#[tokio::test]
async fn unreachable_baseline_aborts_before_sweep() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = listener.local_addr().unwrap();
    drop(listener);

    let candidate = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&candidate)
        .await;

    let (tx, rx) = mpsc::channel(4);
    let err = coordinator(candidate.address().port(), 0)
        .find_origin(&CidrBlock::parse("127.0.0.1/32").unwrap(), &dead.to_string(), tx)
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::BaselineUnavailable { .. }));
    assert!(collect(rx).await.is_empty());
}

#[tokio::test]
async fn method_probe_reports_ok_responses() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(header("host", "admin.internal"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let block = CidrBlock::parse("127.0.0.0/31").unwrap();
    let (tx, rx) = mpsc::channel(4);
    let summary = coordinator(server.address().port(), 0)
        .probe_methods(&block, Method::PUT, "admin.internal", StatusFilter::OkOnly, tx)
        .await;
    let hits = collect(rx).await;

    assert_eq!(summary.probed, 2);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].address, Ipv4Addr::LOCALHOST);
    assert_eq!(hits[0].status, 200);
    assert_eq!(hits[0].body_length, 2);
    assert_eq!(hits[0].scheme, Scheme::Http);
    assert_eq!(hits[0].host_header, "admin.internal");
}

#[tokio::test]
async fn method_probe_can_report_every_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;

    let block = CidrBlock::parse("127.0.0.1/32").unwrap();
    let coordinator = coordinator(server.address().port(), 0);

    let (tx, rx) = mpsc::channel(4);
    coordinator
        .probe_methods(&block, Method::DELETE, "example.com", StatusFilter::OkOnly, tx)
        .await;
    assert!(collect(rx).await.is_empty());

    let (tx, rx) = mpsc::channel(4);
    coordinator
        .probe_methods(&block, Method::DELETE, "example.com", StatusFilter::Any, tx)
        .await;
    let hits = collect(rx).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].status, 405);
}
