//! Integration tests for the resolver
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! reqwest transport through real redirect chains.

use applink_resolver::config::Config;
use applink_resolver::{
    MissingLocationPolicy, RedirectLimit, ReqwestTransport, ResolveError, Resolver,
    MISSING_DATA_MESSAGE,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_resolver() -> Resolver {
    Resolver::from_config(&Config::default()).expect("Failed to build resolver")
}

fn page_url(server: &MockServer, page: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), page)).expect("Failed to parse mock URL")
}

#[tokio::test]
async fn test_sends_preference_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("Prefer-Html-Meta-Tags", "al"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><meta property=\"al:ios:url\"></head></html>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let resolution = create_resolver()
        .resolve(&page_url(&mock_server, "/"))
        .await
        .expect("Resolution failed");

    assert_eq!(resolution.response.status_code, 200);
    assert_eq!(resolution.response.header("Content-Type"), Some("text/html"));
    assert!(String::from_utf8_lossy(&resolution.data).contains("al:ios:url"));
    assert_eq!(resolution.redirects, 0);
}

#[tokio::test]
async fn test_follows_redirect_with_header_on_every_hop() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .and(header("Prefer-Html-Meta-Tags", "al"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/middle", mock_server.uri()).as_str())
                .set_body_string("Found"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/middle"))
        .and(header("Prefer-Html-Meta-Tags", "al"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/final", mock_server.uri()).as_str())
                .set_body_string("Moved Permanently"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/final"))
        .and(header("Prefer-Html-Meta-Tags", "al"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>final</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resolution = create_resolver()
        .resolve(&page_url(&mock_server, "/start"))
        .await
        .expect("Resolution failed");

    assert_eq!(resolution.response.status_code, 200);
    assert_eq!(resolution.final_url(), &page_url(&mock_server, "/final"));
    assert_eq!(&resolution.data[..], b"<html>final</html>");
    assert_eq!(resolution.redirects, 2);
}

#[tokio::test]
async fn test_redirect_without_location_retries_same_url() {
    let mock_server = MockServer::start().await;

    // First request gets a bare redirect, the retry gets the page
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(300).set_body_string("Multiple Choices"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&mock_server)
        .await;

    let resolution = create_resolver()
        .resolve(&page_url(&mock_server, "/flaky"))
        .await
        .expect("Resolution failed");

    assert_eq!(resolution.response.status_code, 200);
    assert_eq!(resolution.redirects, 1);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.url.path() == "/flaky"));
}

#[tokio::test]
async fn test_redirect_without_location_fails_with_fail_policy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bare"))
        .respond_with(ResponseTemplate::new(308).set_body_string("Redirect"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = create_resolver()
        .with_missing_location(MissingLocationPolicy::Fail)
        .resolve(&page_url(&mock_server, "/bare"))
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::MissingLocation { .. }));
}

#[tokio::test]
async fn test_empty_body_is_missing_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&mock_server)
        .await;

    let err = create_resolver()
        .resolve(&page_url(&mock_server, "/empty"))
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::MissingData));
    assert_eq!(err.to_string(), MISSING_DATA_MESSAGE);
}

#[tokio::test]
async fn test_error_status_with_body_is_returned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>Not Found</html>"))
        .mount(&mock_server)
        .await;

    let resolution = create_resolver()
        .resolve(&page_url(&mock_server, "/missing"))
        .await
        .expect("404 with a body is a terminal response");

    assert_eq!(resolution.response.status_code, 404);
    assert_eq!(&resolution.data[..], b"<html>Not Found</html>");
}

#[tokio::test]
async fn test_redirect_loop_hits_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(
            ResponseTemplate::new(307)
                .insert_header("Location", format!("{}/loop", mock_server.uri()).as_str())
                .set_body_string("Temporary Redirect"),
        )
        .mount(&mock_server)
        .await;

    let err = create_resolver()
        .with_redirect_limit(RedirectLimit::Bounded(3))
        .resolve(&page_url(&mock_server, "/loop"))
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::TooManyRedirects { limit: 3, .. }));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    // Nothing listens on port 1
    let url = Url::parse("http://127.0.0.1:1/").unwrap();

    let err = create_resolver().resolve(&url).await.unwrap_err();

    assert!(err.is_transport());
    match err {
        ResolveError::Transport(inner) => {
            let source = inner
                .downcast_ref::<reqwest::Error>()
                .expect("Expected a reqwest error");
            assert!(source.is_connect());
        }
        other => panic!("Expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_resolutions_share_resolver() {
    let mock_server = MockServer::start().await;

    for page in ["/one", "/two"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&mock_server)
            .await;
    }

    let resolver = create_resolver();
    let one = page_url(&mock_server, "/one");
    let two = page_url(&mock_server, "/two");

    let (first, second) = tokio::join!(resolver.resolve(&one), resolver.resolve(&two));

    assert_eq!(&first.unwrap().data[..], b"/one");
    assert_eq!(&second.unwrap().data[..], b"/two");
}

#[tokio::test]
async fn test_resolve_with_delivers_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cb"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>cb</html>"))
        .mount(&mock_server)
        .await;

    let (tx, rx) = tokio::sync::oneshot::channel();
    create_resolver()
        .resolve_with(page_url(&mock_server, "/cb"), move |result| {
            let _ = tx.send(result);
        })
        .await
        .expect("Resolution task panicked");

    let resolution = rx.await.expect("Callback never ran").expect("Resolution failed");
    assert_eq!(&resolution.data[..], b"<html>cb</html>");
}

#[tokio::test]
async fn test_default_resolvers_share_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shared"))
        .and(header("Prefer-Html-Meta-Tags", "al"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>shared</html>"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let first = Resolver::new().expect("Failed to build default resolver");
    let second = Resolver::new().expect("Failed to build default resolver");
    let shared = ReqwestTransport::shared().expect("Failed to build shared transport");

    let first_ptr = Arc::as_ptr(first.transport()).cast::<()>();
    assert_eq!(first_ptr, Arc::as_ptr(second.transport()).cast::<()>());
    assert_eq!(first_ptr, Arc::as_ptr(&shared).cast::<()>());

    let target = page_url(&mock_server, "/shared");
    let one = first.resolve(&target).await.expect("Resolution failed");
    let two = second.resolve(&target).await.expect("Resolution failed");

    assert_eq!(one, two);
    assert_eq!(&one.data[..], b"<html>shared</html>");
}

#[tokio::test]
async fn test_custom_client_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>slow</html>")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_millis(200))
        .build()
        .expect("Failed to build client");
    let resolver = Resolver::with_transport(Arc::new(ReqwestTransport::from_client(client)));

    let err = resolver
        .resolve(&page_url(&mock_server, "/slow"))
        .await
        .unwrap_err();

    match err {
        ResolveError::Transport(inner) => {
            let source = inner
                .downcast_ref::<reqwest::Error>()
                .expect("Expected a reqwest error");
            assert!(source.is_timeout());
        }
        other => panic!("Expected transport error, got {:?}", other),
    }
}
