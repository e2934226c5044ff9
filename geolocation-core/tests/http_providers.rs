use geolocation_core::{
    Config, TrackerError, format_record, normalize,
    provider::{lookup_from_config, resolver_from_config},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn config_for(server: &MockServer, provider: &str) -> Config {
    Config {
        public_ip_url: format!("{}/ip", server.uri()),
        geo_provider: provider.to_string(),
        geo_url: Some(format!("{}/geo/{{ip}}/json", server.uri())),
        timeout_secs: 2,
        ..Config::default()
    }
}

#[tokio::test]
async fn resolves_public_ip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": "203.0.113.7" })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver_from_config(&config_for(&server, "ipapi")).unwrap();
    let ip = resolver.resolve_public_ip().await.unwrap();

    assert_eq!(ip, "203.0.113.7");
}

#[tokio::test]
async fn missing_ip_field_is_a_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "address": "203.0.113.7" })))
        .mount(&server)
        .await;

    let resolver = resolver_from_config(&config_for(&server, "ipapi")).unwrap();
    let err = resolver.resolve_public_ip().await.unwrap_err();

    assert!(matches!(err, TrackerError::ResponseFormat { .. }), "got {err:?}");
    assert!(err.classified_message().is_none());
}

#[tokio::test]
async fn non_json_body_is_a_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7"))
        .mount(&server)
        .await;

    let resolver = resolver_from_config(&config_for(&server, "ipapi")).unwrap();
    let err = resolver.resolve_public_ip().await.unwrap_err();

    assert!(matches!(err, TrackerError::ResponseFormat { .. }), "got {err:?}");
}

#[tokio::test]
async fn ipapi_lookup_feeds_the_normalizer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/8.8.8.8/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip": "8.8.8.8",
            "city": "Mountain View",
            "region": "California",
            "country_name": "United States",
            "latitude": 37.4,
            "longitude": -122.0,
            "org": "Google LLC",
            "timezone": "America/Los_Angeles",
            "postal": "94043"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = lookup_from_config(&config_for(&server, "ipapi")).unwrap();
    let raw = lookup.lookup_geo("8.8.8.8").await.unwrap();
    let record = normalize("8.8.8.8", &raw);

    assert_eq!(record.city.as_deref(), Some("Mountain View"));
    assert_eq!(record.coordinates(), Some((37.4, -122.0)));
}

#[tokio::test]
async fn ipinfo_lookup_feeds_the_normalizer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.1.1.1/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip": "1.1.1.1",
            "city": "Brisbane",
            "region": "Queensland",
            "country": "AU",
            "loc": "-27.4820,153.0136",
            "timezone": "Australia/Brisbane"
        })))
        .mount(&server)
        .await;

    let lookup = lookup_from_config(&config_for(&server, "ipinfo")).unwrap();
    let raw = lookup.lookup_geo("1.1.1.1").await.unwrap();
    let record = normalize("1.1.1.1", &raw);

    assert_eq!(record.country.as_deref(), Some("AU"));
    assert_eq!(record.coordinates(), Some((-27.482, 153.0136)));
}

#[tokio::test]
async fn rate_limit_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/8.8.8.8/json"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too many rapid requests"))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = lookup_from_config(&config_for(&server, "ipapi")).unwrap();
    let err = lookup.lookup_geo("8.8.8.8").await.unwrap_err();

    match &err {
        TrackerError::Http { status, body, .. } => {
            assert_eq!(*status, 429);
            assert_eq!(body, "Too many rapid requests");
        }
        other => panic!("expected an HTTP error, got {other:?}"),
    }
    assert!(err.classified_message().unwrap().starts_with("HTTP error:"));
}

#[tokio::test]
async fn ipapi_error_flag_still_yields_a_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/127.0.0.1/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip": "127.0.0.1",
            "error": true,
            "reason": "Reserved IP Address",
            "reserved": true
        })))
        .mount(&server)
        .await;

    let lookup = lookup_from_config(&config_for(&server, "ipapi")).unwrap();
    let raw = lookup.lookup_geo("127.0.0.1").await.unwrap();
    assert_eq!(raw.get("reason"), Some(&json!("Reserved IP Address")));

    let record = normalize("127.0.0.1", &raw);
    assert_eq!(
        format_record(&record),
        "IP: 127.0.0.1\nLocation: Unknown\nCoordinates: Unknown"
    );
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    // Bind and immediately release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let cfg = Config {
        public_ip_url: format!("http://127.0.0.1:{port}/ip"),
        timeout_secs: 2,
        ..Config::default()
    };

    let resolver = resolver_from_config(&cfg).unwrap();
    let err = resolver.resolve_public_ip().await.unwrap_err();

    assert!(matches!(err, TrackerError::Network { .. }), "got {err:?}");
    assert!(err.classified_message().unwrap().starts_with("Network error:"));
}
