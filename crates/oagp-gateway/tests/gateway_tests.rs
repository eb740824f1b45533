use oagp_core::error::{DiscoveryError, GenerationError};
use oagp_core::{FormState, GenerationApi, Mode, SpecFetcher, SpecSource};
use oagp_gateway::ApiGateway;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DISCOVERY: &str = include_str!("fixtures/swagger-generator.json");

fn gateway(server: &MockServer) -> ApiGateway {
    ApiGateway::builder()
        .base_url(format!("{}/api", server.uri()))
        .build()
        .unwrap()
}

async fn mount_discovery(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/swagger.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DISCOVERY))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_languages_reads_both_lists() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;

    let catalog = gateway(&server).fetch_languages().await.unwrap();

    assert_eq!(catalog.client, ["java", "python", "typescript-fetch"]);
    assert_eq!(catalog.server, ["spring", "nodejs-server"]);
}

#[tokio::test]
async fn fetch_languages_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/swagger.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = gateway(&server).fetch_languages().await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Status { status: 503 }));
}

#[tokio::test]
async fn fetch_languages_rejects_unexpected_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/swagger.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"paths": {}})))
        .mount(&server)
        .await;

    let err = gateway(&server).fetch_languages().await.unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"discovery document is missing paths["/gen/clients/{language}"]"#
    );
}

#[tokio::test]
async fn fetch_languages_network_failure() {
    // Reserve a port, then release it so nothing is listening there.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let gateway = ApiGateway::builder()
        .base_url(format!("http://{addr}/api"))
        .build()
        .unwrap();

    let err = gateway.fetch_languages().await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Transport(_)));
}

#[tokio::test]
async fn generate_network_failure() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let gateway = ApiGateway::builder()
        .base_url(format!("http://{addr}/api"))
        .build()
        .unwrap();

    let err = gateway
        .generate_client("java", &json!({"openapi": "3.0.0"}))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Transport(_)));
    assert!(err.to_string().starts_with("failed to reach generation endpoint"));
}

#[tokio::test]
async fn generate_client_posts_spec_and_returns_link() {
    let server = MockServer::start().await;
    let spec = json!({"openapi": "3.0.0", "info": {"title": "Petstore", "version": "1"}});

    Mock::given(method("POST"))
        .and(path("/api/gen/clients/java"))
        .and(body_json(json!({ "spec": spec })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "abc-123",
            "link": "https://generator.swagger.io/api/gen/download/abc-123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = gateway(&server).generate_client("java", &spec).await.unwrap();

    assert_eq!(
        result.link,
        "https://generator.swagger.io/api/gen/download/abc-123"
    );
    assert_eq!(result.code.as_deref(), Some("abc-123"));
}

#[tokio::test]
async fn generate_dispatches_server_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/gen/servers/spring"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"link": "https://example.com/s.zip"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = gateway(&server)
        .generate(Mode::Server, "spring", &json!({}))
        .await
        .unwrap();
    assert_eq!(result.link, "https://example.com/s.zip");
}

#[tokio::test]
async fn generate_surfaces_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/gen/clients/java"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 400,
            "type": "error",
            "message": "The swagger specification supplied was not valid"
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .generate_client("java", &json!({}))
        .await
        .unwrap_err();

    match err {
        GenerationError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "The swagger specification supplied was not valid");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn generate_rejects_response_without_link() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/gen/clients/java"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "abc"})))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .generate_client("java", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Decode(_)));
}

#[tokio::test]
async fn fetch_spec_returns_body_or_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/specs/petstore.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"openapi\": \"3.0.0\"}"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/specs/private.json"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let body = gateway
        .fetch_spec(&format!("{}/specs/petstore.json", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "{\"openapi\": \"3.0.0\"}");

    let reason = gateway
        .fetch_spec(&format!("{}/specs/private.json", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(reason, "HTTP 403 Forbidden");
}

#[tokio::test]
async fn form_round_trip_against_mock_service() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/gen/servers/nodejs-server"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"link": "https://example.com/n.zip"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let mut form = FormState::new();
    form.load_catalog(gateway.fetch_languages().await).unwrap();
    form.set_mode(Mode::Server);
    form.select_language("nodejs-server");
    form.set_source(SpecSource::Paste);
    form.set_paste(r#"{"openapi": "3.0.0", "paths": {}}"#);

    let result = form.submit(&gateway, &gateway).await.unwrap();
    assert_eq!(result.link, "https://example.com/n.zip");
    assert_eq!(form.result().unwrap().link, "https://example.com/n.zip");
}
