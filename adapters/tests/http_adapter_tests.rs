//! HTTP adapter tests against a local mock server

use adapters::{connector::Headers, Error, ProtocolAdapter};
use adapters::rest::RestAdapter;
use adapters::soap::SoapAdapter;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn rest_defaults_to_post_with_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = RestAdapter::new(5).unwrap();
    let outcome = adapter
        .send(
            &format!("{}/orders", server.uri()),
            "",
            &Headers::new(),
            br#"{"id":1}"#,
        )
        .await
        .unwrap();

    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body, b"accepted");
}

#[tokio::test]
async fn rest_uses_action_as_http_verb() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/orders/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = RestAdapter::new(5).unwrap();
    let outcome = adapter
        .send(
            &format!("{}/orders/1", server.uri()),
            "PATCH",
            &Headers::new(),
            b"",
        )
        .await
        .unwrap();

    assert_eq!(outcome.status, 204);
}

#[tokio::test]
async fn rest_explicit_content_type_is_not_overridden() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("content-type", "text/plain"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "text/plain".to_string());

    let adapter = RestAdapter::new(5).unwrap();
    adapter
        .send(&server.uri(), "", &headers, b"raw text")
        .await
        .unwrap();
}

#[tokio::test]
async fn rest_error_status_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let adapter = RestAdapter::new(5).unwrap();
    let err = adapter
        .send(&server.uri(), "", &Headers::new(), b"{}")
        .await
        .unwrap_err();

    match err {
        Error::Http { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected Http error, got {other}"),
    }
}

#[tokio::test]
async fn soap_wraps_body_and_sets_action_header() {
    let server = MockServer::start().await;
    let response_envelope = "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <soap:Body><Ack>confirmed</Ack></soap:Body></soap:Envelope>";

    Mock::given(method("POST"))
        .and(header("SOAPAction", "/services/order"))
        .and(header("content-type", "text/xml; charset=utf-8"))
        .and(body_string_contains("<soap:Body><CreateOrder/></soap:Body>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response_envelope))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = SoapAdapter::new(5).unwrap();
    let outcome = adapter
        .send(
            &server.uri(),
            "/services/order",
            &Headers::new(),
            b"<CreateOrder/>",
        )
        .await
        .unwrap();

    // The inner envelope body comes back unwrapped
    assert_eq!(outcome.body, b"<Ack>confirmed</Ack>");
}

#[tokio::test]
async fn soap_malformed_success_response_returns_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not xml at all"))
        .mount(&server)
        .await;

    let adapter = SoapAdapter::new(5).unwrap();
    let outcome = adapter
        .send(&server.uri(), "", &Headers::new(), b"<Ping/>")
        .await
        .unwrap();

    assert_eq!(outcome.body, b"not xml at all");
}

#[tokio::test]
async fn soap_error_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("fault"))
        .mount(&server)
        .await;

    let adapter = SoapAdapter::new(5).unwrap();
    let err = adapter
        .send(&server.uri(), "", &Headers::new(), b"<Ping/>")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Http { status: 500, .. }));
}
