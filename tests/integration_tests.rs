//! Integration tests using wiremock to simulate HTTP servers.

use http::Method;
use restcall::{ConvertError, Error, NoContent, ParameterEncoding, Request, RestClient};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestValue {
    value: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct TestXml {
    value: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct TestXmlEntry {
    name: String,
}

fn client_for(mock_server: &MockServer) -> RestClient {
    RestClient::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_successful_get_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get/user/id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"value":"success"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.get::<TestValue>("/get/user/id").await.unwrap();

    assert_eq!(response.value.value, "success");
    assert_eq!(response.status.as_u16(), 200);
}

#[tokio::test]
async fn test_json_body_round_trip() {
    let mock_server = MockServer::start().await;

    let sent = TestValue {
        value: "original".to_string(),
    };

    // The server echoes the structured value back.
    Mock::given(method("PUT"))
        .and(path("/put/user/id"))
        .and(body_json(&sent))
        .and(header("Content-Type", "application/json"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&sent))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .put::<TestValue, TestValue>("/put/user/id", &sent)
        .await
        .unwrap();

    assert_eq!(response.value, sent);
    assert_eq!(response.status.as_u16(), 200);
}

#[tokio::test]
async fn test_json_body_forces_negotiation_headers() {
    let mock_server = MockServer::start().await;

    let body = TestValue {
        value: "data".to_string(),
    };

    // Caller-set Accept/Content-Type must lose to the JSON body rules.
    Mock::given(method("POST"))
        .and(path("/post/user/id"))
        .and(header("Content-Type", "application/json"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = Request::<TestValue>::builder(Method::POST)
        .path("/post/user/id")
        .header("Content-Type", "text/plain")
        .unwrap()
        .header("Accept", "text/plain")
        .unwrap()
        .json_body(&body)
        .unwrap()
        .build();

    let response = client.execute(&request).await.unwrap();
    assert_eq!(response.value, body);
}

#[tokio::test]
async fn test_text_body_sent_verbatim_without_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/user/id"))
        .and(body_string("Lorem ipsum dolar et selum"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = Request::<String>::builder(Method::POST)
        .path("/upload/user/id")
        .text_body("Lorem ipsum dolar et selum")
        .build();

    let response = client.execute(&request).await.unwrap();
    assert_eq!(response.value, "OK");

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn test_bytes_body_sent_as_opaque_entity() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/user/id"))
        .and(body_string("raw bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = Request::<String>::builder(Method::POST)
        .path("/upload/user/id")
        .bytes_body("raw bytes".as_bytes().to_vec())
        .build();

    let response = client.execute(&request).await.unwrap();
    assert_eq!(response.value, "OK");
}

async fn mount_success(mock_server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path("/put/user/id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"value":"success"}"#, "application/json"),
        )
        .mount(mock_server)
        .await;
}

async fn received_query(mock_server: &MockServer) -> Option<String> {
    let requests = mock_server.received_requests().await.unwrap();
    requests[0].url.query().map(ToOwned::to_owned)
}

#[tokio::test]
async fn test_duplicate_parameter_encoding() {
    let mock_server = MockServer::start().await;
    mount_success(&mock_server).await;

    let client = client_for(&mock_server);
    let request = Request::<TestValue>::builder(Method::PUT)
        .path("/put/user/id")
        .parameter_values("param", ["param-value-1", "param-value-2"])
        .parameter_encoding(ParameterEncoding::Duplicate)
        .build();

    client.execute(&request).await.unwrap();

    assert_eq!(
        received_query(&mock_server).await.as_deref(),
        Some("param=param-value-1&param=param-value-2")
    );
}

#[tokio::test]
async fn test_indexed_array_parameter_encoding() {
    let mock_server = MockServer::start().await;
    mount_success(&mock_server).await;

    let client = client_for(&mock_server);
    let request = Request::<TestValue>::builder(Method::PUT)
        .path("/put/user/id")
        .parameter_values("param", ["param-value-1", "param-value-2"])
        .parameter_encoding(ParameterEncoding::IndexedArray)
        .build();

    client.execute(&request).await.unwrap();

    assert_eq!(
        received_query(&mock_server).await.as_deref(),
        Some("param%5B0%5D=param-value-1&param%5B1%5D=param-value-2")
    );
}

#[tokio::test]
async fn test_indexed_array_leaves_single_value_unindexed() {
    let mock_server = MockServer::start().await;
    mount_success(&mock_server).await;

    let client = client_for(&mock_server);
    let request = Request::<TestValue>::builder(Method::PUT)
        .path("/put/user/id")
        .parameter_values("param", ["param-value-1"])
        .parameter_encoding(ParameterEncoding::IndexedArray)
        .build();

    client.execute(&request).await.unwrap();

    assert_eq!(
        received_query(&mock_server).await.as_deref(),
        Some("param=param-value-1")
    );
}

#[tokio::test]
async fn test_overwrite_parameter_encoding() {
    let mock_server = MockServer::start().await;
    mount_success(&mock_server).await;

    let client = client_for(&mock_server);
    let request = Request::<TestValue>::builder(Method::PUT)
        .path("/put/user/id")
        .parameter_values("param", ["param-value-1", "param-value-2"])
        .parameter_encoding(ParameterEncoding::Overwrite)
        .build();

    client.execute(&request).await.unwrap();

    assert_eq!(
        received_query(&mock_server).await.as_deref(),
        Some("param=param-value-1")
    );
}

#[tokio::test]
async fn test_parameter_encoding_defaults_to_overwrite() {
    let mock_server = MockServer::start().await;
    mount_success(&mock_server).await;

    let client = client_for(&mock_server);
    let request = Request::<TestValue>::builder(Method::PUT)
        .path("/put/user/id")
        .parameter_values("param", ["param-value-1", "param-value-2"])
        .build();

    client.execute(&request).await.unwrap();

    assert_eq!(
        received_query(&mock_server).await.as_deref(),
        Some("param=param-value-1")
    );
}

#[tokio::test]
async fn test_parameters_keep_insertion_order() {
    let mock_server = MockServer::start().await;
    mount_success(&mock_server).await;

    let client = client_for(&mock_server);
    // Re-setting "b" replaces its value but keeps its original position.
    let request = Request::<TestValue>::builder(Method::PUT)
        .path("/put/user/id")
        .parameter("b", "old")
        .parameter("a", "1")
        .parameter("b", "2")
        .build();

    client.execute(&request).await.unwrap();

    assert_eq!(received_query(&mock_server).await.as_deref(), Some("b=2&a=1"));
}

#[tokio::test]
async fn test_empty_parameter_values_are_skipped() {
    let mock_server = MockServer::start().await;
    mount_success(&mock_server).await;

    let client = client_for(&mock_server);
    let request = Request::<TestValue>::builder(Method::PUT)
        .path("/put/user/id")
        .parameter_values("empty", Vec::<String>::new())
        .parameter("present", "1")
        .build();

    client.execute(&request).await.unwrap();

    assert_eq!(received_query(&mock_server).await.as_deref(), Some("present=1"));
}

#[tokio::test]
async fn test_no_parameters_appends_no_query_string() {
    let mock_server = MockServer::start().await;
    mount_success(&mock_server).await;

    let client = client_for(&mock_server);
    let request = Request::<TestValue>::builder(Method::PUT)
        .path("/put/user/id")
        .build();

    client.execute(&request).await.unwrap();

    assert_eq!(received_query(&mock_server).await, None);
}

#[tokio::test]
async fn test_path_without_leading_slash() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get/user/id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"value":"success"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.get::<TestValue>("get/user/id").await.unwrap();

    assert_eq!(response.value.value, "success");
}

#[tokio::test]
async fn test_response_failure_carries_full_context() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get/user/id"))
        .respond_with(
            ResponseTemplate::new(404).set_body_raw(r#"{"value":"not found"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get::<TestValue>("/get/user/id").await;

    match result {
        Err(Error::Response(response)) => {
            assert_eq!(response.status.as_u16(), 404);
            assert_eq!(response.status_text(), "Not Found");
            assert_eq!(response.content_type.as_deref(), Some("application/json"));
            assert_eq!(response.body, r#"{"value":"not found"}"#);

            // The stored body decodes after the fact under the same rules.
            let decoded = response.decode_body::<TestValue>().unwrap();
            assert_eq!(decoded.value, "not found");
        }
        other => panic!("Expected Response error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_body_redecoding_failure_keeps_both_contexts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get/user/id"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(r#"{"BOOM"}"#, "application/json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get::<TestValue>("/get/user/id").await;

    let response = match result {
        Err(Error::Response(response)) => response,
        other => panic!("Expected Response error, got {:?}", other),
    };
    assert_eq!(response.status.as_u16(), 500);

    match response.decode_body::<TestValue>() {
        Err(ConvertError::ErrorBody { source, response }) => {
            assert!(matches!(*source, ConvertError::Json { .. }));
            assert_eq!(response.status.as_u16(), 500);
            assert_eq!(response.body, r#"{"BOOM"}"#);
        }
        other => panic!("Expected ErrorBody error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_failure_names_the_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/timeout"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"value":"late"}"#, "application/json")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = RestClient::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let result = client.get::<TestValue>("/api/timeout").await;

    match result {
        Err(error @ Error::Timeout { .. }) => {
            let expected_url = format!("{}/api/timeout", mock_server.uri());
            assert!(
                error.to_string().contains(&expected_url),
                "message should contain the URL: {}",
                error
            );
        }
        other => panic!("Expected Timeout error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_timeout_when_response_is_fast_enough() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/no-timeout"))
        .respond_with(ResponseTemplate::new(200).set_body_string("success"))
        .mount(&mock_server)
        .await;

    let client = RestClient::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let response = client.get::<String>("/api/no-timeout").await.unwrap();
    assert_eq!(response.value, "success");
}

#[tokio::test]
async fn test_transport_failure_names_the_url() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    // Shutting the server down makes the next call fail at the socket.
    drop(mock_server);

    let client = RestClient::builder()
        .base_url(&uri)
        .unwrap()
        .build()
        .unwrap();

    let result = client.get::<TestValue>("/get/user/id").await;

    match result {
        Err(error @ Error::Transport { .. }) => {
            let expected_url = format!("{}/get/user/id", uri);
            assert!(
                error.to_string().contains(&expected_url),
                "message should contain the URL: {}",
                error
            );
        }
        other => panic!("Expected Transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_content_target_succeeds_on_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fire/and/forget"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = Request::<NoContent>::builder(Method::GET)
        .path("/fire/and/forget")
        .build();

    let response = client.execute(&request).await.unwrap();
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.value, NoContent);
}

#[tokio::test]
async fn test_no_content_target_ignores_a_present_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/fire/and/forget"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"value":"ignored"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.delete::<NoContent>("/fire/and/forget").await.unwrap();

    assert_eq!(response.value, NoContent);
}

#[tokio::test]
async fn test_empty_body_fails_when_a_value_is_required() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get/user/id"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get::<TestValue>("/get/user/id").await;

    match result {
        Err(Error::Conversion(ConvertError::BodyMissing { target })) => {
            assert!(target.contains("TestValue"));
        }
        other => panic!("Expected BodyMissing error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_body_fails_even_for_string_targets() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get/user/id"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    // The empty-body rule aborts the chain before the string converter,
    // which would otherwise have accepted the empty body.
    let result = client.get::<String>("/get/user/id").await;

    assert!(matches!(
        result,
        Err(Error::Conversion(ConvertError::BodyMissing { .. }))
    ));
}

#[tokio::test]
async fn test_legacy_json_under_text_plain_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/legacy"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"value":"legacy"}"#, "text/plain"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.get::<TestValue>("/legacy").await.unwrap();

    assert_eq!(response.value.value, "legacy");
}

#[tokio::test]
async fn test_legacy_json_without_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/legacy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"["a","b"]"#))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.get::<Vec<String>>("/legacy").await.unwrap();

    assert_eq!(response.value, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn test_string_target_gets_the_raw_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<h1>hello</h1>", "text/html"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.get::<String>("/page").await.unwrap();

    assert_eq!(response.value, "<h1>hello</h1>");
}

#[tokio::test]
async fn test_xml_response_decoding() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/xml/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<TestXml><value>success</value></TestXml>", "text/xml"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    // Two calls for the same target type share the cached decoder.
    let first = client.get::<TestXml>("/xml/user").await.unwrap();
    let second = client.get::<TestXml>("/xml/user").await.unwrap();
    assert_eq!(first.value.value, "success");
    assert_eq!(second.value.value, "success");
}

#[tokio::test]
async fn test_xml_decoding_for_a_second_target_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/xml/entry"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<entry><name>first</name></entry>", "text/xml"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.get::<TestXmlEntry>("/xml/entry").await.unwrap();

    assert_eq!(response.value.name, "first");
}

#[tokio::test]
async fn test_malformed_xml_is_a_conversion_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/xml/user"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<TestXml><value>", "text/xml"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get::<TestXml>("/xml/user").await;

    assert!(matches!(
        result,
        Err(Error::Conversion(ConvertError::Xml { .. }))
    ));
}

#[tokio::test]
async fn test_malformed_json_is_a_conversion_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get/user/id"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get::<TestValue>("/get/user/id").await;

    match result {
        Err(Error::Conversion(ConvertError::Json { body, .. })) => {
            assert_eq!(body, "not json");
        }
        other => panic!("Expected Json conversion error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unhandled_body_is_a_conversion_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blob"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("BLOB", "application/octet-stream"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get::<TestValue>("/blob").await;

    match result {
        Err(Error::Conversion(ConvertError::NoConverter {
            body,
            content_type,
            target,
        })) => {
            assert_eq!(body, "BLOB");
            assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
            assert!(target.contains("TestValue"));
        }
        other => panic!("Expected NoConverter error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_headers_override_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get/user/id"))
        .and(header("X-Source", "request-level"))
        .and(header("User-Agent", "restcall-tests"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"value":"success"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let client = RestClient::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .default_header("User-Agent", "restcall-tests")
        .unwrap()
        .default_header("X-Source", "client-level")
        .unwrap()
        .build()
        .unwrap();

    // Last write wins within the request too.
    let request = Request::<TestValue>::builder(Method::GET)
        .path("/get/user/id")
        .header("X-Source", "stale")
        .unwrap()
        .header("X-Source", "request-level")
        .unwrap()
        .build();

    let response = client.execute(&request).await.unwrap();
    assert_eq!(response.value.value, "success");
}

#[tokio::test]
async fn test_attributes_are_not_transmitted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get/user/id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"value":"success"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = Request::<TestValue>::builder(Method::GET)
        .path("/get/user/id")
        .attribute("trace-id", "abc-123".to_string())
        .build();

    // Attributes stay readable on the descriptor...
    assert_eq!(
        request.attributes().get::<String>("trace-id"),
        Some(&"abc-123".to_string())
    );

    client.execute(&request).await.unwrap();

    // ...but never reach the wire.
    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("trace-id").is_none());
    assert!(requests[0].url.query().is_none());
}

#[tokio::test]
async fn test_descriptor_is_reusable_across_concurrent_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get/user/id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"value":"success"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = Request::<TestValue>::builder(Method::GET)
        .path("/get/user/id")
        .build();

    let (first, second) = tokio::join!(client.execute(&request), client.execute(&request));
    assert_eq!(first.unwrap().value.value, "success");
    assert_eq!(second.unwrap().value.value, "success");
}

#[tokio::test]
async fn test_all_http_methods() {
    let mock_server = MockServer::start().await;

    let data = TestValue {
        value: "ok".to_string(),
    };

    for verb in ["GET", "POST", "PUT", "DELETE", "PATCH"] {
        Mock::given(method(verb))
            .and(path("/test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&data))
            .mount(&mock_server)
            .await;
    }

    let client = client_for(&mock_server);

    assert_eq!(client.get::<TestValue>("/test").await.unwrap().value, data);
    assert_eq!(
        client.post::<_, TestValue>("/test", &data).await.unwrap().value,
        data
    );
    assert_eq!(
        client.put::<_, TestValue>("/test", &data).await.unwrap().value,
        data
    );
    assert_eq!(client.delete::<TestValue>("/test").await.unwrap().value, data);
    assert_eq!(
        client.patch::<_, TestValue>("/test", &data).await.unwrap().value,
        data
    );
}
