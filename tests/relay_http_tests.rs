// End-to-end relay tests: axum router against a mocked chat-completion API
// Author: kelexine (https://github.com/kelexine)

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use code_translator::config::AppConfig;
use code_translator::server::create_router;
use http_body_util::BodyExt;
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// OpenAI family streams with caller keys, DeepSeek buffers with a server key.
fn config_for(upstream_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.providers.openai.api_base_url = upstream_url.to_string();
    config.providers.openai.api_key = None;
    config.providers.deepseek.api_base_url = upstream_url.to_string();
    config.providers.deepseek.api_key = Some("server-key".to_string());
    config
}

fn app_for(upstream_url: &str) -> Router {
    create_router(config_for(upstream_url)).unwrap()
}

fn request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn call(
    app: Router,
    method: &str,
    uri: &str,
    body: impl Into<Body>,
) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.oneshot(request(method, uri, body)).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, bytes)
}

/// Single-connection upstream that reads one request, writes `head` and
/// `partial`, then keeps the socket open for `hold` before closing it.
///
/// Lets a test send a body shorter than its `Content-Length`, which mockito
/// cannot do.
async fn raw_upstream(head: &'static str, partial: &'static [u8], hold: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        read_request(&mut socket).await;
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(partial).await;
        let _ = socket.flush().await;
        tokio::time::sleep(hold).await;
    });

    format!("http://{}", addr)
}

/// Consume request headers plus a `Content-Length` body.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                return;
            }
        }
    }
}

fn translate_body(model: &str, code: &str, api_key: Option<&str>) -> String {
    let mut body = json!({
        "inputLanguage": "JavaScript",
        "outputLanguage": "Python",
        "inputCode": code,
        "model": model,
    });
    if let Some(key) = api_key {
        body["apiKey"] = json!(key);
    }
    body.to_string()
}

fn completion(content: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }]
    })
    .to_string()
}

fn json_body(bytes: &Bytes) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn test_non_post_is_rejected_with_405() {
    let mut server = Server::new_async().await;
    let upstream = server.mock("POST", "/chat/completions").expect(0).create_async().await;

    for (method, uri) in [("GET", "/translate"), ("PUT", "/api/translate"), ("DELETE", "/translate")] {
        let body = translate_body("deepseek-chat", "console.log(1)", None);
        let (status, _, bytes) = call(app_for(&server.url()), method, uri, body).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
        assert_eq!(json_body(&bytes), json!({ "error": "Method not allowed" }));
    }

    upstream.assert_async().await;
}

#[tokio::test]
async fn test_buffered_success_returns_code() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer server-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "deepseek-coder",
            "stream": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("bar()"))
        .create_async()
        .await;

    let body = translate_body("deepseek-coder", "bar();", None);
    let (status, headers, bytes) = call(app_for(&server.url()), "POST", "/translate", body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    assert_eq!(json_body(&bytes), json!({ "code": "bar()" }));
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_buffered_completion_is_sanitized() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion("```python\nbar()\n```\n\nExplanation: calls bar"))
        .create_async()
        .await;

    let body = translate_body("deepseek-chat", "bar();", None);
    let (status, _, bytes) = call(app_for(&server.url()), "POST", "/api/translate", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&bytes), json!({ "code": "bar()" }));
}

#[tokio::test]
async fn test_server_credential_ignores_caller_key() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer server-key")
        .with_status(200)
        .with_body(completion("x = 1"))
        .create_async()
        .await;

    let body = translate_body("deepseek-chat", "let x = 1;", Some("sk-caller"));
    let (status, _, _) = call(app_for(&server.url()), "POST", "/translate", body).await;

    assert_eq!(status, StatusCode::OK);
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_upstream_error_body_is_surfaced() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let body = translate_body("deepseek-chat", "bar();", None);
    let (status, _, bytes) = call(app_for(&server.url()), "POST", "/translate", body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = json_body(&bytes)["error"].as_str().unwrap().to_string();
    assert!(error.contains("rate limited"), "error was: {}", error);
}

#[tokio::test]
async fn test_missing_content_is_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(json!({ "choices": [] }).to_string())
        .create_async()
        .await;

    let body = translate_body("deepseek-chat", "bar();", None);
    let (status, _, bytes) = call(app_for(&server.url()), "POST", "/translate", body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = json_body(&bytes)["error"].as_str().unwrap().to_string();
    assert!(error.contains("choices[0].message.content"));
}

#[tokio::test]
async fn test_buffered_timeout_is_distinct_from_upstream_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(std::time::Duration::from_millis(1500));
            w.write_all(completion("late()").as_bytes())
        })
        .create_async()
        .await;

    let mut config = config_for(&server.url());
    config.providers.deepseek.timeout_seconds = 1;
    let app = create_router(config).unwrap();

    let body = translate_body("deepseek-chat", "late();", None);
    let (status, _, bytes) = call(app, "POST", "/translate", body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = json_body(&bytes)["error"].as_str().unwrap().to_string();
    assert!(error.contains("timed out"), "error was: {}", error);
}

#[tokio::test]
async fn test_stream_is_relayed_byte_for_byte() {
    let chunks: [&[u8]; 4] = [
        b"data: {\"choices\":[{\"delta\":{\"content\":\"print\"}}]}\n\n",
        b"data: {\"choices\":[{\"delta\":{\"content\":\"(1)\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"# ünïcödé\"}}]}\n\n".as_bytes(),
        b"data: [DONE]\n\n",
    ];
    let expected: Vec<u8> = chunks.concat();

    let mut server = Server::new_async().await;
    let upstream = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-caller")
        .match_body(Matcher::PartialJson(json!({ "model": "gpt-4-turbo", "stream": true })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_chunked_body(move |w| {
            for chunk in chunks {
                w.write_all(chunk)?;
                w.flush()?;
            }
            Ok(())
        })
        .create_async()
        .await;

    let body = translate_body("gpt-4-turbo", "console.log(1)", Some("sk-caller"));
    let (status, headers, bytes) = call(app_for(&server.url()), "POST", "/translate", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(bytes.as_ref(), expected.as_slice());
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_stream_upstream_error_before_headers() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
        .create_async()
        .await;

    let body = translate_body("gpt-4-turbo", "console.log(1)", Some("sk-wrong"));
    let (status, headers, bytes) = call(app_for(&server.url()), "POST", "/translate", body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let error = json_body(&bytes)["error"].as_str().unwrap().to_string();
    assert!(error.contains("Incorrect API key provided"));
}

#[tokio::test]
async fn test_input_over_tier_limit_never_reaches_upstream() {
    let mut server = Server::new_async().await;
    let upstream = server.mock("POST", "/chat/completions").expect(0).create_async().await;

    // gpt-3.5-turbo is the basic tier
    let body = translate_body("gpt-3.5-turbo", &"a".repeat(6001), Some("sk-caller"));
    let (status, _, bytes) = call(app_for(&server.url()), "POST", "/translate", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(&bytes)["error"].as_str().unwrap().contains("6000"));

    // deepseek-chat is the standard tier
    let body = translate_body("deepseek-chat", &"a".repeat(12001), None);
    let (status, _, _) = call(app_for(&server.url()), "POST", "/translate", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    upstream.assert_async().await;
}

#[tokio::test]
async fn test_unknown_model_never_reaches_upstream() {
    let mut server = Server::new_async().await;
    let upstream = server.mock("POST", "/chat/completions").expect(0).create_async().await;

    let body = translate_body("gpt-9-omega", "console.log(1)", Some("sk-caller"));
    let (status, _, bytes) = call(app_for(&server.url()), "POST", "/translate", body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(&bytes)["error"]
        .as_str()
        .unwrap()
        .contains("Unsupported model: gpt-9-omega"));
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_missing_caller_key_never_reaches_upstream() {
    let mut server = Server::new_async().await;
    let upstream = server.mock("POST", "/chat/completions").expect(0).create_async().await;

    let body = translate_body("gpt-4-turbo", "console.log(1)", None);
    let (status, _, bytes) = call(app_for(&server.url()), "POST", "/translate", body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(&bytes)["error"].as_str().unwrap().contains("apiKey"));
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_malformed_body_is_a_500() {
    let server = Server::new_async().await;

    for body in ["", "{not json", r#"{"inputLanguage":"Go"}"#] {
        let (status, _, bytes) =
            call(app_for(&server.url()), "POST", "/translate", body.to_string()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "body: {:?}", body);
        assert!(json_body(&bytes)["error"].is_string());
    }

    // Not UTF-8 at all
    let (status, headers, bytes) =
        call(app_for(&server.url()), "POST", "/translate", vec![0xffu8, 0xfe, b'{']).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    assert!(json_body(&bytes)["error"].is_string());
}

#[tokio::test]
async fn test_oversize_body_is_a_500_on_post_and_405_otherwise() {
    let mut server = Server::new_async().await;
    let upstream = server.mock("POST", "/chat/completions").expect(0).create_async().await;

    let mut config = config_for(&server.url());
    config.server.max_body_bytes = 100;
    let body = translate_body("deepseek-chat", &"a".repeat(200), None);

    let (status, headers, bytes) =
        call(create_router(config.clone()).unwrap(), "POST", "/translate", body.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    assert!(json_body(&bytes)["error"].is_string());

    let (status, _, bytes) = call(create_router(config).unwrap(), "GET", "/translate", body).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json_body(&bytes), json!({ "error": "Method not allowed" }));

    upstream.assert_async().await;
}

#[tokio::test]
async fn test_stream_stalled_error_body_times_out() {
    let upstream = raw_upstream(
        "HTTP/1.1 429 Too Many Requests\r\nContent-Type: text/plain\r\nContent-Length: 100\r\n\r\n",
        b"rate",
        Duration::from_secs(10),
    )
    .await;

    let mut config = config_for(&upstream);
    config.providers.openai.timeout_seconds = 1;
    let app = create_router(config).unwrap();

    let body = translate_body("gpt-4-turbo", "console.log(1)", Some("sk-caller"));
    let (status, _, bytes) = tokio::time::timeout(
        Duration::from_secs(5),
        call(app, "POST", "/translate", body),
    )
    .await
    .expect("stream call should be bounded by timeout_seconds");

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = json_body(&bytes)["error"].as_str().unwrap().to_string();
    assert!(error.contains("timed out"), "error was: {}", error);
}

#[tokio::test]
async fn test_stream_failure_after_headers_ends_body() {
    let upstream = raw_upstream(
        "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nContent-Length: 100\r\n\r\n",
        b"data: {\"choices\":[]}\n\n",
        Duration::ZERO,
    )
    .await;

    let body = translate_body("gpt-4-turbo", "console.log(1)", Some("sk-caller"));
    let response = app_for(&upstream)
        .oneshot(request("POST", "/translate", body))
        .await
        .unwrap();

    // Headers were already committed when the upstream broke off
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert!(response.into_body().collect().await.is_err());
}

#[tokio::test]
async fn test_health_reports_providers() {
    let server = Server::new_async().await;
    let (status, _, bytes) = call(app_for(&server.url()), "GET", "/health", String::new()).await;

    assert_eq!(status, StatusCode::OK);
    let health = json_body(&bytes);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["checks"]["provider_openai"]["status"], "ok");
    assert_eq!(health["checks"]["provider_deepseek"]["status"], "ok");
}
