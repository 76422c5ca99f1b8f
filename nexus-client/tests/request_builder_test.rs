use base64::{engine::general_purpose::STANDARD, Engine as _};
use nexus_client::{HttpMethod, ProxySpec, RequestBuilder};
use nexus_config::Authorization;
use nexus_core::NexusError;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A request as seen on the wire.
struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Answer exactly one request on a loopback port with `status`.
fn serve_once(status: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("should bind loopback");
    let addr = listener.local_addr().expect("should have address");

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("should accept");
        let mut reader = BufReader::new(stream.try_clone().expect("should clone stream"));

        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("request line");

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("header line");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.split_once(':') {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        let length = headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = vec![0; length];
        reader.read_exact(&mut body).expect("body");

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
            status
        )
        .expect("should respond");

        Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body,
        }
    });

    (format!("http://{}", addr), handle)
}

#[test]
fn test_get_sends_user_agent_and_authorization() {
    let (base, server) = serve_once("200 OK");
    let builder = RequestBuilder::new(format!("{}/repository/gems", base))
        .with_authorization(Authorization::basic("alice", "s3cret"));

    let response = builder
        .make_request_with(HttpMethod::Get, "api/v1/gems", |req| builder.authorize(req))
        .expect("request should succeed");
    assert_eq!(response.status().as_u16(), 200);

    let captured = server.join().expect("server thread");
    assert_eq!(
        captured.request_line,
        "GET /repository/gems/api/v1/gems HTTP/1.1"
    );
    assert_eq!(
        captured.header("authorization"),
        Some("Basic YWxpY2U6czNjcmV0")
    );
    assert!(captured
        .header("user-agent")
        .is_some_and(|agent| agent.starts_with("nexus-gem/")));
}

#[test]
fn test_authorization_only_sent_when_requested() {
    let (base, server) = serve_once("200 OK");
    let builder = RequestBuilder::new(base)
        .with_authorization(Authorization::Token("secret-token".into()))
        .without_user_agent();

    builder
        .make_request(HttpMethod::Delete, "gems/foo-1.0.gem")
        .expect("request should succeed");

    let captured = server.join().expect("server thread");
    assert_eq!(captured.request_line, "DELETE /gems/foo-1.0.gem HTTP/1.1");
    assert_eq!(captured.header("authorization"), None);
    assert_eq!(captured.header("user-agent"), None);
}

#[test]
fn test_post_carries_customized_body() {
    let (base, server) = serve_once("201 Created");
    let builder = RequestBuilder::new(base);

    let response = builder
        .make_request_with(HttpMethod::Post, "gems/foo-1.0.gem", |req| {
            req.header("Content-Type", "application/octet-stream")
                .body(b"gem-bytes".to_vec())
        })
        .expect("request should succeed");
    assert_eq!(response.status().as_u16(), 201);

    let captured = server.join().expect("server thread");
    assert_eq!(captured.request_line, "POST /gems/foo-1.0.gem HTTP/1.1");
    assert_eq!(
        captured.header("content-type"),
        Some("application/octet-stream")
    );
    assert_eq!(captured.body, b"gem-bytes");
}

#[test]
fn test_error_status_is_returned_not_raised() {
    let (base, server) = serve_once("401 Unauthorized");
    let response = RequestBuilder::new(base)
        .make_request(HttpMethod::Get, "api/v1/gems")
        .expect("status codes are not errors");
    assert_eq!(response.status().as_u16(), 401);
    server.join().expect("server thread");
}

#[test]
fn test_requests_go_through_the_proxy() {
    let (proxy_base, server) = serve_once("200 OK");
    let port = proxy_base
        .rsplit(':')
        .next()
        .and_then(|p| p.parse::<u16>().ok())
        .expect("loopback port");
    let proxy = ProxySpec {
        host: "127.0.0.1".into(),
        port,
        user: Some("gilbert".into()),
        password: Some("sekret".into()),
    };

    RequestBuilder::new("http://gems.example.invalid/repo")
        .with_proxy(Some(proxy))
        .make_request(HttpMethod::Get, "api/v1/gems")
        .expect("request should reach the proxy");

    let captured = server.join().expect("server thread");
    assert_eq!(
        captured.request_line,
        "GET http://gems.example.invalid/repo/api/v1/gems HTTP/1.1"
    );
    let expected = format!("Basic {}", STANDARD.encode("gilbert:sekret"));
    assert_eq!(
        captured.header("proxy-authorization"),
        Some(expected.as_str())
    );
}

#[test]
fn test_unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("should bind loopback");
    let addr = listener.local_addr().expect("should have address");
    drop(listener);

    let result = RequestBuilder::new(format!("http://{}", addr))
        .with_timeout(Duration::from_secs(5))
        .make_request(HttpMethod::Get, "api/v1/gems");
    assert!(matches!(result, Err(NexusError::Transport(_))));
}
