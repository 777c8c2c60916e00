use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use valo_terminal::api::HttpSource;
use valo_terminal::config::AppConfig;
use valo_terminal::error::FetchError;
use valo_terminal::fetch::ResourceSource;
use valo_terminal::state::{Records, View};

/// Every source in this file shares the process-wide client, so they all use
/// the same one-second timeout.
fn source_for(base_url: &str) -> HttpSource {
    let config = AppConfig::from_lookup(|key| match key {
        "API_URL" => Some(base_url.to_string()),
        "REQUEST_TIMEOUT_SECS" => Some("1".to_string()),
        _ => None,
    });
    HttpSource::new(config.api)
}

fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 512];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Serve a single request with the given status line and body after `delay`.
fn serve_once(status: &'static str, body: &'static str, delay: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let addr = listener.local_addr().expect("listener address");
    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        read_request(&mut stream);
        thread::sleep(delay);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
    });
    format!("http://{addr}")
}

#[test]
fn ok_response_with_envelope_parses() {
    let base = serve_once(
        "200 OK",
        r#"{"data": [{"title": "Roster news", "description": "", "date": "June 1, 2025", "author": "staff", "url_path": "/1/news"}]}"#,
        Duration::ZERO,
    );
    let records = source_for(&base).fetch(View::News).expect("valid payload");
    let Records::News(items) = records else {
        panic!("expected news records");
    };
    assert_eq!(items[0].title, "Roster news");
}

#[test]
fn non_success_status_is_http_failure() {
    let base = serve_once("503 Service Unavailable", "", Duration::ZERO);
    let err = source_for(&base)
        .fetch(View::Matches)
        .expect_err("503 must fail");
    assert!(matches!(err, FetchError::Http { status: 503, .. }), "{err:?}");
    assert!(err.url().ends_with("/api/upcoming-matches"));
    assert!(!err.to_string().is_empty());
}

#[test]
fn slow_response_is_timeout() {
    let base = serve_once("200 OK", r#"{"data": []}"#, Duration::from_secs(3));
    let err = source_for(&base)
        .fetch(View::Live)
        .expect_err("response arrives after the timeout");
    assert!(matches!(err, FetchError::Timeout { secs: 1, .. }), "{err:?}");
    assert!(!err.to_string().is_empty());
}

#[test]
fn wrong_shape_on_success_is_malformed() {
    let base = serve_once("200 OK", r#"{"items": []}"#, Duration::ZERO);
    let err = source_for(&base)
        .fetch(View::Past)
        .expect_err("items is not the envelope");
    let FetchError::MalformedPayload { message, .. } = &err else {
        panic!("expected malformed payload, got {err:?}");
    };
    assert!(!message.is_empty());
}

#[test]
fn refused_connection_is_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);

    let err = source_for(&format!("http://{addr}"))
        .fetch(View::News)
        .expect_err("nothing is listening");
    let FetchError::Network { message, .. } = &err else {
        panic!("expected network failure, got {err:?}");
    };
    assert!(!message.is_empty());
}
