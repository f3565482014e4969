//! HttpTransport against a loopback server

use hanzo_parselite::{
    ErrorKind, ExtractError, HttpTransport, Resolver, ResolverConfig, Transport,
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one canned response per connection
async fn serve(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{}", addr)
}

/// Accept connections and never answer
async fn silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

/// Write a partial response, then keep the connection open without finishing it
async fn stall_after(partial: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(partial.as_bytes()).await;
            let _ = socket.flush().await;
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

const PAGE: &str = "HTTP/1.1 200 OK\r\n\
Content-Type: text/html\r\n\
Content-Length: 79\r\n\
Connection: close\r\n\
\r\n\
<html><body><main><h1>Title</h1><p>Loopback body text.</p></main></body></html>";

const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\n\
Content-Length: 0\r\n\
Connection: close\r\n\
\r\n";

#[tokio::test]
async fn test_status_is_returned_not_raised() {
    let base = serve(NOT_FOUND).await;
    let session = HttpTransport::default().open_session().unwrap();

    let body = session
        .get(&format!("{}/missing", base), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(body.status, 404);
    assert!(!body.is_success());
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let base = silent().await;
    let session = HttpTransport::default().open_session().unwrap();

    let err = session
        .get(&base, Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Timeout(_)));
}

#[tokio::test]
async fn test_body_cap_enforced() {
    let base = serve(PAGE).await;
    let config = ResolverConfig {
        max_body_bytes: 16,
        ..ResolverConfig::default()
    };
    let session = HttpTransport::new(&config).open_session().unwrap();

    let err = session.get(&base, Duration::from_secs(5)).await.unwrap_err();
    assert!(matches!(err, ExtractError::ContentTooLarge { .. }));
}

#[tokio::test]
async fn test_body_cap_enforced_on_chunked_stream() {
    let chunk = "x".repeat(100);
    let partial = format!(
        "HTTP/1.1 200 OK\r\n\
Content-Type: text/html\r\n\
Transfer-Encoding: chunked\r\n\
\r\n\
{:x}\r\n{}\r\n",
        chunk.len(),
        chunk
    );
    let base = stall_after(partial).await;
    let config = ResolverConfig {
        max_body_bytes: 16,
        ..ResolverConfig::default()
    };
    let session = HttpTransport::new(&config).open_session().unwrap();

    let started = std::time::Instant::now();
    let err = session.get(&base, Duration::from_secs(5)).await.unwrap_err();

    assert!(
        matches!(err, ExtractError::ContentTooLarge { max: 16, .. }),
        "{:?}",
        err
    );
    assert_eq!(err.kind(), ErrorKind::TransportError);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_resolver_end_to_end() {
    let page = serve(PAGE).await;
    let missing = serve(NOT_FOUND).await;
    let resolver = Resolver::new(ResolverConfig::default()).unwrap();

    let batch = resolver.resolve_batch(&[page.clone(), missing]).await.unwrap();

    assert!(batch[0].ok, "{:?}", batch[0]);
    assert!(batch[0].content.contains("Loopback body text."));
    assert_eq!(batch[0].url, page);
    assert_eq!(batch[1].error_kind, ErrorKind::TransportError);
}
