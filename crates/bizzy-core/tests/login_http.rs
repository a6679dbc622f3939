//! End-to-end login against a throwaway HTTP responder.

use std::sync::Arc;
use std::time::Duration;

use bizzy_core::api::AuthClient;
use bizzy_core::auth::{EncryptedFileStore, KeySource, SessionManager, STORE_FILE};
use bizzy_core::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

enum Respond {
    With { status: &'static str, body: &'static str },
    Never,
}

/// Read one HTTP/1.1 request and return its body.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length: usize = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map(|v| v.trim().parse().unwrap())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending body");
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8(buf[header_end..header_end + content_length].to_vec()).unwrap()
}

/// Serve a single request. The request body is sent back on the channel.
async fn serve_once(respond: Respond) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let body = read_request(&mut stream).await;
        let _ = tx.send(body);

        match respond {
            Respond::With { status, body } => {
                let response = format!(
                    "HTTP/1.1 {}\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
            Respond::Never => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(stream);
            }
        }
    });

    (base_url, rx)
}

fn session_for(base_url: &str, dir: &std::path::Path) -> SessionManager {
    let client = AuthClient::with_base_url(base_url).unwrap();
    let store = EncryptedFileStore::new(
        dir.join(STORE_FILE),
        KeySource::Passphrase("test passphrase".to_string()),
    );
    SessionManager::new(Arc::new(client), Arc::new(store))
}

#[tokio::test]
async fn login_success_returns_token_and_sends_expected_body() {
    let (base_url, request_body) = serve_once(Respond::With {
        status: "200 OK",
        body: r#"{"token":"abc"}"#,
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let session = session_for(&base_url, dir.path());

    let credential = session.login("user@example.com", "secret").await.unwrap();
    assert_eq!(credential.token, "abc");

    let sent: serde_json::Value = serde_json::from_str(&request_body.await.unwrap()).unwrap();
    assert_eq!(sent["email"], "user@example.com");
    assert_eq!(sent["password"], "secret");
    assert_eq!(sent["device_token"], "android_test_device");
}

#[tokio::test]
async fn login_unauthorized_is_remote_auth_error() {
    let (base_url, _rx) = serve_once(Respond::With {
        status: "401 Unauthorized",
        body: r#"{"error":"invalid credentials"}"#,
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let session = session_for(&base_url, dir.path());

    let err = session.login("user@example.com", "wrong").await.unwrap_err();
    match err {
        Error::RemoteAuth { status_code, ref body } => {
            assert_eq!(status_code, 401);
            assert_eq!(body, r#"{"error":"invalid credentials"}"#);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "Invalid email or password");
}

#[tokio::test]
async fn login_without_response_times_out() {
    let (base_url, _rx) = serve_once(Respond::Never).await;
    let dir = tempfile::tempdir().unwrap();
    let session =
        session_for(&base_url, dir.path()).with_login_timeout(Duration::from_millis(200));

    let err = session.login("user@example.com", "secret").await.unwrap_err();
    assert!(matches!(err, Error::Timeout { after_ms: 200 }));
}

#[tokio::test]
async fn login_connection_refused_is_unknown_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let session = session_for(&base_url, dir.path());

    let err = session.login("user@example.com", "secret").await.unwrap_err();
    assert!(matches!(err, Error::Unknown { .. }), "{err:?}");
}

#[tokio::test]
async fn login_malformed_body_is_unknown_error() {
    let (base_url, _rx) = serve_once(Respond::With {
        status: "200 OK",
        body: r#"{"access":"abc"}"#,
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let session = session_for(&base_url, dir.path());

    let err = session.login("user@example.com", "secret").await.unwrap_err();
    assert!(matches!(err, Error::Unknown { .. }), "{err:?}");
}

#[tokio::test]
async fn login_and_remember_persists_to_encrypted_file() {
    let (base_url, _rx) = serve_once(Respond::With {
        status: "200 OK",
        body: r#"{"token":"abc"}"#,
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let session = session_for(&base_url, dir.path());

    session
        .login_and_remember("user@example.com", "secret")
        .await
        .unwrap();

    // a fresh manager over the same file sees the cached values
    let reopened = session_for(&base_url, dir.path());
    assert_eq!(
        reopened.load_saved_identifier().as_deref(),
        Some("user@example.com")
    );
    assert_eq!(
        reopened.load_credential().unwrap().map(|c| c.token).as_deref(),
        Some("abc")
    );
}
