// Server loop module
// Accepts connections until shutdown is requested

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `state.shutdown` is notified
///
/// Must run inside a `tokio::task::LocalSet`; connections are served on
/// local tasks. In-flight connections finish on their own after the
/// listener closes.
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = state.shutdown.notified() => {
                logger::log_server_stopped();
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Overrides};
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn roundtrip(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_over_tcp_until_shutdown() {
        let root = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            root: Some(root.path().to_string_lossy().into_owned()),
            ..Overrides::default()
        };
        let missing = root.path().join("no-config").to_string_lossy().into_owned();
        let mut config = Config::load_from(&missing, &overrides).unwrap();
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(&config));

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async move {
                let server = tokio::task::spawn_local(run(listener, Arc::clone(&state)));

                let body = r#"{"url":"/api/x","method":"GET","response":{"body":"{\"ok\":true}"}}"#;
                let register = format!(
                    "POST /mocks HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{body}",
                    body.len()
                );
                let response = roundtrip(addr, &register).await;
                assert!(response.starts_with("HTTP/1.1 204"), "got: {response}");

                let response = roundtrip(
                    addr,
                    "GET /api/x HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
                )
                .await;
                assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
                assert!(response.ends_with(r#"{"ok":true}"#), "got: {response}");

                state.shutdown.notify_one();
                server.await.unwrap().unwrap();
            })
            .await;
    }
}
