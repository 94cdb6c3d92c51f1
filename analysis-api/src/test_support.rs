//! In-process backend doubles for HTTP tests.

use axum::Router;
use tokio::net::TcpListener;

/// Serves `app` on an ephemeral localhost port and returns its base URL.
pub(crate) async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port that was bound and released, so connects are refused.
pub(crate) async fn closed_port_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
