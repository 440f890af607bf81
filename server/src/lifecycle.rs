//! Process lifecycle: connect, serve, drain, disconnect.
//!
//! # Shutdown
//! On SIGINT or SIGTERM the listener stops accepting connections and
//! in-flight requests get `shutdown_grace` to finish. Whatever is still
//! running after that is abandoned. The store connection is closed only
//! once serving has stopped, so draining requests never see a closed client.

use std::{future::Future, future::IntoFuture, io, time::Duration};

use anyhow::Context;
use axum::{http::StatusCode, Router};
use tokio::{net::TcpListener, sync::watch};
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::routes::{self, AppState};
use crate::store::{self, TodoStore};

/// Run the server until a shutdown signal arrives.
///
/// Fails if the store cannot be reached at startup or the listener cannot
/// be bound.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let store = store::connect(&config.store)
        .await
        .context("failed to connect to the document store")?;
    store
        .ping()
        .await
        .context("document store did not answer ping")?;

    let state = AppState::new(store.clone(), config.server.home_page.clone());
    let router = routes::app(state).layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        config.server.request_timeout(),
    ));

    let listener = TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    info!(addr = %listener.local_addr()?, "todo server listening");

    let served = serve(
        listener,
        router,
        config.server.shutdown_grace(),
        shutdown_signal(),
    )
    .await;

    close_store(store.as_ref(), config.store.connect_timeout()).await;
    served.context("server error")?;
    info!("server shutdown gracefully");
    Ok(())
}

/// Serve `router` on `listener` until `shutdown` resolves, then drain for at
/// most `grace`.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    grace: Duration,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (fired_tx, mut fired_rx) = watch::channel(false);
    let signal = async move {
        shutdown.await;
        info!("shutdown signal received, draining in-flight requests");
        let _ = fired_tx.send(true);
    };

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(signal)
        .into_future();

    let deadline = async move {
        if fired_rx.wait_for(|fired| *fired).await.is_err() {
            // Sender gone without firing: the server already returned.
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result,
        () = deadline => {
            warn!(grace_secs = grace.as_secs(), "grace period elapsed, abandoning in-flight requests");
            Ok(())
        }
    }
}

/// Close the store, giving up after `limit`. Requests abandoned at the end
/// of the grace period may still hold driver resources, and exit must not
/// wait on them.
pub async fn close_store(store: &dyn TodoStore, limit: Duration) {
    if tokio::time::timeout(limit, store.close()).await.is_err() {
        warn!(limit_secs = limit.as_secs(), "store did not close in time, exiting anyway");
    }
}

/// Resolves on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = sigterm => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::routing::get;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::oneshot;

    use super::*;
    use crate::error::StoreError;
    use crate::model::{Todo, TodoId, UpdateTodo};
    use crate::store::MemoryStore;

    /// Store whose `close` never finishes, like a driver waiting on a
    /// cursor held by an abandoned request.
    struct StuckOnClose;

    #[async_trait]
    impl TodoStore for StuckOnClose {
        async fn list(&self) -> Result<Vec<Todo>, StoreError> {
            Ok(Vec::new())
        }

        async fn insert(&self, todo: &Todo) -> Result<TodoId, StoreError> {
            Ok(todo.id)
        }

        async fn update(&self, _id: TodoId, _update: &UpdateTodo) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn delete(&self, _id: TodoId) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn close(&self) {
            std::future::pending::<()>().await;
        }
    }

    async fn listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn serve_returns_after_shutdown_with_no_requests() {
        let state = AppState::new(Arc::new(MemoryStore::new()), "README.md");
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(
            listener().await,
            routes::app(state),
            Duration::from_secs(5),
            async move {
                let _ = rx.await;
            },
        ));

        tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn grace_period_bounds_a_stuck_request() {
        let router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                "done"
            }),
        );
        let listener = listener().await;
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(
            listener,
            router,
            Duration::from_millis(200),
            async move {
                let _ = rx.await;
            },
        ));

        // Hold a request open so graceful shutdown alone would never finish.
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        tokio::io::AsyncWriteExt::write_all(
            &mut stream,
            b"GET /slow HTTP/1.1\r\nhost: localhost\r\n\r\n",
        )
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("grace period was not enforced")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn in_flight_request_completes_within_grace() {
        let router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                "done"
            }),
        );
        let listener = listener().await;
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(
            listener,
            router,
            Duration::from_secs(5),
            async move {
                let _ = rx.await;
            },
        ));

        let client = tokio::spawn(async move {
            let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /slow HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
                .await
                .unwrap();
            let mut raw = String::new();
            stream.read_to_string(&mut raw).await.unwrap();
            raw
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();

        let raw = tokio::time::timeout(Duration::from_secs(5), client)
            .await
            .expect("request was not drained")
            .unwrap();
        assert!(raw.starts_with("HTTP/1.1 200"), "unexpected response: {raw}");
        assert!(raw.ends_with("done"), "unexpected body: {raw}");

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn close_store_gives_up_after_limit() {
        tokio::time::timeout(
            Duration::from_secs(5),
            close_store(&StuckOnClose, Duration::from_millis(100)),
        )
        .await
        .expect("close was not bounded");
    }

    #[tokio::test]
    async fn run_fails_when_store_is_unreachable() {
        let mut config = Config::default();
        config.store.uri = "mongodb://127.0.0.1:1".into();
        config.store.connect_timeout_secs = 1;

        let err = tokio::time::timeout(Duration::from_secs(10), run(config))
            .await
            .expect("startup did not give up")
            .unwrap_err();
        assert!(
            err.to_string().contains("document store did not answer ping"),
            "unexpected error: {err:#}"
        );
    }
}
