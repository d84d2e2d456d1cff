use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{auth, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Hello World!" }))
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router())
        .merge(users::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
