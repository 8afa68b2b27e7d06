//! HTTP/1 server feeding requests into a [`Router`]

use crate::shutdown::{InFlight, ShutdownSignal};
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use switchyard_config::ServerConfig;
use switchyard_core::Error;
use switchyard_router::Router;
use tokio::net::TcpListener;

/// HTTP server
pub struct Server {
    router: Arc<Router>,
    config: ServerConfig,
    shutdown: ShutdownSignal,
    in_flight: InFlight,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("routes", &self.router.route_count())
            .field("in_flight", &self.in_flight.active())
            .finish()
    }
}

impl Server {
    /// Create a server for `router`
    pub fn new(router: Router, config: ServerConfig, shutdown: ShutdownSignal) -> Self {
        Self {
            router: Arc::new(router),
            config,
            shutdown,
            in_flight: InFlight::default(),
        }
    }

    /// Bind the configured listen address and serve until shutdown
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.config.listen).await?;
        self.serve(listener).await
    }

    /// Serve connections from `listener` until the shutdown signal fires,
    /// then wait for in-flight requests up to the shutdown timeout.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            %addr,
            routes = self.router.route_count(),
            "Server listening"
        );

        // Registration is over once we accept traffic
        self.router.freeze();

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer)) => self.spawn_connection(stream, peer),
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                _ = shutdown_rx.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.drain().await;
        Ok(())
    }

    fn spawn_connection(&self, stream: tokio::net::TcpStream, peer: SocketAddr) {
        tracing::trace!("Accepted connection from {}", peer);

        let router = Arc::clone(&self.router);
        let in_flight = self.in_flight.clone();
        let max_body_size = self.config.max_body_size;

        tokio::spawn(async move {
            let service = hyper::service::service_fn(move |req| {
                let router = Arc::clone(&router);
                let guard = in_flight.enter();
                async move {
                    let response = handle_request(&router, req, max_body_size).await;
                    drop(guard);
                    Ok::<_, Infallible>(response)
                }
            });

            let io = hyper_util::rt::TokioIo::new(stream);
            if let Err(e) = hyper::server::conn::http1::Builder::new()
                .serve_connection(io, service)
                .await
            {
                tracing::debug!(%peer, "HTTP connection error: {}", e);
            }
        });
    }

    async fn drain(&self) {
        let shutdown_timeout = self.config.shutdown_timeout;
        let start = Instant::now();

        tracing::info!(
            timeout_secs = shutdown_timeout.as_secs(),
            "Waiting for in-flight requests to complete"
        );

        loop {
            let active = self.in_flight.active();

            if active == 0 {
                tracing::info!("All requests completed, shutting down cleanly");
                break;
            }

            if start.elapsed() >= shutdown_timeout {
                tracing::warn!(
                    active_requests = active,
                    "Shutdown timeout reached, forcing shutdown"
                );
                break;
            }

            tracing::debug!(
                active_requests = active,
                elapsed_ms = start.elapsed().as_millis(),
                "Waiting for active requests to complete"
            );

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

/// Buffer the request body (at most `max_body_size` bytes) and dispatch it.
pub async fn handle_request<B>(
    router: &Router,
    request: Request<B>,
    max_body_size: usize,
) -> Response<Full<Bytes>>
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let (parts, body) = request.into_parts();

    let bytes = match Limited::new(body, max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            tracing::debug!(
                method = %parts.method,
                path = %parts.uri.path(),
                max_body_size,
                "Request body too large"
            );
            return plain(StatusCode::PAYLOAD_TOO_LARGE);
        }
        Err(e) => {
            let err = Error::InvalidRequest(format!("failed to read body: {e}"));
            tracing::debug!(
                method = %parts.method,
                path = %parts.uri.path(),
                error = %err,
                "Rejected request"
            );
            return plain(err.to_status_code());
        }
    };

    let handled = router
        .handle(Request::from_parts(parts, Full::new(bytes)))
        .await;
    handled.response
}

fn plain(status: StatusCode) -> Response<Full<Bytes>> {
    let reason = status.canonical_reason().unwrap_or("Error");
    let mut response = Response::new(Full::new(Bytes::from_static(reason.as_bytes())));
    *response.status_mut() = status;
    response
}
