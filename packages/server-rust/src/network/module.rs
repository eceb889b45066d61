//! Network module with deferred startup lifecycle.
//!
//! Implements the deferred startup pattern: `new()` creates resources,
//! `start()` binds the TCP listener, and `serve()` starts accepting
//! connections. Binding before serving lets the caller learn the actual
//! port (useful with port 0) before traffic arrives.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{info, warn};

use super::config::{NetworkConfig, TlsConfig};
use super::docs::openapi_handler;
use super::faults::{panic_response, record_faults};
use super::handlers::{
    create_assignment, create_driver, create_truck, delete_assignment, delete_driver,
    delete_truck, get_assignment, get_driver, get_truck, health_handler, list_assignments,
    list_drivers, list_trucks, liveness_handler, readiness_handler, root_handler,
    truck_availability, update_assignment, update_driver, update_truck, AppState,
};
use super::middleware::{build_http_layers, track_in_flight};
use super::shutdown::ShutdownController;
use crate::service::{FleetServices, StoreErrorRecorder};
use crate::traits::{ErrorRecorder, FleetStore};

/// Manages the full HTTP server lifecycle.
///
/// Follows the deferred startup pattern:
/// 1. `new()` -- allocates shared state (services, recorder, shutdown controller)
/// 2. `start()` -- binds TCP listener to the configured address
/// 3. `serve()` -- begins accepting connections until shutdown is signalled,
///    then drains in-flight requests and closes the store
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    store: Arc<dyn FleetStore>,
    recorder: Arc<dyn ErrorRecorder>,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    ///
    /// Faults are recorded into `store` unless another recorder is set with
    /// [`with_recorder`](Self::with_recorder).
    #[must_use]
    pub fn new(config: NetworkConfig, store: Arc<dyn FleetStore>) -> Self {
        let recorder = Arc::new(StoreErrorRecorder::new(Arc::clone(&store)));
        Self {
            config,
            listener: None,
            store,
            recorder,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    /// Replaces the fault recorder.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn ErrorRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Returns a shared reference to the shutdown controller.
    ///
    /// Other modules use this to check health state or trigger shutdown.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        assemble_router(
            &self.config,
            &self.store,
            Arc::clone(&self.recorder),
            Arc::clone(&self.shutdown),
        )
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves.
    ///
    /// After the signal:
    /// 1. Health state transitions to Draining (readiness reports 503)
    /// 2. The listener stops accepting; open connections finish
    /// 3. Waits up to the drain timeout for in-flight requests
    /// 4. Closes the store
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first or the server hits
    /// a fatal I/O error.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let Self {
            config,
            listener,
            store,
            recorder,
            shutdown: shutdown_ctrl,
        } = self;
        let listener =
            listener.ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;

        let router = assemble_router(&config, &store, recorder, Arc::clone(&shutdown_ctrl));

        let signal_ctrl = Arc::clone(&shutdown_ctrl);
        let signal = async move {
            shutdown.await;
            info!("Shutdown signal received, draining");
            signal_ctrl.trigger_shutdown();
        };

        // Transition to Ready so readiness probes pass.
        shutdown_ctrl.set_ready();

        let served = match config.tls {
            Some(ref tls) => serve_tls(listener, router, tls, config.drain_timeout, signal).await,
            None => serve_plain(listener, router, signal).await,
        };

        shutdown_ctrl.trigger_shutdown();
        drain(&shutdown_ctrl, config.drain_timeout).await;

        if let Err(e) = store.close().await {
            warn!("Failed to close store: {e:#}");
        }
        info!("Server stopped");
        served
    }
}

/// Routes, layered outer to inner: in-flight tracking, the transport stack
/// from [`build_http_layers`], fault recording, panic catching.
fn assemble_router(
    config: &NetworkConfig,
    store: &Arc<dyn FleetStore>,
    recorder: Arc<dyn ErrorRecorder>,
    shutdown: Arc<ShutdownController>,
) -> Router {
    let state = AppState {
        services: FleetServices::new(store),
        shutdown: Arc::clone(&shutdown),
        start_time: Instant::now(),
    };

    let drivers = get(list_drivers).post(create_driver);
    let trucks = get(list_trucks).post(create_truck);
    let assignments = get(list_assignments).post(create_assignment);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .route("/api/drivers", drivers.clone())
        .route("/api/drivers/", drivers)
        .route(
            "/api/drivers/{id}",
            get(get_driver).put(update_driver).delete(delete_driver),
        )
        .route("/api/trucks", trucks.clone())
        .route("/api/trucks/", trucks)
        .route(
            "/api/trucks/{id}",
            get(get_truck).put(update_truck).delete(delete_truck),
        )
        .route("/api/trucks/{id}/availability", get(truck_availability))
        .route("/api/assignments", assignments.clone())
        .route("/api/assignments/", assignments)
        .route(
            "/api/assignments/{id}",
            get(get_assignment)
                .put(update_assignment)
                .delete(delete_assignment),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn_with_state(recorder, record_faults))
        .layer(build_http_layers(config))
        .layer(from_fn_with_state(shutdown, track_in_flight))
        .with_state(state)
}

/// Serves plain HTTP connections using axum's built-in server.
async fn serve_plain(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("Serving plain HTTP connections");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Serves TLS connections using `axum-server` with rustls.
///
/// Reuses the pre-bound TCP listener by converting it to a `std::net::TcpListener`.
async fn serve_tls(
    listener: TcpListener,
    router: Router,
    tls_config: &TlsConfig,
    drain_timeout: Duration,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls_config = RustlsConfig::from_pem_file(&tls_config.cert_path, &tls_config.key_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load TLS certificates: {e}"))?;

    let addr = listener.local_addr()?;
    let std_listener = listener.into_std()?;
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        shutdown.await;
        shutdown_handle.graceful_shutdown(Some(drain_timeout));
    });

    info!("Serving TLS connections on {}", addr);

    axum_server::from_tcp_rustls(std_listener, rustls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}

/// Waits for in-flight requests, up to `timeout`.
async fn drain(shutdown_ctrl: &ShutdownController, timeout: Duration) {
    let count = shutdown_ctrl.in_flight_count();
    if count > 0 {
        info!("Waiting for {} in-flight requests", count);
    }

    if shutdown_ctrl.wait_for_drain(timeout).await {
        info!("All requests drained");
    } else {
        warn!("Drain timeout expired with in-flight requests remaining");
    }
}
