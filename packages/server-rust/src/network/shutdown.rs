//! Server lifecycle state and in-flight request accounting for graceful
//! shutdown.
//!
//! The health state is swapped lock-free through `ArcSwap`; probes read it on
//! every request. In-flight requests hold an [`InFlightGuard`], and the last
//! guard to drop while draining wakes [`ShutdownController::wait_for_drain`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::Notify;

/// Lifecycle of the HTTP server: Starting -> Ready -> Draining -> Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Bound but not yet serving.
    Starting,
    /// Serving; readiness passes.
    Ready,
    /// Shutdown requested; open requests are finishing.
    Draining,
    /// Every request has finished.
    Stopped,
}

impl HealthState {
    /// Lowercase name reported by the health endpoint.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

#[derive(Debug, Default)]
struct InFlight {
    count: AtomicU64,
    idle: Notify,
}

/// Shared by the router (probes, in-flight middleware) and
/// [`NetworkModule::serve`](super::NetworkModule::serve), which moves it to
/// Draining on the shutdown signal and then waits for the requests to finish.
#[derive(Debug)]
pub struct ShutdownController {
    in_flight: Arc<InFlight>,
    health_state: ArcSwap<HealthState>,
}

impl ShutdownController {
    /// A controller in the `Starting` state with no requests in flight.
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(InFlight::default()),
            health_state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    pub fn set_ready(&self) {
        self.health_state.store(Arc::new(HealthState::Ready));
    }

    /// Moves to `Draining`; readiness probes report 503 from here on.
    pub fn trigger_shutdown(&self) {
        self.health_state.store(Arc::new(HealthState::Draining));
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.health_state.load()
    }

    /// Counts one request until the guard drops, including on unwind.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.count.fetch_add(1, Ordering::AcqRel);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.count.load(Ordering::Acquire)
    }

    /// Waits until no request is in flight, then moves to `Stopped`.
    ///
    /// Returns `false` and stays `Draining` if `timeout` elapses first.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let idle = async {
            loop {
                let notified = self.in_flight.idle.notified();
                tokio::pin!(notified);
                // Register before checking so a drop in between is not missed.
                notified.as_mut().enable();
                if self.in_flight_count() == 0 {
                    return;
                }
                notified.await;
            }
        };

        if tokio::time::timeout(timeout, idle).await.is_ok() {
            self.health_state.store(Arc::new(HealthState::Stopped));
            true
        } else {
            false
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Held for the duration of one request; see
/// [`ShutdownController::in_flight_guard`].
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<InFlight>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.in_flight.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.in_flight.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_runs_starting_ready_draining() {
        let controller = ShutdownController::new();
        assert_eq!(controller.health_state(), HealthState::Starting);
        assert_eq!(controller.in_flight_count(), 0);

        controller.set_ready();
        assert_eq!(controller.health_state(), HealthState::Ready);

        controller.trigger_shutdown();
        assert_eq!(controller.health_state(), HealthState::Draining);
    }

    #[test]
    fn health_state_names() {
        let names: Vec<_> = [
            HealthState::Starting,
            HealthState::Ready,
            HealthState::Draining,
            HealthState::Stopped,
        ]
        .into_iter()
        .map(HealthState::as_str)
        .collect();
        assert_eq!(names, ["starting", "ready", "draining", "stopped"]);
    }

    #[test]
    fn guards_count_requests() {
        let controller = ShutdownController::new();
        let first = controller.in_flight_guard();
        let second = controller.in_flight_guard();
        assert_eq!(controller.in_flight_count(), 2);

        drop(first);
        assert_eq!(controller.in_flight_count(), 1);
        drop(second);
        assert_eq!(controller.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn idle_server_drains_at_once() {
        let controller = ShutdownController::new();
        controller.trigger_shutdown();

        assert!(controller.wait_for_drain(Duration::from_secs(1)).await);
        assert_eq!(controller.health_state(), HealthState::Stopped);
    }

    #[tokio::test]
    async fn drain_wakes_when_last_request_finishes() {
        let controller = ShutdownController::new();
        controller.set_ready();
        let booking = controller.in_flight_guard();
        let listing = controller.in_flight_guard();
        controller.trigger_shutdown();

        let finisher = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(booking);
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(listing);
        });

        assert!(controller.wait_for_drain(Duration::from_secs(2)).await);
        assert_eq!(controller.in_flight_count(), 0);
        assert_eq!(controller.health_state(), HealthState::Stopped);
        finisher.await.unwrap();
    }

    #[tokio::test]
    async fn drain_gives_up_after_timeout() {
        let controller = ShutdownController::new();
        controller.set_ready();
        let _stuck = controller.in_flight_guard();
        controller.trigger_shutdown();

        assert!(!controller.wait_for_drain(Duration::from_millis(50)).await);
        assert_eq!(controller.health_state(), HealthState::Draining);
    }

    #[tokio::test]
    async fn guard_released_by_panicking_task() {
        let controller = Arc::new(ShutdownController::new());
        let inner = Arc::clone(&controller);
        let result = tokio::spawn(async move {
            let _guard = inner.in_flight_guard();
            panic!("handler blew up");
        })
        .await;
        assert!(result.is_err());
        assert_eq!(controller.in_flight_count(), 0);
    }
}
