use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use skyfinder_core::search::{SearchRequest, SearchResponse};

use crate::client::{SearchClientError, SearchService};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failing fast
    HalfOpen, // Probing the upstream
}

pub struct CircuitBreaker {
    pub name: String,
    pub state: RwLock<CircuitState>,
    pub failure_count: AtomicUsize,
    pub failure_threshold: usize,
    pub reset_timeout: Duration,
    pub last_failure: RwLock<Option<Instant>>,
    probe_in_flight: AtomicBool,
}

impl CircuitBreaker {
    pub fn new(name: &str, threshold: usize, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicUsize::new(0),
            failure_threshold: threshold.max(1),
            reset_timeout: timeout,
            last_failure: RwLock::new(None),
            probe_in_flight: AtomicBool::new(false),
        }
    }

    pub async fn current(&self) -> CircuitState {
        *self.state.read().await
    }

    /// Whether a call may go through right now. While Half-Open only the
    /// caller that claims the probe gets `true`, until its outcome is
    /// recorded.
    pub async fn check(&self) -> bool {
        if *self.state.read().await == CircuitState::Closed {
            return true;
        }

        let mut state = self.state.write().await;
        match *state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => self.claim_probe(),
            CircuitState::Open => {
                let last_fail = *self.last_failure.read().await;
                match last_fail {
                    Some(instant) if instant.elapsed() >= self.reset_timeout => {
                        *state = CircuitState::HalfOpen;
                        tracing::info!("Circuit Breaker [{}] moving to Half-Open", self.name);
                        self.claim_probe()
                    }
                    _ => false,
                }
            }
        }
    }

    fn claim_probe(&self) -> bool {
        self.probe_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        if *state == CircuitState::HalfOpen {
            *state = CircuitState::Closed;
            tracing::info!("Circuit Breaker [{}] recovered to Closed", self.name);
        }
        self.failure_count.store(0, Ordering::SeqCst);
        self.probe_in_flight.store(false, Ordering::SeqCst);
    }

    pub async fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;

        if count >= self.failure_threshold || *state == CircuitState::HalfOpen {
            *state = CircuitState::Open;
            *self.last_failure.write().await = Some(Instant::now());
            tracing::error!("Circuit Breaker [{}] TRIPPED to Open. Failures: {}", self.name, count);
        }
        self.probe_in_flight.store(false, Ordering::SeqCst);
    }
}

/// Wraps a [`SearchService`] so that repeated upstream failures fail fast.
pub struct GuardedSearchService<S> {
    inner: S,
    breaker: CircuitBreaker,
}

impl<S> GuardedSearchService<S> {
    pub fn new(inner: S, breaker: CircuitBreaker) -> Self {
        Self { inner, breaker }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

#[async_trait]
impl<S: SearchService> SearchService for GuardedSearchService<S> {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchClientError> {
        if !self.breaker.check().await {
            return Err(SearchClientError::CircuitOpen(self.breaker.name.clone()));
        }

        match self.inner.search(request).await {
            Ok(response) => {
                self.breaker.record_success().await;
                Ok(response)
            }
            Err(e) => {
                self.breaker.record_failure().await;
                Err(e)
            }
        }
    }
}
