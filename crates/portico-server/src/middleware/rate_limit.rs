// Traffic shaping middleware for the management API
// Counts requests per client origin in fixed windows and delays, but never
// rejects, requests beyond the configured threshold

use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
};
use dashmap::DashMap;
use futures::future::LocalBoxFuture;

pub const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const SLOWDOWN_DELAY: &str = "x-slowdown-delay-ms";

/// Traffic shaping configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrafficSettings {
    pub enabled: bool,
    /// Length of one counting window
    pub window: Duration,
    /// Requests per window that pass without delay
    pub delay_after: u32,
    /// Delay added per request beyond `delay_after`
    pub delay_increment: Duration,
    pub max_delay: Option<Duration>,
}

impl Default for TrafficSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            window: Duration::from_secs(60),
            delay_after: 100,
            delay_increment: Duration::from_millis(500),
            max_delay: None,
        }
    }
}

/// Request counter for one origin
struct WindowCounter {
    count: u32,
    window_start: Instant,
}

impl WindowCounter {
    fn new(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    fn hit(&mut self, now: Instant, window: Duration) -> u32 {
        if now.duration_since(self.window_start) >= window {
            self.count = 0;
            self.window_start = now;
        }
        self.count = self.count.saturating_add(1);
        self.count
    }
}

/// Outcome of counting one request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Admission {
    /// Requests seen from this origin in the current window, this one included
    pub hits: u32,
    pub delay: Duration,
}

/// Per-origin counters shared across workers
pub struct TrafficGovernorState {
    windows: DashMap<String, WindowCounter>,
    settings: TrafficSettings,
}

impl TrafficGovernorState {
    pub fn new(settings: TrafficSettings) -> Self {
        Self {
            windows: DashMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &TrafficSettings {
        &self.settings
    }

    /// Count one request from `origin` and return the delay it must wait
    pub fn admit(&self, origin: &str) -> Admission {
        self.admit_at(origin, Instant::now())
    }

    pub fn admit_at(&self, origin: &str, now: Instant) -> Admission {
        if !self.settings.enabled {
            return Admission {
                hits: 0,
                delay: Duration::ZERO,
            };
        }

        // the entry guard holds the shard lock across increment and read
        let hits = self
            .windows
            .entry(origin.to_string())
            .or_insert_with(|| WindowCounter::new(now))
            .hit(now, self.settings.window);

        Admission {
            hits,
            delay: self.delay_for(hits),
        }
    }

    pub fn delay_for(&self, hits: u32) -> Duration {
        if hits <= self.settings.delay_after {
            return Duration::ZERO;
        }
        let delay = self
            .settings
            .delay_increment
            .saturating_mul(hits - self.settings.delay_after);
        match self.settings.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    pub fn tracked_origins(&self) -> usize {
        self.windows.len()
    }

    /// Drop counters whose window ended more than one window ago
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    pub fn cleanup_at(&self, now: Instant) {
        let horizon = self.settings.window * 2;
        self.windows
            .retain(|_, counter| now.duration_since(counter.window_start) < horizon);
    }
}

/// Traffic shaping middleware factory
#[derive(Clone)]
pub struct TrafficGovernor {
    state: Arc<TrafficGovernorState>,
}

impl TrafficGovernor {
    pub fn new(settings: TrafficSettings) -> Self {
        Self {
            state: Arc::new(TrafficGovernorState::new(settings)),
        }
    }

    pub fn state(&self) -> Arc<TrafficGovernorState> {
        self.state.clone()
    }
}

impl<S, B> Transform<S, ServiceRequest> for TrafficGovernor
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = TrafficGovernorMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TrafficGovernorMiddleware {
            service: Rc::new(service),
            state: self.state.clone(),
        }))
    }
}

pub struct TrafficGovernorMiddleware<S> {
    service: Rc<S>,
    state: Arc<TrafficGovernorState>,
}

impl<S, B> Service<ServiceRequest> for TrafficGovernorMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // peer address only; forwarding headers are caller-controlled
        let origin = req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let admission = self.state.admit(&origin);
        let limit = self.state.settings.delay_after;
        let enabled = self.state.settings.enabled;
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if !admission.delay.is_zero() {
                tracing::debug!(
                    origin = %origin,
                    hits = admission.hits,
                    delay_ms = admission.delay.as_millis() as u64,
                    "Slowing down client over threshold"
                );
                actix_web::rt::time::sleep(admission.delay).await;
            }

            let mut res = service.call(req).await?;

            if enabled {
                let headers = res.headers_mut();
                headers.insert(
                    HeaderName::from_static(RATE_LIMIT_LIMIT),
                    HeaderValue::from(limit),
                );
                headers.insert(
                    HeaderName::from_static(RATE_LIMIT_REMAINING),
                    HeaderValue::from(limit.saturating_sub(admission.hits)),
                );
                if !admission.delay.is_zero() {
                    headers.insert(
                        HeaderName::from_static(SLOWDOWN_DELAY),
                        HeaderValue::from(admission.delay.as_millis() as u64),
                    );
                }
            }

            Ok(res)
        })
    }
}

/// Spawn the periodic pruning of idle origin counters
pub fn start_cleanup_task(state: Arc<TrafficGovernorState>) -> tokio::task::JoinHandle<()> {
    let period = state.settings.window;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let before = state.tracked_origins();
            state.cleanup();
            tracing::debug!(
                before,
                after = state.tracked_origins(),
                "Pruned idle traffic windows"
            );
        }
    })
}
