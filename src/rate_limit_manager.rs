use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default signup quota per client and window
pub const DEFAULT_MAX_REQUESTS: u32 = 5;
/// Default window length (15 minutes)
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// Source of monotonic time for the limiter
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Clock backed by `Instant::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Fixed-window request counter keyed by client identity.
///
/// A client's window opens with its first request and resets once `window`
/// has elapsed since then. Every call to [`check_rate_limit`](Self::check_rate_limit)
/// counts as a hit, including the ones that get rejected.
pub struct RateLimitManager<K = IpAddr> {
    windows: Mutex<HashMap<K, Window>>,
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl<K> fmt::Debug for RateLimitManager<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitManager")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .field("tracked_clients", &self.windows.lock().len())
            .finish()
    }
}

impl<K: Eq + Hash + Clone + fmt::Display> RateLimitManager<K> {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
            clock,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a request from `key`. Returns the time left until the window
    /// resets when the client is over quota.
    pub fn check_rate_limit(&self, key: &K) -> Result<(), Duration> {
        let now = self.clock.now();
        let mut windows = self.windows.lock();

        let window = windows.entry(key.clone()).or_insert(Window {
            started: now,
            hits: 0,
        });

        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                hits: 0,
            };
        }

        window.hits = window.hits.saturating_add(1);

        if window.hits > self.max_requests {
            let elapsed = now.duration_since(window.started);
            let wait_time = self.window.saturating_sub(elapsed);
            warn!(
                "Rate limited client {}: {} requests in window, resets in {:?}",
                key, window.hits, wait_time
            );
            return Err(wait_time);
        }

        Ok(())
    }

    /// Drop windows that have already expired. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = self.clock.now();
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.started) < self.window);
        let removed = before - windows.len();
        if removed > 0 {
            debug!("Pruned {} expired rate limit windows", removed);
        }
        removed
    }

    /// Forget all tracked clients
    pub fn reset(&self) {
        self.windows.lock().clear();
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().len()
    }
}
