use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Cooperative throttle shared by every outbound EDGAR request.
///
/// SEC asks automated clients to space their requests; we keep a single
/// "time of the last request" behind a mutex so concurrent fetches cannot
/// burst past the limit.
pub struct Throttle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Throttle {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Sleeps until at least `min_interval` has passed since the previous
    /// caller was released, then stamps the current time.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_millis(150))
    }
}
