//! Progress reporting for long-running collection retrievals.

use async_trait::async_trait;

/// Receives progress fractions during a full-collection retrieval.
///
/// The caller injects a sink via
/// [`FetchAllRequest::on_progress`](crate::api::FetchAllRequest::on_progress).
/// Reported values are in `[0.0, 1.0]`, non-decreasing across calls, and the
/// final call of a successful retrieval is exactly `1.0`. Emission is
/// throttled so the sink only fires when progress advanced by at least the
/// configured resolution since the last call, or on completion.
///
/// Sinks may do real work (e.g. post progress to an external tracking
/// endpoint), which is why the callback is async.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Called with the current progress fraction.
    async fn progress(&self, fraction: f64);
}

/// Adapts a plain closure into a [`ProgressSink`].
///
/// # Example
///
/// ```
/// use bubble_lib::ProgressFn;
///
/// let sink = ProgressFn::new(|fraction| println!("{:.0}%", fraction * 100.0));
/// ```
pub struct ProgressFn<F>(F);

impl<F> ProgressFn<F>
where
    F: Fn(f64) + Send + Sync,
{
    /// Wraps the given closure.
    pub fn new(callback: F) -> Self {
        Self(callback)
    }
}

#[async_trait]
impl<F> ProgressSink for ProgressFn<F>
where
    F: Fn(f64) + Send + Sync,
{
    async fn progress(&self, fraction: f64) {
        (self.0)(fraction)
    }
}

/// Throttles progress emissions to the configured resolution and enforces
/// monotonicity.
#[derive(Debug)]
pub(crate) struct ProgressThrottle {
    resolution: f64,
    last: Option<f64>,
}

impl ProgressThrottle {
    pub(crate) fn new(resolution: f64) -> Self {
        Self {
            resolution,
            last: None,
        }
    }

    /// Decides whether `fraction` should be emitted.
    ///
    /// The fraction is clamped into `[last, 1.0]` so the emitted sequence
    /// never decreases even when the server-reported totals drift. The first
    /// observation always fires; afterwards a value fires when it advanced
    /// by at least the resolution, or when it reaches 1.0.
    pub(crate) fn advance(&mut self, fraction: f64) -> Option<f64> {
        let mut fraction = fraction.clamp(0.0, 1.0);
        if let Some(last) = self.last
            && fraction < last
        {
            fraction = last;
        }

        let fire = match self.last {
            None => true,
            Some(last) => fraction - last >= self.resolution || (fraction >= 1.0 && last < 1.0),
        };

        if fire {
            self.last = Some(fraction);
            Some(fraction)
        } else {
            None
        }
    }

    /// Returns `true` once 1.0 has been emitted.
    pub(crate) fn finished(&self) -> bool {
        self.last == Some(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_fires() {
        let mut throttle = ProgressThrottle::new(0.1);
        assert_eq!(throttle.advance(0.05), Some(0.05));
    }

    #[test]
    fn test_small_advances_are_suppressed() {
        let mut throttle = ProgressThrottle::new(0.1);
        throttle.advance(0.2);
        assert_eq!(throttle.advance(0.25), None);
        assert_eq!(throttle.advance(0.31), Some(0.31));
    }

    #[test]
    fn test_completion_always_fires() {
        let mut throttle = ProgressThrottle::new(0.5);
        throttle.advance(0.96);
        assert_eq!(throttle.advance(1.0), Some(1.0));
        assert!(throttle.finished());
        // But only once.
        assert_eq!(throttle.advance(1.0), None);
    }

    #[test]
    fn test_regressions_are_clamped() {
        let mut throttle = ProgressThrottle::new(0.1);
        throttle.advance(0.5);
        // A drifting item_count must not produce a decreasing sequence.
        assert_eq!(throttle.advance(0.3), None);
        assert_eq!(throttle.advance(0.61), Some(0.61));
    }

    #[test]
    fn test_overshoot_is_clamped_to_one() {
        let mut throttle = ProgressThrottle::new(0.1);
        throttle.advance(0.9);
        assert_eq!(throttle.advance(1.2), Some(1.0));
        assert!(throttle.finished());
    }
}
