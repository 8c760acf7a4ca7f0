use core::future::Future;

use embassy_time::{with_timeout, Duration};

/// How long a blocking operation may wait before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timeout {
    /// Wait indefinitely.
    Never,
    /// Give up once the duration has elapsed.
    After(Duration),
}

impl Timeout {
    /// Default bound for a single bus transaction.
    pub const BUS_DEFAULT: Self = Self::After(Duration::from_millis(100));

    /// Drive `fut` to completion, or fail with [`TimedOut`] once the bound expires.
    pub async fn run<F: Future>(self, fut: F) -> Result<F::Output, TimedOut> {
        match self {
            Timeout::Never => Ok(fut.await),
            Timeout::After(duration) => {
                with_timeout(duration, fut).await.map_err(|_| TimedOut)
            }
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::BUS_DEFAULT
    }
}

/// Marker returned by [`Timeout::run`] when the bound expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimedOut;
