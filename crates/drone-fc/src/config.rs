use core::num::NonZeroU64;

use embassy_time::Duration;
use lis3mdl::Lis3mdlConfig;
use lsm6dsox::Lsm6dsoxConfig;
use mems_bus::Timeout;

/// Accelerometer/gyroscope address on the reference board.
pub const LSM6DSOX_ADDRESS: u8 = lsm6dsox::DEFAULT_ADDRESS;
/// Magnetometer address on the reference board.
pub const LIS3MDL_ADDRESS: u8 = lis3mdl::DEFAULT_ADDRESS;

/// How long a task may wait for the shared flight state.
pub const LOCK_TIMEOUT: Timeout = Timeout::After(Duration::from_secs(1));

/// Period of one task loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskConfig {
    pub period: Duration,
}

/// Scheduler rate of the reference board.
pub const REFERENCE_TICK_HZ: NonZeroU64 = match NonZeroU64::new(100) {
    Some(hz) => hz,
    None => panic!("tick rate must be non-zero"),
};

impl TaskConfig {
    /// Longest period `from_ticks` produces, a little over 71 minutes.
    pub const MAX_PERIOD: Duration = Duration::from_micros(u32::MAX as u64);

    /// Express the period in scheduler ticks at `tick_hz`.
    ///
    /// Periods past [`Self::MAX_PERIOD`] are clamped to it.
    pub const fn from_ticks(ticks: u64, tick_hz: NonZeroU64) -> Self {
        let micros = ticks as u128 * 1_000_000 / tick_hz.get() as u128;
        let micros = if micros > u32::MAX as u128 { u32::MAX as u64 } else { micros as u64 };
        Self { period: Duration::from_micros(micros) }
    }

    /// Period in seconds, used as the integration step.
    pub fn period_secs(&self) -> f32 {
        self.period.as_micros() as f32 / 1_000_000.0
    }
}

impl Default for TaskConfig {
    /// Three ticks of a 100 Hz scheduler.
    fn default() -> Self {
        Self::from_ticks(3, REFERENCE_TICK_HZ)
    }
}

/// Bounded retry for bus operations that may hit transient noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Total tries, the first one included. Zero behaves like one.
    pub attempts: u8,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Fail on the first error.
    pub const NONE: Self = Self { attempts: 1, backoff: Duration::from_ticks(0) };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 3, backoff: Duration::from_millis(10) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionConfig {
    pub imu: Lsm6dsoxConfig,
    pub magnetometer: Lis3mdlConfig,
    /// Read the gyroscope every iteration.
    pub sample_gyroscope: bool,
    /// Read the magnetometer every iteration, when one was brought up.
    pub sample_magnetometer: bool,
    pub retry: RetryPolicy,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            imu: Lsm6dsoxConfig::default(),
            magnetometer: Lis3mdlConfig::default(),
            sample_gyroscope: false,
            sample_magnetometer: false,
            retry: RetryPolicy::default(),
        }
    }
}
