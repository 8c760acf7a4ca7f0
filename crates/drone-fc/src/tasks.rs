//! Bodies of the two periodic tasks.
//!
//! Both loops run on an absolute-deadline [`Ticker`]: a slow iteration makes
//! the next wake-up come early rather than pushing the whole schedule back,
//! and no tick is ever skipped. The board crate wraps these functions in its
//! `#[embassy_executor::task]` entry points:
//!
//! ```ignore
//! static STATE: SharedState<CriticalSectionRawMutex> = SharedState::new(LOCK_TIMEOUT);
//! static SNAPSHOTS: Watch<CriticalSectionRawMutex, FlightState, 2> = Watch::new();
//! static SHUTDOWN: Shutdown = Shutdown::new();
//!
//! #[embassy_executor::task]
//! async fn acquisition(mut acq: Acquisition<I2cDevice<'static, ...>>) {
//!     let _ = acquisition_task(&mut acq, &STATE, TaskConfig::default(), &SHUTDOWN).await;
//! }
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::watch::Watch;
use embassy_time::Ticker;
use embedded_hal_async::i2c::I2c;
use lsm6dsox::{mg_to_g, mg_to_mps2};
use mems_bus::TimedOut;
use portable_atomic::{AtomicBool, Ordering};

use crate::config::{AcquisitionConfig, TaskConfig};
use crate::error::Error;
use crate::orientation::{Attitude, AttitudeEstimator};
use crate::sensors::Sensors;
use crate::state::{FlightState, Sample, SharedState};

/// Cooperative stop request, checked once per loop iteration.
pub struct Shutdown {
    requested: AtomicBool,
}

impl Shutdown {
    pub const fn new() -> Self {
        Self { requested: AtomicBool::new(false) }
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer: sensors, estimator and what to sample each iteration.
pub struct Acquisition<I> {
    sensors: Sensors<I>,
    estimator: AttitudeEstimator,
    config: AcquisitionConfig,
}

impl<I: I2c> Acquisition<I> {
    pub fn new(sensors: Sensors<I>, config: AcquisitionConfig) -> Self {
        Self { sensors, estimator: AttitudeEstimator::new(), config }
    }

    pub fn sensors(&mut self) -> &mut Sensors<I> {
        &mut self.sensors
    }

    pub fn attitude(&self) -> Attitude {
        self.estimator.last()
    }

    /// Read the enabled sensors and estimate attitude. Takes no lock.
    ///
    /// The estimator only advances once every read has succeeded, so a
    /// failed sample leaves it in step with the last published record.
    pub async fn sample(&mut self) -> Result<Sample, Error<I::Error>> {
        let accel_mg = self.sensors.read_acceleration().await?;
        let angular_rate = match self.config.sample_gyroscope {
            true => Some(self.sensors.read_gyroscope().await?),
            false => None,
        };
        let magnetic_field = match self.config.sample_magnetometer {
            true => self.sensors.read_magnetometer().await?,
            false => None,
        };

        let attitude = self.estimator.update(mg_to_g(accel_mg));
        Ok(Sample {
            attitude,
            acceleration: mg_to_mps2(accel_mg),
            angular_rate,
            magnetic_field,
        })
    }

    /// Sample, then publish under the lock. Returns the new sequence number.
    pub async fn step<M: RawMutex>(
        &mut self,
        shared: &SharedState<M>,
    ) -> Result<u32, Error<I::Error>> {
        let previous = self.estimator;
        let sample = self.sample().await?;
        let sequence = match shared
            .update(|state| {
                state.apply(&sample);
                state.sequence
            })
            .await
        {
            Ok(sequence) => sequence,
            Err(e) => {
                // Nothing was published; keep the estimator on the record.
                self.estimator = previous;
                return Err(e.into());
            }
        };
        trace!(
            "sample {}: pitch {} roll {}",
            sequence,
            sample.attitude.pitch,
            sample.attitude.roll
        );
        Ok(sequence)
    }
}

/// Run the producer until `shutdown` is requested or a step fails.
pub async fn acquisition_task<I: I2c, M: RawMutex>(
    acquisition: &mut Acquisition<I>,
    shared: &SharedState<M>,
    task: TaskConfig,
    shutdown: &Shutdown,
) -> Result<(), Error<I::Error>> {
    info!("acquisition running every {} us", task.period.as_micros());
    let mut ticker = Ticker::every(task.period);
    while !shutdown.is_requested() {
        if let Err(e) = acquisition.step(shared).await {
            error!("acquisition stopped: {}", e.describe());
            return Err(e);
        }
        ticker.next().await;
    }
    info!("acquisition shut down");
    Ok(())
}

/// Consumer: integrates planar motion on its own schedule.
pub struct Consumer {
    dt: f32,
    last_sequence: u32,
}

impl Consumer {
    pub fn new(task: TaskConfig) -> Self {
        Self { dt: task.period_secs(), last_sequence: 0 }
    }

    /// Integrate one period under the lock and return the resulting record.
    pub async fn step<M: RawMutex>(
        &mut self,
        shared: &SharedState<M>,
    ) -> Result<FlightState, TimedOut> {
        let dt = self.dt;
        let snapshot = shared
            .update(|state| {
                state.integrate(dt);
                *state
            })
            .await?;
        if snapshot.sequence == self.last_sequence {
            debug!("no new sample since {}", snapshot.sequence);
        }
        self.last_sequence = snapshot.sequence;
        Ok(snapshot)
    }
}

/// Run the consumer until `shutdown` is requested, publishing every snapshot
/// on `snapshots`.
pub async fn consumer_task<M: RawMutex, W: RawMutex, const N: usize>(
    shared: &SharedState<M>,
    snapshots: &Watch<W, FlightState, N>,
    task: TaskConfig,
    shutdown: &Shutdown,
) -> Result<(), TimedOut> {
    let mut consumer = Consumer::new(task);
    let sender = snapshots.sender();
    let mut ticker = Ticker::every(task.period);
    while !shutdown.is_requested() {
        match consumer.step(shared).await {
            Ok(snapshot) => sender.send(snapshot),
            Err(e) => {
                error!(
                    "consumer stopped: flight state lock timed out ({:?})",
                    shared.timeout()
                );
                return Err(e);
            }
        }
        ticker.next().await;
    }
    info!("consumer shut down");
    Ok(())
}
