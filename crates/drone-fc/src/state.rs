use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use mems_bus::{TimedOut, Timeout, Vector3};

use crate::orientation::Attitude;

/// A horizontal-plane quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Planar {
    pub x: f32,
    pub y: f32,
}

impl Planar {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Advance by `rate` over `dt` seconds.
    pub fn integrate(&mut self, rate: Planar, dt: f32) {
        self.x += rate.x * dt;
        self.y += rate.y * dt;
    }
}

/// One acquisition iteration's worth of converted data.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    pub attitude: Attitude,
    /// m/s^2
    pub acceleration: Vector3,
    /// dps
    pub angular_rate: Option<Vector3>,
    /// gauss
    pub magnetic_field: Option<Vector3>,
}

/// The record exchanged between the acquisition and consumer tasks.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlightState {
    /// Number of samples published so far.
    pub sequence: u32,
    pub attitude: Attitude,
    /// m/s^2
    pub acceleration: Vector3,
    /// dps, when the gyroscope is sampled.
    pub angular_rate: Option<Vector3>,
    /// gauss, when the magnetometer is sampled.
    pub magnetic_field: Option<Vector3>,
    /// m/s, integrated by the consumer.
    pub velocity: Planar,
    /// m, integrated by the consumer.
    pub position: Planar,
}

impl FlightState {
    pub const INITIAL: Self = Self {
        sequence: 0,
        attitude: Attitude::LEVEL,
        acceleration: Vector3::ZERO,
        angular_rate: None,
        magnetic_field: None,
        velocity: Planar::ZERO,
        position: Planar::ZERO,
    };

    /// Producer side: overwrite the measured fields.
    pub fn apply(&mut self, sample: &Sample) {
        self.sequence = self.sequence.wrapping_add(1);
        self.attitude = sample.attitude;
        self.acceleration = sample.acceleration;
        self.angular_rate = sample.angular_rate;
        self.magnetic_field = sample.magnetic_field;
    }

    /// Consumer side: step velocity and position from the horizontal
    /// acceleration over `dt` seconds.
    pub fn integrate(&mut self, dt: f32) {
        let accel = Planar::new(self.acceleration.x, self.acceleration.y);
        self.velocity.integrate(accel, dt);
        self.position.integrate(self.velocity, dt);
    }
}

impl Default for FlightState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Flight state behind one mutex, shared by reference between tasks.
///
/// The whole record is one locked unit. Every acquire is bounded by the
/// configured [`Timeout`]; [`Timeout::Never`] waits indefinitely.
pub struct SharedState<M: RawMutex> {
    state: Mutex<M, FlightState>,
    timeout: Timeout,
}

impl<M: RawMutex> SharedState<M> {
    pub const fn new(timeout: Timeout) -> Self {
        Self { state: Mutex::new(FlightState::INITIAL), timeout }
    }

    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    pub async fn lock(&self) -> Result<MutexGuard<'_, M, FlightState>, TimedOut> {
        self.timeout.run(self.state.lock()).await
    }

    /// Run `f` with the lock held. The lock is released before returning.
    pub async fn update<R>(
        &self,
        f: impl FnOnce(&mut FlightState) -> R,
    ) -> Result<R, TimedOut> {
        let mut guard = self.lock().await?;
        Ok(f(&mut guard))
    }

    /// Copy of the whole record.
    pub async fn snapshot(&self) -> Result<FlightState, TimedOut> {
        Ok(*self.lock().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_time::Duration;

    fn sample(ax: f32) -> Sample {
        Sample {
            attitude: Attitude { pitch: 0.1, roll: -0.1 },
            acceleration: Vector3::new(ax, 0.0, 9.8),
            angular_rate: None,
            magnetic_field: Some(Vector3::new(0.2, 0.0, -0.4)),
        }
    }

    #[test]
    fn apply_replaces_measurements_and_counts() {
        let mut state = FlightState::INITIAL;
        state.velocity = Planar::new(1.0, 1.0);
        state.apply(&sample(2.0));

        assert_eq!(state.sequence, 1);
        assert_eq!(state.acceleration.x, 2.0);
        assert_eq!(state.attitude.pitch, 0.1);
        assert!(state.magnetic_field.is_some());
        // Integrated fields belong to the consumer.
        assert_eq!(state.velocity, Planar::new(1.0, 1.0));
    }

    #[test]
    fn integrate_uses_semi_implicit_euler() {
        let mut state = FlightState::INITIAL;
        state.apply(&sample(2.0));
        state.integrate(0.5);
        assert_eq!(state.velocity, Planar::new(1.0, 0.0));
        assert_eq!(state.position, Planar::new(0.5, 0.0));

        state.integrate(0.5);
        assert_eq!(state.velocity, Planar::new(2.0, 0.0));
        assert_eq!(state.position, Planar::new(1.5, 0.0));
    }

    #[futures_test::test]
    async fn update_and_snapshot_round_trip() {
        let shared = SharedState::<NoopRawMutex>::new(Timeout::Never);
        let seq = shared.update(|s| {
            s.apply(&sample(1.0));
            s.sequence
        });
        assert_eq!(seq.await, Ok(1));
        assert_eq!(shared.snapshot().await.unwrap().acceleration.x, 1.0);
    }

    #[futures_test::test]
    async fn held_lock_times_out() {
        let shared = SharedState::<NoopRawMutex>::new(Timeout::After(
            Duration::from_millis(5),
        ));
        let guard = shared.lock().await.unwrap();
        assert_eq!(shared.snapshot().await, Err(TimedOut));
        drop(guard);
        assert!(shared.snapshot().await.is_ok());
    }
}
