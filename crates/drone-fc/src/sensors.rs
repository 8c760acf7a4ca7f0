use embedded_hal_async::i2c::I2c;
use lis3mdl::{FullScale, Lis3mdl, Lis3mdlConfig};
use lsm6dsox::{ImuScale, Lsm6dsox, Lsm6dsoxConfig, Vector3};

use crate::config::{AcquisitionConfig, RetryPolicy};
use crate::error::Error;

/// Re-run `$op` until it succeeds or the policy's attempts run out,
/// sleeping `backoff` in between. Yields the last result.
macro_rules! retry {
    ($policy:expr, $what:literal, $op:expr) => {{
        let policy: RetryPolicy = $policy;
        let attempts = policy.attempts.max(1);
        let mut attempt = 1u8;
        loop {
            match $op {
                Ok(value) => break Ok(value),
                Err(_) if attempt < attempts => {
                    warn!("{} failed ({}/{}), retrying", $what, attempt, attempts);
                    attempt += 1;
                    embassy_time::Timer::after(policy.backoff).await;
                }
                Err(err) => break Err(err),
            }
        }
    }};
}

/// The sensor set after bring-up: an IMU and an optional magnetometer.
pub struct Sensors<I> {
    imu: Lsm6dsox<I>,
    magnetometer: Option<Lis3mdl<I>>,
    retry: RetryPolicy,
}

impl<I: I2c> Sensors<I> {
    /// Verify and configure every chip, retrying each as a whole.
    pub async fn bring_up(
        mut imu: Lsm6dsox<I>,
        magnetometer: Option<Lis3mdl<I>>,
        config: &AcquisitionConfig,
    ) -> Result<Self, Error<I::Error>> {
        let scale = retry!(
            config.retry,
            "IMU bring-up",
            start_imu(&mut imu, &config.imu).await
        )?;
        info!(
            "IMU ready: accel {} mg/LSB, gyro {} mdps/LSB",
            scale.accel_sensitivity(),
            scale.gyro_sensitivity()
        );

        let magnetometer = match magnetometer {
            Some(mut mag) => {
                let fs = retry!(
                    config.retry,
                    "magnetometer bring-up",
                    start_magnetometer(&mut mag, &config.magnetometer).await
                )?;
                info!("magnetometer ready: {} LSB/gauss", fs.sensitivity());
                Some(mag)
            }
            None => None,
        };

        Ok(Self { imu, magnetometer, retry: config.retry })
    }

    pub fn imu_scale(&self) -> Option<ImuScale> {
        self.imu.scale()
    }

    pub fn has_magnetometer(&self) -> bool {
        self.magnetometer.is_some()
    }

    /// Acceleration in mg.
    pub async fn read_acceleration(&mut self) -> Result<Vector3, Error<I::Error>> {
        Ok(retry!(self.retry, "accel read", self.imu.read_accel().await)?)
    }

    /// Angular rate in dps.
    pub async fn read_gyroscope(&mut self) -> Result<Vector3, Error<I::Error>> {
        let mdps = retry!(self.retry, "gyro read", self.imu.read_gyro().await)?;
        Ok(lsm6dsox::mdps_to_dps(mdps))
    }

    /// Magnetic field in gauss, or `None` without a magnetometer.
    pub async fn read_magnetometer(
        &mut self,
    ) -> Result<Option<Vector3>, Error<I::Error>> {
        let Some(mag) = self.magnetometer.as_mut() else {
            return Ok(None);
        };
        let field = retry!(self.retry, "magnetometer read", mag.read_field().await)?;
        Ok(Some(field))
    }

    /// Hand the bus handles back.
    pub fn release(self) -> (I, Option<I>) {
        (self.imu.release(), self.magnetometer.map(Lis3mdl::release))
    }
}

async fn start_imu<I: I2c>(
    imu: &mut Lsm6dsox<I>,
    config: &Lsm6dsoxConfig,
) -> Result<ImuScale, lsm6dsox::Error<I::Error>> {
    imu.verify().await?;
    imu.configure(config).await
}

async fn start_magnetometer<I: I2c>(
    mag: &mut Lis3mdl<I>,
    config: &Lis3mdlConfig,
) -> Result<FullScale, lis3mdl::Error<I::Error>> {
    mag.verify().await?;
    mag.configure(config).await
}
