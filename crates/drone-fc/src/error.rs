use derive_more::From;
use mems_bus::TimedOut;

#[derive(Debug, From, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<I2cE> {
    /// Accelerometer/gyroscope failure.
    Imu(lsm6dsox::Error<I2cE>),
    Magnetometer(lis3mdl::Error<I2cE>),
    /// The shared flight state stayed locked past its timeout.
    #[from(ignore)]
    LockTimeout,
}

impl<E> Error<E> {
    /// Short name of the failure, usable in logs without formatting `E`.
    pub fn describe(&self) -> &'static str {
        match self {
            Error::Imu(e) => match e {
                lsm6dsox::Error::Interface(mems_bus::Error::I2c(_)) => "IMU bus error",
                lsm6dsox::Error::Interface(mems_bus::Error::Timeout) => "IMU bus timeout",
                lsm6dsox::Error::Register(_) => "IMU register decode",
                lsm6dsox::Error::InvalidWhoAmI(_) => "IMU WHO_AM_I mismatch",
                lsm6dsox::Error::NotConfigured => "IMU not configured",
            },
            Error::Magnetometer(e) => match e {
                lis3mdl::Error::Interface(mems_bus::Error::I2c(_)) => "magnetometer bus error",
                lis3mdl::Error::Interface(mems_bus::Error::Timeout) => {
                    "magnetometer bus timeout"
                }
                lis3mdl::Error::InvalidWhoAmI(_) => "magnetometer WHO_AM_I mismatch",
                lis3mdl::Error::NotConfigured => "magnetometer not configured",
            },
            Error::LockTimeout => "flight state lock timeout",
        }
    }
}

impl<E> From<TimedOut> for Error<E> {
    fn from(_: TimedOut) -> Self {
        Error::LockTimeout
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Imu(err) => write!(f, "IMU error: {}", err),
            Error::Magnetometer(err) => write!(f, "magnetometer error: {}", err),
            Error::LockTimeout => write!(f, "timed out waiting for flight state"),
        }
    }
}
