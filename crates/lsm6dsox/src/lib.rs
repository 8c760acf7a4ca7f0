#![cfg_attr(not(test), no_std)]
//! Async driver for the ST LSM6DSOX accelerometer + gyroscope.
//!
//! The driver owns a bus handle bound to the chip's 7-bit address. Every
//! configuration step is a read-modify-write of one control register so bits
//! the driver does not manage keep their value. [`Lsm6dsox::configure`] also
//! reads back the full-scale selection and stores the matching sensitivity,
//! which every converted read uses afterwards.

mod errors;
pub mod registers;

pub use errors::{Error, RegisterError};
pub use mems_bus::{Axis, RawSample, Timeout, Vector3};
pub use registers::{AccelFs, AccelOdr, GyroFs, GyroOdr};

use embedded_hal_async::i2c::I2c;
use mems_bus::RegisterInterface;
use registers::{Ctrl1Xl, Ctrl2G, Ctrl6C, Ctrl7G, Ctrl8Xl, Register, WHO_AM_I_VALUE};

/// 7-bit address with SA0 tied low.
pub const DEFAULT_ADDRESS: u8 = 0x6A;
/// 7-bit address with SA0 tied high.
pub const ALTERNATE_ADDRESS: u8 = 0x6B;

/// One milli-g expressed in m/s^2 is 1 / 101.94.
const MG_PER_MPS2: f32 = 101.94;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Lsm6dsoxConfig {
    pub accel_odr: AccelOdr,
    pub gyro_odr: GyroOdr,
    /// Route accelerometer output through the LPF2 stage.
    pub accel_lpf2: bool,
    /// Run both sensors in high-performance mode.
    pub high_performance: bool,
    /// Full-scale range to program; `None` keeps whatever the chip holds.
    pub accel_fs: Option<AccelFs>,
    pub gyro_fs: Option<GyroFs>,
}

impl Default for Lsm6dsoxConfig {
    fn default() -> Self {
        Self {
            accel_odr: AccelOdr::Odr12_5Hz,
            gyro_odr: GyroOdr::Odr12_5Hz,
            accel_lpf2: true,
            high_performance: true,
            accel_fs: None,
            gyro_fs: None,
        }
    }
}

/// Full-scale selection read back from the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuScale {
    pub accel: AccelFs,
    pub gyro: GyroFs,
}

impl ImuScale {
    /// mg/LSB
    pub const fn accel_sensitivity(&self) -> f32 {
        self.accel.sensitivity()
    }

    /// mdps/LSB
    pub const fn gyro_sensitivity(&self) -> f32 {
        self.gyro.sensitivity()
    }
}

pub struct Lsm6dsox<I2C> {
    regs: RegisterInterface<I2C>,
    scale: Option<ImuScale>,
}

impl<I2C: I2c> Lsm6dsox<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { regs: RegisterInterface::new(i2c, address), scale: None }
    }

    /// Bound every bus transaction by `timeout`.
    pub fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.regs = self.regs.with_timeout(timeout);
        self
    }

    pub fn address(&self) -> u8 {
        self.regs.address()
    }

    /// Sensitivity selected by the last successful [`configure`](Self::configure).
    pub fn scale(&self) -> Option<ImuScale> {
        self.scale
    }

    pub fn release(self) -> I2C {
        self.regs.release()
    }

    pub async fn who_am_i(&mut self) -> Result<u8, Error<I2C::Error>> {
        Ok(self.regs.read_register(Register::WHO_AM_I.addr()).await?)
    }

    /// Check that the part answering at this address is an LSM6DSOX.
    pub async fn verify(&mut self) -> Result<(), Error<I2C::Error>> {
        match self.who_am_i().await? {
            WHO_AM_I_VALUE => Ok(()),
            other => Err(Error::InvalidWhoAmI(other)),
        }
    }

    /// Put the chip into the operating mode described by `config`.
    ///
    /// Safe to call again; each step only rewrites the fields it owns.
    pub async fn configure(
        &mut self,
        config: &Lsm6dsoxConfig,
    ) -> Result<ImuScale, Error<I2C::Error>> {
        let ctrl1 = self
            .regs
            .modify(|r: Ctrl1Xl| {
                let r = r
                    .with_odr(config.accel_odr)
                    .with_lpf2_xl_en(config.accel_lpf2);
                match config.accel_fs {
                    Some(fs) => r.with_fs_code(fs.code()),
                    None => r,
                }
            })
            .await?;

        // XL_HM_MODE and G_HM_MODE are active-low enables.
        self.regs
            .modify(|r: Ctrl6C| r.with_xl_hm_mode(!config.high_performance))
            .await?;

        let ctrl2 = self
            .regs
            .modify(|r: Ctrl2G| {
                let r = r.with_odr(config.gyro_odr);
                match config.gyro_fs {
                    Some(fs) => {
                        let (fs_125, code) = fs.code();
                        r.with_fs_125(fs_125).with_fs_code(code)
                    }
                    None => r,
                }
            })
            .await?;

        self.regs
            .modify(|r: Ctrl7G| r.with_g_hm_mode(!config.high_performance))
            .await?;

        let ctrl8 = match config.accel_fs {
            // 16 g is only reachable with XL_FS_MODE cleared.
            Some(AccelFs::Fs16G) => {
                self.regs.modify(|r: Ctrl8Xl| r.with_xl_fs_mode(false)).await?
            }
            _ => self.regs.read::<Ctrl8Xl>().await?,
        };

        let scale = ImuScale {
            accel: AccelFs::from_code(ctrl1.fs_code(), ctrl8.xl_fs_mode()),
            gyro: ctrl2.full_scale(),
        };
        self.scale = Some(scale);
        Ok(scale)
    }

    /// Current accelerometer ODR as held by the chip.
    pub async fn accel_odr(&mut self) -> Result<AccelOdr, Error<I2C::Error>> {
        Ok(self.regs.read::<Ctrl1Xl>().await?.odr()?)
    }

    pub async fn gyro_odr(&mut self) -> Result<GyroOdr, Error<I2C::Error>> {
        Ok(self.regs.read::<Ctrl2G>().await?.odr()?)
    }

    fn require_scale(&self) -> Result<ImuScale, Error<I2C::Error>> {
        self.scale.ok_or(Error::NotConfigured)
    }

    async fn read_vector(
        &mut self,
        start: Register,
    ) -> Result<RawSample, Error<I2C::Error>> {
        let mut buf = [0u8; 6];
        self.regs.read_registers(start.addr(), &mut buf).await?;
        Ok(RawSample::from_le_bytes(buf))
    }

    async fn read_axis(
        &mut self,
        start: Register,
        axis: Axis,
    ) -> Result<i16, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.regs
            .read_registers(start.addr() + axis.offset(), &mut buf)
            .await?;
        Ok(i16::from_le_bytes(buf))
    }

    /// Burst-read OUTX_L_A..OUTZ_H_A.
    pub async fn read_accel_raw(&mut self) -> Result<RawSample, Error<I2C::Error>> {
        self.read_vector(Register::OUTX_L_A).await
    }

    /// Burst-read OUTX_L_G..OUTZ_H_G.
    pub async fn read_gyro_raw(&mut self) -> Result<RawSample, Error<I2C::Error>> {
        self.read_vector(Register::OUTX_L_G).await
    }

    /// Acceleration in mg.
    pub async fn read_accel(&mut self) -> Result<Vector3, Error<I2C::Error>> {
        let sensitivity = self.require_scale()?.accel_sensitivity();
        let raw = self.read_accel_raw().await?;
        Ok(raw.map(|v| convert(v, sensitivity)))
    }

    /// Angular rate in mdps.
    pub async fn read_gyro(&mut self) -> Result<Vector3, Error<I2C::Error>> {
        let sensitivity = self.require_scale()?.gyro_sensitivity();
        let raw = self.read_gyro_raw().await?;
        Ok(raw.map(|v| convert(v, sensitivity)))
    }

    /// Single accelerometer axis in mg.
    pub async fn read_accel_axis(&mut self, axis: Axis) -> Result<f32, Error<I2C::Error>> {
        let sensitivity = self.require_scale()?.accel_sensitivity();
        let raw = self.read_axis(Register::OUTX_L_A, axis).await?;
        Ok(convert(raw, sensitivity))
    }

    /// Single gyroscope axis in mdps.
    pub async fn read_gyro_axis(&mut self, axis: Axis) -> Result<f32, Error<I2C::Error>> {
        let sensitivity = self.require_scale()?.gyro_sensitivity();
        let raw = self.read_axis(Register::OUTX_L_G, axis).await?;
        Ok(convert(raw, sensitivity))
    }
}

/// Raw count to physical units for a per-LSB sensitivity.
pub fn convert(raw: i16, sensitivity: f32) -> f32 {
    f32::from(raw) * sensitivity
}

pub fn mg_to_g(mg: Vector3) -> Vector3 {
    mg.scale(0.001)
}

pub fn mg_to_mps2(mg: Vector3) -> Vector3 {
    mg.scale(1.0 / MG_PER_MPS2)
}

pub fn mdps_to_dps(mdps: Vector3) -> Vector3 {
    mdps.scale(0.001)
}
