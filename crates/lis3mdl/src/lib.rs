#![cfg_attr(not(test), no_std)]
//! Async driver for the ST LIS3MDL three-axis magnetometer.
//!
//! Unlike the inertial parts, the LIS3MDL datasheet states sensitivity in
//! LSB/gauss, so converted reads divide by the sensitivity instead of
//! multiplying.
//!
//! Multi-byte reads must set bit 7 of the register address
//! ([`registers::AUTO_INCREMENT`]). The LSM6DSOX increments by default, this
//! part does not.

mod errors;
pub mod registers;

pub use errors::Error;
pub use mems_bus::{Axis, RawSample, Timeout, Vector3};
pub use registers::{DataRate, FullScale, OperatingMode, SystemMode};

use embedded_hal_async::i2c::I2c;
use mems_bus::RegisterInterface;
use registers::{
    CtrlReg1, CtrlReg2, CtrlReg3, CtrlReg4, Register, AUTO_INCREMENT, WHO_AM_I_VALUE,
};

/// 7-bit address with SDO/SA1 tied low.
pub const DEFAULT_ADDRESS: u8 = 0x1E;
/// 7-bit address with SDO/SA1 tied high.
pub const ALTERNATE_ADDRESS: u8 = 0x1C;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Lis3mdlConfig {
    pub xy_mode: OperatingMode,
    pub z_mode: OperatingMode,
    /// Let the operating mode pick a rate above 80 Hz.
    pub fast_odr: bool,
    pub system_mode: SystemMode,
    /// `None` keeps the chip's DO field.
    pub data_rate: Option<DataRate>,
    /// `None` keeps the chip's FS field.
    pub full_scale: Option<FullScale>,
}

impl Default for Lis3mdlConfig {
    fn default() -> Self {
        Self {
            xy_mode: OperatingMode::HighPerformance,
            z_mode: OperatingMode::HighPerformance,
            fast_odr: true,
            system_mode: SystemMode::Continuous,
            data_rate: None,
            full_scale: None,
        }
    }
}

pub struct Lis3mdl<I2C> {
    regs: RegisterInterface<I2C>,
    full_scale: Option<FullScale>,
}

impl<I2C: I2c> Lis3mdl<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { regs: RegisterInterface::new(i2c, address), full_scale: None }
    }

    pub fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.regs = self.regs.with_timeout(timeout);
        self
    }

    pub fn address(&self) -> u8 {
        self.regs.address()
    }

    pub fn full_scale(&self) -> Option<FullScale> {
        self.full_scale
    }

    pub fn release(self) -> I2C {
        self.regs.release()
    }

    pub async fn who_am_i(&mut self) -> Result<u8, Error<I2C::Error>> {
        Ok(self.regs.read_register(Register::WHO_AM_I.addr()).await?)
    }

    pub async fn verify(&mut self) -> Result<(), Error<I2C::Error>> {
        match self.who_am_i().await? {
            WHO_AM_I_VALUE => Ok(()),
            other => Err(Error::InvalidWhoAmI(other)),
        }
    }

    /// Apply `config` and latch the full-scale range for conversions.
    pub async fn configure(
        &mut self,
        config: &Lis3mdlConfig,
    ) -> Result<FullScale, Error<I2C::Error>> {
        self.regs
            .modify(|r: CtrlReg1| {
                let r = r
                    .with_operating_mode(config.xy_mode)
                    .with_fast_odr(config.fast_odr);
                match config.data_rate {
                    Some(rate) => r.with_data_rate(rate),
                    None => r,
                }
            })
            .await?;
        self.regs
            .modify(|r: CtrlReg4| r.with_z_mode(config.z_mode))
            .await?;
        self.regs
            .modify(|r: CtrlReg3| r.with_system_mode(config.system_mode))
            .await?;

        let ctrl2 = match config.full_scale {
            Some(fs) => self.regs.modify(|r: CtrlReg2| r.with_full_scale(fs)).await?,
            None => self.regs.read::<CtrlReg2>().await?,
        };
        let full_scale = ctrl2.full_scale();
        self.full_scale = Some(full_scale);
        Ok(full_scale)
    }

    /// Burst-read OUT_X_L..OUT_Z_H with the auto-increment bit set.
    pub async fn read_raw(&mut self) -> Result<RawSample, Error<I2C::Error>> {
        let mut buf = [0u8; 6];
        self.regs
            .read_registers(Register::OUT_X_L.addr() | AUTO_INCREMENT, &mut buf)
            .await?;
        Ok(RawSample::from_le_bytes(buf))
    }

    /// Magnetic field in gauss.
    pub async fn read_field(&mut self) -> Result<Vector3, Error<I2C::Error>> {
        let sensitivity = self.sensitivity()?;
        let raw = self.read_raw().await?;
        Ok(raw.map(|v| convert(v, sensitivity)))
    }

    /// Single axis in gauss.
    pub async fn read_axis(&mut self, axis: Axis) -> Result<f32, Error<I2C::Error>> {
        let sensitivity = self.sensitivity()?;
        let mut buf = [0u8; 2];
        self.regs
            .read_registers(
                (Register::OUT_X_L.addr() + axis.offset()) | AUTO_INCREMENT,
                &mut buf,
            )
            .await?;
        Ok(convert(i16::from_le_bytes(buf), sensitivity))
    }

    fn sensitivity(&self) -> Result<f32, Error<I2C::Error>> {
        self.full_scale
            .map(FullScale::sensitivity)
            .ok_or(Error::NotConfigured)
    }
}

/// Raw count to gauss for a sensitivity in LSB/gauss.
pub fn convert(raw: i16, sensitivity: f32) -> f32 {
    f32::from(raw) / sensitivity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_divides_by_sensitivity() {
        let scales = [
            FullScale::Fs4Gauss,
            FullScale::Fs8Gauss,
            FullScale::Fs12Gauss,
            FullScale::Fs16Gauss,
        ];
        for raw in [i16::MIN, -1, 0, 1, i16::MAX] {
            for fs in scales {
                let expected = raw as f32 / fs.sensitivity();
                assert!((convert(raw, fs.sensitivity()) - expected).abs() < 1e-6);
            }
        }
        assert!((convert(6842, 6842.0) - 1.0).abs() < 1e-6);
    }
}
