use bitflags::bitflags;
use mems_bus::{field, with_field, Register as TypedRegister};
use num_enum::{IntoPrimitive, TryFromPrimitive};

#[allow(non_camel_case_types)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    WHO_AM_I = 0x0F,
    CTRL_REG1 = 0x20,
    CTRL_REG2 = 0x21,
    CTRL_REG3 = 0x22,
    CTRL_REG4 = 0x23,
    CTRL_REG5 = 0x24,
    STATUS_REG = 0x27,
    OUT_X_L = 0x28,
    OUT_X_H = 0x29,
    OUT_Y_L = 0x2A,
    OUT_Y_H = 0x2B,
    OUT_Z_L = 0x2C,
    OUT_Z_H = 0x2D,
    TEMP_OUT_L = 0x2E,
    TEMP_OUT_H = 0x2F,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

pub const WHO_AM_I_VALUE: u8 = 0x3D;

/// Set in the register byte to make the part advance its address pointer.
/// Without it a burst read returns the same register over and over.
pub const AUTO_INCREMENT: u8 = 0x80;

/// Per-axis operating mode, shared by OM (X/Y) and OMZ (Z).
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    #[default]
    LowPower = 0,
    MediumPerformance = 1,
    HighPerformance = 2,
    UltraHighPerformance = 3,
}

impl OperatingMode {
    /// Every two-bit code is defined.
    pub fn from_code(code: u8) -> Self {
        Self::try_from(code & 0b11).unwrap_or_default()
    }
}

/// Output data rate selected by DO when FAST_ODR is clear.
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    Odr0_625Hz = 0,
    Odr1_25Hz = 1,
    Odr2_5Hz = 2,
    Odr5Hz = 3,
    #[default]
    Odr10Hz = 4,
    Odr20Hz = 5,
    Odr40Hz = 6,
    Odr80Hz = 7,
}

impl DataRate {
    pub fn from_code(code: u8) -> Self {
        Self::try_from(code & 0b111).unwrap_or_default()
    }
}

/// CTRL_REG3 MD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemMode {
    Continuous,
    Single,
    #[default]
    PowerDown,
}

impl SystemMode {
    /// Codes 10 and 11 both mean power-down.
    pub const fn from_code(code: u8) -> Self {
        match code & 0b11 {
            0b00 => Self::Continuous,
            0b01 => Self::Single,
            _ => Self::PowerDown,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            Self::Continuous => 0b00,
            Self::Single => 0b01,
            Self::PowerDown => 0b11,
        }
    }
}

/// Magnetometer full-scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FullScale {
    Fs4Gauss,
    Fs8Gauss,
    Fs12Gauss,
    Fs16Gauss,
}

impl FullScale {
    pub const fn from_code(code: u8) -> Self {
        match code {
            0b00 => Self::Fs4Gauss,
            0b01 => Self::Fs8Gauss,
            0b10 => Self::Fs12Gauss,
            0b11 => Self::Fs16Gauss,
            _ => Self::Fs4Gauss,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            Self::Fs4Gauss => 0b00,
            Self::Fs8Gauss => 0b01,
            Self::Fs12Gauss => 0b10,
            Self::Fs16Gauss => 0b11,
        }
    }

    /// Sensitivity in LSB/gauss. Divide raw counts by this.
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::Fs4Gauss => 6842.0,
            Self::Fs8Gauss => 3421.0,
            Self::Fs12Gauss => 2281.0,
            Self::Fs16Gauss => 1711.0,
        }
    }
}

bitflags! {
    /// CTRL_REG1
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct CtrlReg1: u8 {
        const TEMP_EN  = 0b1000_0000;
        const OM1      = 0b0100_0000;
        const OM0      = 0b0010_0000;
        const DO2      = 0b0001_0000;
        const DO1      = 0b0000_1000;
        const DO0      = 0b0000_0100;
        const FAST_ODR = 0b0000_0010;
        const ST       = 0b0000_0001;

        const OM = Self::OM1.bits() | Self::OM0.bits();
        const DO = Self::DO2.bits() | Self::DO1.bits() | Self::DO0.bits();
    }
}

impl CtrlReg1 {
    pub fn operating_mode(&self) -> OperatingMode {
        OperatingMode::from_code(field(self.bits(), Self::OM.bits()))
    }

    pub fn with_operating_mode(self, mode: OperatingMode) -> Self {
        Self::from_bits_retain(with_field(self.bits(), Self::OM.bits(), mode.into()))
    }

    pub fn data_rate(&self) -> DataRate {
        DataRate::from_code(field(self.bits(), Self::DO.bits()))
    }

    pub fn with_data_rate(self, rate: DataRate) -> Self {
        Self::from_bits_retain(with_field(self.bits(), Self::DO.bits(), rate.into()))
    }

    pub const fn fast_odr(&self) -> bool {
        self.contains(Self::FAST_ODR)
    }

    pub const fn with_fast_odr(self, en: bool) -> Self {
        let reg = self.difference(Self::FAST_ODR);
        match en {
            false => reg,
            true => reg.union(Self::FAST_ODR),
        }
    }
}

bitflags! {
    /// CTRL_REG2
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct CtrlReg2: u8 {
        const FS1      = 0b0100_0000;
        const FS0      = 0b0010_0000;
        const REBOOT   = 0b0000_1000;
        const SOFT_RST = 0b0000_0100;

        const FS = Self::FS1.bits() | Self::FS0.bits();
    }
}

impl CtrlReg2 {
    pub const fn full_scale(&self) -> FullScale {
        FullScale::from_code(field(self.bits(), Self::FS.bits()))
    }

    pub const fn with_full_scale(self, fs: FullScale) -> Self {
        Self::from_bits_retain(with_field(self.bits(), Self::FS.bits(), fs.code()))
    }
}

bitflags! {
    /// CTRL_REG3
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct CtrlReg3: u8 {
        const LP  = 0b0010_0000;
        const SIM = 0b0000_0100;
        const MD1 = 0b0000_0010;
        const MD0 = 0b0000_0001;

        const MD = Self::MD1.bits() | Self::MD0.bits();
    }
}

impl CtrlReg3 {
    pub const fn system_mode(&self) -> SystemMode {
        SystemMode::from_code(field(self.bits(), Self::MD.bits()))
    }

    pub const fn with_system_mode(self, mode: SystemMode) -> Self {
        Self::from_bits_retain(with_field(self.bits(), Self::MD.bits(), mode.code()))
    }
}

bitflags! {
    /// CTRL_REG4
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct CtrlReg4: u8 {
        const OMZ1 = 0b0000_1000;
        const OMZ0 = 0b0000_0100;
        const BLE  = 0b0000_0010;

        const OMZ = Self::OMZ1.bits() | Self::OMZ0.bits();
    }
}

impl CtrlReg4 {
    pub fn z_mode(&self) -> OperatingMode {
        OperatingMode::from_code(field(self.bits(), Self::OMZ.bits()))
    }

    pub fn with_z_mode(self, mode: OperatingMode) -> Self {
        Self::from_bits_retain(with_field(self.bits(), Self::OMZ.bits(), mode.into()))
    }
}

macro_rules! typed_register {
    ($ty:ty, $reg:expr) => {
        impl TypedRegister for $ty {
            const ADDRESS: u8 = $reg.addr();

            fn from_byte(byte: u8) -> Self {
                Self::from_bits_retain(byte)
            }

            fn to_byte(self) -> u8 {
                self.bits()
            }
        }
    };
}

typed_register!(CtrlReg1, Register::CTRL_REG1);
typed_register!(CtrlReg2, Register::CTRL_REG2);
typed_register!(CtrlReg3, Register::CTRL_REG3);
typed_register!(CtrlReg4, Register::CTRL_REG4);

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [OperatingMode; 4] = [
        OperatingMode::LowPower,
        OperatingMode::MediumPerformance,
        OperatingMode::HighPerformance,
        OperatingMode::UltraHighPerformance,
    ];

    #[test]
    fn ctrl_reg1_fields_round_trip() {
        for mode in MODES {
            for code in 0..8u8 {
                let rate = DataRate::from_code(code);
                for fast in [false, true] {
                    for st in [false, true] {
                        let reg = CtrlReg1::from_bits_retain(st as u8 | 0x80)
                            .with_operating_mode(mode)
                            .with_data_rate(rate)
                            .with_fast_odr(fast);
                        let decoded = CtrlReg1::from_byte(reg.to_byte());
                        assert_eq!(decoded.operating_mode(), mode);
                        assert_eq!(decoded.data_rate(), rate);
                        assert_eq!(decoded.fast_odr(), fast);
                        assert_eq!(decoded.contains(CtrlReg1::ST), st);
                        assert!(decoded.contains(CtrlReg1::TEMP_EN));
                    }
                }
            }
        }
    }

    #[test]
    fn ctrl_reg1_matches_datasheet_bit_positions() {
        let reg = CtrlReg1::empty()
            .with_operating_mode(OperatingMode::HighPerformance)
            .with_fast_odr(true);
        assert_eq!(reg.bits(), 0b0100_0010);
    }

    #[test]
    fn z_mode_and_system_mode_round_trip() {
        for initial in 0..=u8::MAX {
            for mode in MODES {
                let reg = CtrlReg4::from_bits_retain(initial).with_z_mode(mode);
                assert_eq!(reg.z_mode(), mode);
                assert_eq!(reg.bits() & !0b1100, initial & !0b1100);
            }
            for mode in [SystemMode::Continuous, SystemMode::Single, SystemMode::PowerDown] {
                let reg = CtrlReg3::from_bits_retain(initial).with_system_mode(mode);
                assert_eq!(reg.system_mode(), mode);
                assert_eq!(reg.bits() & !0b11, initial & !0b11);
            }
        }
    }

    #[test]
    fn both_power_down_codes_decode() {
        assert_eq!(SystemMode::from_code(0b10), SystemMode::PowerDown);
        assert_eq!(SystemMode::from_code(0b11), SystemMode::PowerDown);
    }

    #[test]
    fn sensitivity_table() {
        assert_eq!(CtrlReg2::from_bits_retain(0b0000_0000).full_scale().sensitivity(), 6842.0);
        assert_eq!(CtrlReg2::from_bits_retain(0b0010_0000).full_scale().sensitivity(), 3421.0);
        assert_eq!(CtrlReg2::from_bits_retain(0b0100_0000).full_scale().sensitivity(), 2281.0);
        assert_eq!(CtrlReg2::from_bits_retain(0b0110_0000).full_scale().sensitivity(), 1711.0);
        // Unused bits do not disturb the decode.
        assert_eq!(CtrlReg2::from_bits_retain(0b1001_1111).full_scale(), FullScale::Fs4Gauss);
        assert_eq!(FullScale::from_code(0x7), FullScale::Fs4Gauss);
    }
}
