use super::errors::RegisterError;
use bitflags::bitflags;
use mems_bus::{field, with_field, Register as TypedRegister};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Register map (datasheet section 8).
#[allow(non_camel_case_types)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    WHO_AM_I = 0x0F,
    /// Accelerometer control register 1
    CTRL1_XL = 0x10,
    /// Gyroscope control register 2
    CTRL2_G = 0x11,
    CTRL3_C = 0x12,
    CTRL4_C = 0x13,
    CTRL5_C = 0x14,
    /// Control register 6, holds the accelerometer high-performance bit
    CTRL6_C = 0x15,
    /// Gyroscope control register 7, holds the gyro high-performance bit
    CTRL7_G = 0x16,
    /// Accelerometer control register 8, holds XL_FS_MODE
    CTRL8_XL = 0x17,
    CTRL9_XL = 0x18,
    CTRL10_C = 0x19,
    OUTX_L_G = 0x22,
    OUTX_H_G = 0x23,
    OUTY_L_G = 0x24,
    OUTY_H_G = 0x25,
    OUTZ_L_G = 0x26,
    OUTZ_H_G = 0x27,
    OUTX_L_A = 0x28,
    OUTX_H_A = 0x29,
    OUTY_L_A = 0x2A,
    OUTY_H_A = 0x2B,
    OUTZ_L_A = 0x2C,
    OUTZ_H_A = 0x2D,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Value of WHO_AM_I on a genuine part.
pub const WHO_AM_I_VALUE: u8 = 0x6C;

/// Accelerometer output data rate, CTRL1_XL ODR_XL[3:0].
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelOdr {
    #[default]
    Off = 0,
    Odr12_5Hz = 1,
    Odr26Hz = 2,
    Odr52Hz = 3,
    Odr104Hz = 4,
    Odr208Hz = 5,
    Odr417Hz = 6,
    Odr833Hz = 7,
    Odr1667Hz = 8,
    Odr3333Hz = 9,
    Odr6667Hz = 10,
    /// Low-power mode only.
    Odr1_6Hz = 11,
}

/// Gyroscope output data rate, CTRL2_G ODR_G[3:0].
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroOdr {
    #[default]
    Off = 0,
    Odr12_5Hz = 1,
    Odr26Hz = 2,
    Odr52Hz = 3,
    Odr104Hz = 4,
    Odr208Hz = 5,
    Odr417Hz = 6,
    Odr833Hz = 7,
    Odr1667Hz = 8,
    Odr3333Hz = 9,
    Odr6667Hz = 10,
}

/// Accelerometer full-scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelFs {
    Fs2G,
    Fs4G,
    Fs8G,
    Fs16G,
}

impl AccelFs {
    /// Decode FS_XL, consulting XL_FS_MODE for the `01` code.
    ///
    /// With XL_FS_MODE = 0 the code `01` selects ±16 g; with XL_FS_MODE = 1
    /// the 16 g range is unavailable and `01` falls back to ±2 g.
    pub const fn from_code(fs_xl: u8, xl_fs_mode: bool) -> Self {
        match fs_xl {
            0b00 => Self::Fs2G,
            0b01 => {
                if xl_fs_mode {
                    Self::Fs2G
                } else {
                    Self::Fs16G
                }
            }
            0b10 => Self::Fs4G,
            0b11 => Self::Fs8G,
            _ => Self::Fs2G,
        }
    }

    /// FS_XL code selecting this range. 16 g also needs XL_FS_MODE cleared.
    pub const fn code(self) -> u8 {
        match self {
            Self::Fs2G => 0b00,
            Self::Fs16G => 0b01,
            Self::Fs4G => 0b10,
            Self::Fs8G => 0b11,
        }
    }

    /// Sensitivity in mg/LSB.
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::Fs2G => 0.061,
            Self::Fs4G => 0.122,
            Self::Fs8G => 0.244,
            Self::Fs16G => 0.488,
        }
    }
}

/// Gyroscope full-scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroFs {
    Fs125Dps,
    Fs250Dps,
    Fs500Dps,
    Fs1000Dps,
    Fs2000Dps,
}

impl GyroFs {
    /// Decode FS_125 and FS_G; FS_125 takes precedence.
    pub const fn from_code(fs_125: bool, fs_g: u8) -> Self {
        if fs_125 {
            return Self::Fs125Dps;
        }
        match fs_g {
            0b00 => Self::Fs250Dps,
            0b01 => Self::Fs500Dps,
            0b10 => Self::Fs1000Dps,
            0b11 => Self::Fs2000Dps,
            _ => Self::Fs250Dps,
        }
    }

    /// `(FS_125, FS_G)` selecting this range.
    pub const fn code(self) -> (bool, u8) {
        match self {
            Self::Fs125Dps => (true, 0b00),
            Self::Fs250Dps => (false, 0b00),
            Self::Fs500Dps => (false, 0b01),
            Self::Fs1000Dps => (false, 0b10),
            Self::Fs2000Dps => (false, 0b11),
        }
    }

    /// Sensitivity in mdps/LSB.
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::Fs125Dps => 4.375,
            Self::Fs250Dps => 8.750,
            Self::Fs500Dps => 17.500,
            Self::Fs1000Dps => 35.000,
            Self::Fs2000Dps => 70.000,
        }
    }
}

bitflags! {
    /// CTRL1_XL
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Ctrl1Xl: u8 {
        const ODR_XL3    = 0b1000_0000;
        const ODR_XL2    = 0b0100_0000;
        const ODR_XL1    = 0b0010_0000;
        const ODR_XL0    = 0b0001_0000;
        const FS1_XL     = 0b0000_1000;
        const FS0_XL     = 0b0000_0100;
        const LPF2_XL_EN = 0b0000_0010;

        const ODR_XL = Self::ODR_XL3.bits() | Self::ODR_XL2.bits() | Self::ODR_XL1.bits() | Self::ODR_XL0.bits();
        const FS_XL = Self::FS1_XL.bits() | Self::FS0_XL.bits();
    }
}

impl Ctrl1Xl {
    pub fn odr(&self) -> Result<AccelOdr, RegisterError> {
        let code = field(self.bits(), Self::ODR_XL.bits());
        AccelOdr::try_from(code).map_err(|e| RegisterError::InvalidAccelOdr(e.number))
    }

    pub fn with_odr(self, odr: AccelOdr) -> Self {
        Self::from_bits_retain(with_field(self.bits(), Self::ODR_XL.bits(), odr.into()))
    }

    /// Raw FS_XL code; see [`AccelFs::from_code`].
    pub const fn fs_code(&self) -> u8 {
        field(self.bits(), Self::FS_XL.bits())
    }

    pub const fn with_fs_code(self, code: u8) -> Self {
        Self::from_bits_retain(with_field(self.bits(), Self::FS_XL.bits(), code))
    }

    pub const fn lpf2_xl_en(&self) -> bool {
        self.contains(Self::LPF2_XL_EN)
    }

    pub const fn with_lpf2_xl_en(self, en: bool) -> Self {
        let reg = self.difference(Self::LPF2_XL_EN);
        match en {
            false => reg,
            true => reg.union(Self::LPF2_XL_EN),
        }
    }
}

bitflags! {
    /// CTRL2_G
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Ctrl2G: u8 {
        const ODR_G3 = 0b1000_0000;
        const ODR_G2 = 0b0100_0000;
        const ODR_G1 = 0b0010_0000;
        const ODR_G0 = 0b0001_0000;
        const FS1_G  = 0b0000_1000;
        const FS0_G  = 0b0000_0100;
        const FS_125 = 0b0000_0010;

        const ODR_G = Self::ODR_G3.bits() | Self::ODR_G2.bits() | Self::ODR_G1.bits() | Self::ODR_G0.bits();
        const FS_G = Self::FS1_G.bits() | Self::FS0_G.bits();
    }
}

impl Ctrl2G {
    pub fn odr(&self) -> Result<GyroOdr, RegisterError> {
        let code = field(self.bits(), Self::ODR_G.bits());
        GyroOdr::try_from(code).map_err(|e| RegisterError::InvalidGyroOdr(e.number))
    }

    pub fn with_odr(self, odr: GyroOdr) -> Self {
        Self::from_bits_retain(with_field(self.bits(), Self::ODR_G.bits(), odr.into()))
    }

    pub const fn fs_code(&self) -> u8 {
        field(self.bits(), Self::FS_G.bits())
    }

    pub const fn with_fs_code(self, code: u8) -> Self {
        Self::from_bits_retain(with_field(self.bits(), Self::FS_G.bits(), code))
    }

    pub const fn fs_125(&self) -> bool {
        self.contains(Self::FS_125)
    }

    pub const fn with_fs_125(self, en: bool) -> Self {
        let reg = self.difference(Self::FS_125);
        match en {
            false => reg,
            true => reg.union(Self::FS_125),
        }
    }

    pub const fn full_scale(&self) -> GyroFs {
        GyroFs::from_code(self.fs_125(), self.fs_code())
    }
}

bitflags! {
    /// CTRL6_C
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Ctrl6C: u8 {
        const TRIG_EN    = 0b1000_0000;
        const LVL1_EN    = 0b0100_0000;
        const LVL2_EN    = 0b0010_0000;
        const XL_HM_MODE = 0b0001_0000;
        const USR_OFF_W  = 0b0000_1000;
        const FTYPE2     = 0b0000_0100;
        const FTYPE1     = 0b0000_0010;
        const FTYPE0     = 0b0000_0001;

        const DEN_MODE = Self::TRIG_EN.bits() | Self::LVL1_EN.bits() | Self::LVL2_EN.bits();
        const FTYPE = Self::FTYPE2.bits() | Self::FTYPE1.bits() | Self::FTYPE0.bits();
    }
}

impl Ctrl6C {
    pub const fn xl_hm_mode(&self) -> bool {
        self.contains(Self::XL_HM_MODE)
    }

    pub const fn with_xl_hm_mode(self, en: bool) -> Self {
        let reg = self.difference(Self::XL_HM_MODE);
        match en {
            false => reg,
            true => reg.union(Self::XL_HM_MODE),
        }
    }

    pub const fn ftype(&self) -> u8 {
        field(self.bits(), Self::FTYPE.bits())
    }
}

bitflags! {
    /// CTRL7_G
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Ctrl7G: u8 {
        const G_HM_MODE      = 0b1000_0000;
        const HP_EN_G        = 0b0100_0000;
        const HPM1_G         = 0b0010_0000;
        const HPM0_G         = 0b0001_0000;
        const OIS_ON_EN      = 0b0000_0100;
        const USR_OFF_ON_OUT = 0b0000_0010;
        const OIS_ON         = 0b0000_0001;

        const HPM_G = Self::HPM1_G.bits() | Self::HPM0_G.bits();
    }
}

impl Ctrl7G {
    pub const fn g_hm_mode(&self) -> bool {
        self.contains(Self::G_HM_MODE)
    }

    pub const fn with_g_hm_mode(self, en: bool) -> Self {
        let reg = self.difference(Self::G_HM_MODE);
        match en {
            false => reg,
            true => reg.union(Self::G_HM_MODE),
        }
    }
}

bitflags! {
    /// CTRL8_XL
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Ctrl8Xl: u8 {
        const HPCF_XL2          = 0b1000_0000;
        const HPCF_XL1          = 0b0100_0000;
        const HPCF_XL0          = 0b0010_0000;
        const HP_REF_MODE_XL    = 0b0001_0000;
        const FASTSETTL_MODE_XL = 0b0000_1000;
        const HP_SLOPE_XL_EN    = 0b0000_0100;
        const XL_FS_MODE        = 0b0000_0010;
        const LOW_PASS_ON_6D    = 0b0000_0001;

        const HPCF_XL = Self::HPCF_XL2.bits() | Self::HPCF_XL1.bits() | Self::HPCF_XL0.bits();
    }
}

impl Ctrl8Xl {
    pub const fn xl_fs_mode(&self) -> bool {
        self.contains(Self::XL_FS_MODE)
    }

    pub const fn with_xl_fs_mode(self, en: bool) -> Self {
        let reg = self.difference(Self::XL_FS_MODE);
        match en {
            false => reg,
            true => reg.union(Self::XL_FS_MODE),
        }
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

typed_register!(Ctrl1Xl, Register::CTRL1_XL);
typed_register!(Ctrl2G, Register::CTRL2_G);
typed_register!(Ctrl6C, Register::CTRL6_C);
typed_register!(Ctrl7G, Register::CTRL7_G);
typed_register!(Ctrl8Xl, Register::CTRL8_XL);
