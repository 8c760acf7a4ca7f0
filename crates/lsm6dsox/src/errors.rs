use derive_more::From;

#[derive(Debug, From, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<I2cE> {
    Interface(mems_bus::Error<I2cE>),
    Register(RegisterError),
    #[from(ignore)]
    InvalidWhoAmI(u8),
    #[from(ignore)]
    NotConfigured,
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Interface(err) => write!(f, "bus error: {:?}", err),
            Error::Register(err) => write!(f, "register error: {}", err),
            Error::InvalidWhoAmI(value) => {
                write!(f, "unexpected WHO_AM_I value: {:#04x}", value)
            }
            Error::NotConfigured => write!(f, "device has not been configured"),
        }
    }
}

/// A register field held a code with no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterError {
    InvalidAccelOdr(u8),
    InvalidGyroOdr(u8),
}

impl core::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RegisterError::InvalidAccelOdr(value) => {
                write!(f, "Invalid accelerometer ODR value: {}", value)
            }
            RegisterError::InvalidGyroOdr(value) => {
                write!(f, "Invalid gyroscope ODR value: {}", value)
            }
        }
    }
}
