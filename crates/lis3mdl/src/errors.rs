use derive_more::From;

#[derive(Debug, From, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<I2cE> {
    Interface(mems_bus::Error<I2cE>),
    #[from(ignore)]
    InvalidWhoAmI(u8),
    #[from(ignore)]
    NotConfigured,
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Interface(err) => write!(f, "bus error: {:?}", err),
            Error::InvalidWhoAmI(value) => {
                write!(f, "unexpected WHO_AM_I value: {:#04x}", value)
            }
            Error::NotConfigured => write!(f, "device has not been configured"),
        }
    }
}
