/// Errors that can occur during a register transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The underlying bus reported a failure (NACK, arbitration loss, ...).
    I2c(E),
    /// The transaction did not complete within the configured [`Timeout`](crate::Timeout).
    Timeout,
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::I2c(err) => write!(f, "I2C transaction failed: {:?}", err),
            Error::Timeout => write!(f, "I2C transaction timed out"),
        }
    }
}
