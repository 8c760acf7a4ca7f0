use embedded_hal_async::i2c::I2c;

use crate::error::Error;
use crate::register::Register;
use crate::timeout::Timeout;

/// Byte-wide register access to one device on an I2C bus.
///
/// The bus handle is bound to the device's 7-bit address here; the handle
/// itself is created and owned by whoever set up the bus.
#[derive(Debug)]
pub struct RegisterInterface<I2C> {
    i2c: I2C,
    address: u8,
    timeout: Timeout,
}

impl<I2C: I2c> RegisterInterface<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address, timeout: Timeout::default() }
    }

    /// Replace the per-transaction timeout.
    pub fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    /// Give the bus handle back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Read `buf.len()` consecutive bytes starting at `start`.
    pub async fn read_registers(
        &mut self,
        start: u8,
        buf: &mut [u8],
    ) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        self.timeout
            .run(self.i2c.write_read(address, &[start], buf))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Error::I2c)
    }

    pub async fn read_register(
        &mut self,
        register: u8,
    ) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8];
        self.read_registers(register, &mut buf).await?;
        Ok(buf[0])
    }

    pub async fn write_register(
        &mut self,
        register: u8,
        value: u8,
    ) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        self.timeout
            .run(self.i2c.write(address, &[register, value]))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Error::I2c)
    }

    /// Read and decode a typed register.
    pub async fn read<R: Register>(&mut self) -> Result<R, Error<I2C::Error>> {
        self.read_register(R::ADDRESS).await.map(R::from_byte)
    }

    pub async fn write<R: Register>(
        &mut self,
        value: R,
    ) -> Result<(), Error<I2C::Error>> {
        self.write_register(R::ADDRESS, value.to_byte()).await
    }

    /// Read-modify-write a typed register and return the value written.
    ///
    /// `f` receives the decoded current contents, reserved bits included.
    pub async fn modify<R, F>(&mut self, f: F) -> Result<R, Error<I2C::Error>>
    where
        R: Register,
        F: FnOnce(R) -> R,
    {
        let current = self.read::<R>().await?;
        let updated = f(current);
        self.write(updated).await?;
        Ok(updated)
    }
}
