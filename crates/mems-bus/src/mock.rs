//! Register-file stand-in for a sensor on an I2C bus.
//!
//! Models the auto-incrementing address pointer used by the ST parts: the
//! first byte of a write selects the register, any further bytes are stored
//! at consecutive addresses, and reads continue from the pointer.
//!
//! Some parts (LIS3MDL) only advance the pointer when bit 7 of the register
//! byte is set. [`MockBus::with_sub_auto_increment`] models that: the bit is
//! stripped from the address and, when clear, every byte of the transaction
//! hits the same register.

use embedded_hal_async::i2c::{
    ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation,
};
use heapless::Vec;

/// Capacity of the write log.
pub const LOG_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct MockBus {
    address: u8,
    registers: [u8; 256],
    pointer: u8,
    writes: Vec<(u8, u8), LOG_CAPACITY>,
    transactions: usize,
    nack_skip: usize,
    nack_next: usize,
    hang: bool,
    sub_auto_increment: bool,
    increment: bool,
}

impl MockBus {
    /// A device answering at `address` with every register cleared.
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 256],
            pointer: 0,
            writes: Vec::new(),
            transactions: 0,
            nack_skip: 0,
            nack_next: 0,
            hang: false,
            sub_auto_increment: false,
            increment: true,
        }
    }

    /// Only auto-increment when the register byte has its MSB set.
    pub fn with_sub_auto_increment(mut self) -> Self {
        self.sub_auto_increment = true;
        self
    }

    pub fn with_register(mut self, register: u8, value: u8) -> Self {
        self.registers[usize::from(register)] = value;
        self
    }

    pub fn set_register(&mut self, register: u8, value: u8) {
        self.registers[usize::from(register)] = value;
    }

    pub fn register(&self, register: u8) -> u8 {
        self.registers[usize::from(register)]
    }

    /// Store `bytes` at consecutive registers starting at `start`.
    pub fn load(&mut self, start: u8, bytes: &[u8]) {
        for (offset, byte) in bytes.iter().enumerate() {
            let register = start.wrapping_add(offset as u8);
            self.registers[usize::from(register)] = *byte;
        }
    }

    /// Every `(register, value)` pair written so far, in order.
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Number of bus transactions attempted, failed ones included.
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    /// Refuse the next `count` transactions with an address NACK.
    pub fn nack_next(&mut self, count: usize) {
        self.nack_after(0, count);
    }

    /// Let `skip` transactions through, then refuse the following `count`.
    pub fn nack_after(&mut self, skip: usize, count: usize) {
        self.nack_skip = skip;
        self.nack_next = count;
    }

    /// Make every following transaction wait forever.
    pub fn hang(&mut self, hang: bool) {
        self.hang = hang;
    }
}

impl MockBus {
    fn select(&mut self, register: u8) {
        if self.sub_auto_increment {
            self.pointer = register & 0x7F;
            self.increment = register & 0x80 != 0;
        } else {
            self.pointer = register;
        }
    }

    fn advance(&mut self) {
        if self.increment {
            self.pointer = self.pointer.wrapping_add(1);
        }
    }
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c for MockBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.transactions += 1;
        if self.hang {
            core::future::pending::<()>().await;
        }
        if self.nack_next > 0 {
            if self.nack_skip > 0 {
                self.nack_skip -= 1;
            } else {
                self.nack_next -= 1;
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
        }
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    let Some((register, data)) = bytes.split_first() else {
                        continue;
                    };
                    self.select(*register);
                    for byte in data {
                        self.registers[usize::from(self.pointer)] = *byte;
                        // A full log only stops recording, the write still lands.
                        let _ = self.writes.push((self.pointer, *byte));
                        self.advance();
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.registers[usize::from(self.pointer)];
                        self.advance();
                    }
                }
            }
        }
        Ok(())
    }
}
