#![cfg_attr(not(test), no_std)]
//! Register access primitives shared by the ST MEMS sensor drivers.
//!
//! Every configuration register on these parts is one byte wide and is
//! updated with a read-modify-write cycle so that bits this crate does not
//! manage (self-test, reserved) survive untouched. Multi-byte output
//! registers are read with a single combined write-then-read transaction that
//! relies on the part auto-incrementing its address pointer.

mod error;
mod interface;
mod register;
mod sample;
mod timeout;

pub use error::Error;
pub use interface::RegisterInterface;
pub use register::{field, with_field, Register};
pub use sample::{Axis, RawSample, Vector3};
pub use timeout::{TimedOut, Timeout};

#[cfg(feature = "mock")]
pub mod mock;
