#![cfg_attr(not(test), no_std)]
//! Flight-controller core for an LSM6DSOX + LIS3MDL sensor pair.
//!
//! The acquisition task reads the sensors, estimates pitch and roll from the
//! gravity vector and publishes the result into a [`SharedState`]. A
//! consumer task on its own period integrates planar velocity and position
//! from the same record and forwards snapshots through a `Watch`.
//!
//! Nothing here owns an executor or builds a bus. The board crate creates the
//! I2C devices, calls [`Sensors::bring_up`], and spawns thin task wrappers
//! around [`acquisition_task`] and [`consumer_task`].

#[macro_use]
mod fmt;

pub mod config;
mod error;
pub mod orientation;
mod sensors;
pub mod state;
mod tasks;

pub use config::{AcquisitionConfig, RetryPolicy, TaskConfig, REFERENCE_TICK_HZ};
pub use error::Error;
pub use orientation::{estimate, Attitude, AttitudeEstimator};
pub use sensors::Sensors;
pub use state::{FlightState, Planar, Sample, SharedState};
pub use tasks::{acquisition_task, consumer_task, Acquisition, Consumer, Shutdown};
