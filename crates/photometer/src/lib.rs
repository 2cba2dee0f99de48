#![doc = include_str!("../README.md")]
//!
//! The pieces, bottom up:
//!
//! - [`response`]: reply tokens and formatted replies
//! - [`calibration`], [`store`]: calibration records and their storage
//! - [`adc`]: the sampler the photodiode is read with
//! - [`procedures`]: the command processor
//! - [`latch`]: interrupt flags and the idle timeout
//! - [`node`], [`station`]: the two applications
#![no_std]

#[macro_use]
mod logging;

pub mod adc;
pub mod calibration;
pub mod latch;
pub mod node;
pub mod procedures;
pub mod response;
pub mod station;
pub mod store;

pub use adc::{AdcChannel, AdcSampler};
pub use procedures::{ProcedureState, Procedures, ProceduresConfig};
pub use response::{Response, Token};
pub use store::{MemoryStore, PersistentStore};
