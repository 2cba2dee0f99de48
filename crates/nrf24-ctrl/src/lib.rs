#![doc = include_str!("../README.md")]
//!
//! ## Basic API
//!
//! - [`NrfController::new()`](fn@crate::radio::NrfController::new)
//! - [`NrfController::begin()`](radio/struct.NrfController.html#method.begin)
//! - [`NrfController::open_writing_pipe()`](radio/struct.NrfController.html#method.open_writing_pipe)
//! - [`NrfController::open_reading_pipe()`](radio/struct.NrfController.html#method.open_reading_pipe)
//! - [`NrfController::close_reading_pipe()`](radio/struct.NrfController.html#method.close_reading_pipe)
//! - [`NrfController::start_listening()`](radio/struct.NrfController.html#method.start_listening)
//! - [`NrfController::stop_listening()`](radio/struct.NrfController.html#method.stop_listening)
//! - [`NrfController::is_message_available()`](radio/struct.NrfController.html#method.is_message_available)
//! - [`NrfController::read_incoming()`](radio/struct.NrfController.html#method.read_incoming)
//! - [`NrfController::start_write()`](radio/struct.NrfController.html#method.start_write)
//! - [`NrfController::finish_write_sync()`](radio/struct.NrfController.html#method.finish_write_sync)
//!
//! ## Advanced API
//!
//! - [`NrfController::set_dynamic_payload()`](radio/struct.NrfController.html#method.set_dynamic_payload)
//! - [`NrfController::get_dynamic_payload_size()`](radio/struct.NrfController.html#method.get_dynamic_payload_size)
//! - [`NrfController::set_ack_payloads()`](radio/struct.NrfController.html#method.set_ack_payloads)
//! - [`NrfController::write_ack_payload()`](radio/struct.NrfController.html#method.write_ack_payload)
//! - [`NrfController::set_status_flags()`](radio/struct.NrfController.html#method.set_status_flags)
//! - [`NrfController::flush_rx()`](radio/struct.NrfController.html#method.flush_rx)
//! - [`NrfController::flush_tx()`](radio/struct.NrfController.html#method.flush_tx)
//!
//! ## Raw register access
//!
//! - [`NrfController::read_byte_register()`](fn@crate::radio::NrfController::read_byte_register)
//! - [`NrfController::write_byte_register()`](fn@crate::radio::NrfController::write_byte_register)
//! - [`NrfController::read_register()`](fn@crate::radio::NrfController::read_register)
//! - [`NrfController::write_register()`](fn@crate::radio::NrfController::write_register)
//! - [`NrfController::exec_command()`](fn@crate::radio::NrfController::exec_command)
//! - [`NrfController::exec_command_with_response()`](fn@crate::radio::NrfController::exec_command_with_response)
#![no_std]

#[macro_use]
mod logging;

mod types;
pub use types::{CrcLength, DataRate, PaLevel, StatusFlags};
pub mod radio;
mod transport;
pub use transport::{BusTransport, HalTransport, Nrf24Error};

#[cfg(any(test, feature = "sim"))]
pub mod sim;
