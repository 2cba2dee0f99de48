//! The command processor.
//!
//! Commands arrive as radio payloads from the base station. Their replies are
//! queued as ACK payloads and so only reach the base station with the ACK of
//! its *next* packet. After any configuration command the processor waits in
//! [`ProcedureState::AwaitNop`] until a `nop` collects the reply.
//!
//! | command | allowed in | reply |
//! |---|---|---|
//! | `nop` | any | `OK`; nothing while measuring |
//! | `meas_start` | Default | first value, `NO_CONF_SELECTED`, `NA`, `CHECK_FAILED` |
//! | `meas_get_val` | Measurement | value, `ERROR` after a failure, `CHECK_FAILED` |
//! | `meas_stop` | Measurement | `OK` or `ERRORS_CLEARED` |
//! | `conf_select:<slot>` | Default | `OK` |
//! | `conf_get_selected` | Default | slot or `NA` |
//! | `conf_set_gain_error:<slot>:<value>` | Default | `OK` |
//! | `conf_get_gain_error:<slot>` | Default | value or `NA` |
//! | `conf_set_zero_error:<slot>:<value>` | Default | `OK` |
//! | `conf_get_zero_error:<slot>` | Default | value or `NA` |
//! | `conf_set_wavelength:<slot>:<value>` | Default | `OK` |
//! | `conf_get_wavelength:<slot>` | Default | value or `NA` |
//! | `conf_commit` | Default | `OK` |
//! | `int_ref_calib` | Default | `OK` |
//! | `int_ref_get` | Default | value or `NA` |
//! | `int_ref_commit` | Default | `OK` |
//! | `int_ref_check_enable`, `int_ref_check_disable` | Default | `OK` |
//! | `int_ref_check_get` | Default | `TRUE` or `FALSE` |
//!
//! A value of `NONE` clears a setting. A bad slot or value replies
//! `OUT_OF_RANGE` or `ERROR`, and so does a command sent in the wrong state.
mod commands;
mod measurement;

use nrf24_ctrl::radio::prelude::EsbAutoAck;

use crate::adc::AdcSampler;
use crate::calibration::{CalibrationRecord, InternalVoltageReference, CALIB_SLOTS};
use crate::response::{Response, Token};
use crate::store::{self, PersistentStore};

/// Where the processor is in the command conversation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProcedureState {
    #[default]
    Default,
    /// The ADC is sampling the photodiode.
    Measurement,
    /// A configuration reply is queued and waits for a `nop`.
    AwaitNop,
}

/// Settings of the [`Procedures`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProceduresConfig {
    ack_pipe: u8,
    measurement_channel: u8,
    check_period: u16,
}

impl Default for ProceduresConfig {
    /// ACK payloads on pipe 1, photodiode on ADC channel 3, a supply check
    /// every 10th sample.
    fn default() -> Self {
        Self {
            ack_pipe: 1,
            measurement_channel: 3,
            check_period: 10,
        }
    }
}

impl ProceduresConfig {
    pub const fn ack_pipe(&self) -> u8 {
        self.ack_pipe
    }

    /// The pipe replies are queued on. Clamped to 5.
    pub fn with_ack_pipe(self, pipe: u8) -> Self {
        Self {
            ack_pipe: pipe.min(5),
            ..self
        }
    }

    pub const fn measurement_channel(&self) -> u8 {
        self.measurement_channel
    }

    pub fn with_measurement_channel(self, channel: u8) -> Self {
        Self {
            measurement_channel: channel,
            ..self
        }
    }

    pub const fn check_period(&self) -> u16 {
        self.check_period
    }

    /// Run the supply check on every `period`th sample. At least 1.
    pub fn with_check_period(self, period: u16) -> Self {
        Self {
            check_period: period.max(1),
            ..self
        }
    }
}

/// Everything the commands read or change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub(crate) state: ProcedureState,
    pub(crate) calibration: [CalibrationRecord; CALIB_SLOTS],
    pub(crate) int_ref: InternalVoltageReference,
    pub(crate) selected: Option<u8>,
    pub(crate) measurement_error: bool,
    pub(crate) check_enabled: bool,
}

impl Session {
    pub const fn state(&self) -> ProcedureState {
        self.state
    }

    /// The calibration records, including uncommitted changes.
    pub const fn calibration(&self) -> &[CalibrationRecord; CALIB_SLOTS] {
        &self.calibration
    }

    pub const fn int_ref(&self) -> InternalVoltageReference {
        self.int_ref
    }

    pub const fn selected(&self) -> Option<u8> {
        self.selected
    }

    /// Set when a measurement failed; cleared by `meas_stop`.
    pub const fn measurement_error(&self) -> bool {
        self.measurement_error
    }

    pub const fn check_enabled(&self) -> bool {
        self.check_enabled
    }

    fn selected_record(&self) -> Option<&CalibrationRecord> {
        self.selected
            .and_then(|slot| self.calibration.get(slot as usize))
    }
}

/// What a command changes outside of the state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Effect {
    None,
    Select(Option<u8>),
    SetWavelength(usize, Option<u16>),
    SetGainError(usize, Option<f32>),
    SetZeroError(usize, Option<i16>),
    CommitCalibration,
    StartMeasurement,
    FailMeasurement,
    SampleMeasurement,
    StopMeasurement,
    CalibrateIntRef,
    CommitIntRef,
    SetSagCheck(bool),
}

/// The outcome of a command handler.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Reply {
    pub next: ProcedureState,
    pub response: Response,
    pub effect: Effect,
}

impl Reply {
    fn new(next: ProcedureState, response: impl Into<Response>, effect: Effect) -> Self {
        Self {
            next,
            response: response.into(),
            effect,
        }
    }

    /// Reply `ERROR` and stay in `state`.
    fn error(state: ProcedureState) -> Self {
        Self::new(state, Token::Error, Effect::None)
    }
}

/// Executes commands against an ADC and a persistent store.
pub struct Procedures<A, S> {
    session: Session,
    adc: A,
    store: S,
    config: ProceduresConfig,
    samples: u16,
}

impl<A: AdcSampler, S: PersistentStore> Procedures<A, S> {
    /// Load the calibration data from `store`.
    pub fn new(adc: A, mut store: S, config: ProceduresConfig) -> Result<Self, S::Error> {
        let session = Session {
            calibration: store::load_calibration(&mut store)?,
            int_ref: store::load_int_ref(&mut store)?,
            ..Session::default()
        };
        Ok(Self {
            session,
            adc,
            store,
            config,
            samples: 0,
        })
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn state(&self) -> ProcedureState {
        self.session.state
    }

    pub const fn config(&self) -> &ProceduresConfig {
        &self.config
    }

    pub fn adc(&self) -> &A {
        &self.adc
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the ADC and the store.
    pub fn free(self) -> (A, S) {
        (self.adc, self.store)
    }

    /// Queue the `OK` the base station collects with its first packet.
    pub fn prime<R: EsbAutoAck>(&self, radio: &mut R) -> Result<bool, R::AutoAckErrorType> {
        radio.write_ack_payload(self.config.ack_pipe, Token::Ok.as_str().as_bytes())
    }

    /// Run one command and return its reply without queueing it.
    pub fn process(&mut self, message: &str) -> Response {
        debug!("command {} in {}", message, self.session.state);
        let reply = commands::dispatch(&self.session, message);
        let response = self.apply(reply.effect).unwrap_or(reply.response);
        self.session.state = reply.next;
        response
    }

    /// Run the command in `payload` and queue its reply as the next ACK payload.
    ///
    /// Trailing NUL bytes and line endings are ignored.
    pub fn handle_incoming_message<R: EsbAutoAck>(
        &mut self,
        radio: &mut R,
        payload: &[u8],
    ) -> Result<Response, R::AutoAckErrorType> {
        let response = match core::str::from_utf8(payload) {
            Ok(text) => self.process(
                text.trim_end_matches(|c: char| c == '\0' || c.is_ascii_whitespace()),
            ),
            Err(_) => Response::from(Token::Error),
        };
        if let Some(bytes) = response.payload() {
            if !radio.write_ack_payload(self.config.ack_pipe, bytes)? {
                warn!("reply was not queued; ACK payloads are disabled");
            }
        }
        Ok(response)
    }

    /// Carry out `effect`. A returned response replaces the handler's one.
    fn apply(&mut self, effect: Effect) -> Option<Response> {
        let session = &mut self.session;
        match effect {
            Effect::None => None,
            Effect::Select(slot) => {
                session.selected = slot;
                None
            }
            Effect::SetWavelength(slot, value) => {
                session.calibration[slot].set_wavelength(value);
                None
            }
            Effect::SetGainError(slot, value) => {
                session.calibration[slot].set_gain_error(value);
                None
            }
            Effect::SetZeroError(slot, value) => {
                session.calibration[slot].set_zero_error(value);
                None
            }
            Effect::CommitCalibration => {
                match store::save_calibration(&mut self.store, &session.calibration) {
                    Ok(written) => {
                        debug!("{} calibration slots written", written);
                        None
                    }
                    Err(_) => {
                        warn!("failed to write calibration");
                        Some(Token::Error.into())
                    }
                }
            }
            Effect::CommitIntRef => match store::save_int_ref(&mut self.store, &session.int_ref) {
                Ok(()) => None,
                Err(_) => {
                    warn!("failed to write internal reference");
                    Some(Token::Error.into())
                }
            },
            Effect::SetSagCheck(enable) => {
                session.check_enabled = enable;
                None
            }
            Effect::FailMeasurement => {
                session.measurement_error = true;
                None
            }
            Effect::StartMeasurement => Some(self.start_measurement()),
            Effect::SampleMeasurement => Some(self.sample_measurement()),
            Effect::StopMeasurement => {
                self.stop_measurement();
                None
            }
            Effect::CalibrateIntRef => self.calibrate_int_ref(),
        }
    }
}

impl core::fmt::Display for ProcedureState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}
