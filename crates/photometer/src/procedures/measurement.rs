//! ADC side of the measurement commands.
use super::Procedures;
use crate::adc::{AdcChannel, AdcSampler};
use crate::response::{Response, Token};
use crate::store::PersistentStore;

impl<A: AdcSampler, S: PersistentStore> Procedures<A, S> {
    fn photodiode(&self) -> AdcChannel {
        AdcChannel::External(self.config.measurement_channel)
    }

    pub(super) fn start_measurement(&mut self) -> Response {
        self.samples = 0;
        self.adc.enable(self.photodiode());
        if self.session.check_enabled {
            if let Some(failed) = self.check_supply() {
                return failed;
            }
        }
        self.measure()
    }

    pub(super) fn sample_measurement(&mut self) -> Response {
        self.samples = self.samples.saturating_add(1);
        if self.session.check_enabled && self.samples >= self.config.check_period {
            self.samples = 0;
            if let Some(failed) = self.check_supply() {
                return failed;
            }
        }
        self.measure()
    }

    pub(super) fn stop_measurement(&mut self) {
        self.adc.disable();
        self.session.measurement_error = false;
        self.samples = 0;
    }

    /// Store a reading of the internal reference as its calibrated value.
    pub(super) fn calibrate_int_ref(&mut self) -> Option<Response> {
        self.adc.enable(AdcChannel::InternalReference);
        let sample = self.adc.read();
        self.adc.disable();
        match sample {
            Ok(value) => {
                debug!("internal reference calibrated at {}", value);
                self.session.int_ref.value = Some(value);
                None
            }
            Err(_) => {
                warn!("ADC read of the internal reference failed");
                Some(Token::Error.into())
            }
        }
    }

    /// Compare the internal reference with its calibrated value.
    ///
    /// A sagged supply fails the measurement until it is stopped. Passes
    /// without a calibrated value.
    fn check_supply(&mut self) -> Option<Response> {
        self.adc.enable(AdcChannel::InternalReference);
        let sample = self.adc.read();
        self.adc.enable(self.photodiode());
        match sample {
            Ok(sample) if self.session.int_ref.is_sagged(sample) => {
                warn!("supply sagged; internal reference reads {}", sample);
                self.session.measurement_error = true;
                Some(Token::CheckFailed.into())
            }
            Ok(_) => None,
            Err(_) => {
                warn!("ADC read of the internal reference failed");
                Some(Token::Error.into())
            }
        }
    }

    /// `gain_error * (zero_error + raw)` of the selected slot.
    fn measure(&mut self) -> Response {
        let Some((gain, zero)) = self
            .session
            .selected_record()
            .and_then(|record| Some((record.gain_error()?, record.zero_error()?)))
        else {
            return Token::Error.into();
        };
        let raw = match self.adc.read() {
            Ok(raw) => raw,
            Err(_) => {
                warn!("ADC read of the photodiode failed");
                return Token::Error.into();
            }
        };
        let reading = i32::from(zero) + i32::from(raw);
        let value = gain * reading as f32;
        if !value.is_finite() {
            warn!("measurement overflowed");
            return Token::Error.into();
        }
        Response::format(format_args!("{:.6}", value))
    }
}
