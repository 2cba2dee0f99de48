//! Command parsing and the per-command state transitions.
//!
//! Handlers only look at the [`Session`]; whatever they change is described
//! by the returned [`Effect`].
use super::{Effect, ProcedureState, Reply, Session};
use crate::calibration::CALIB_SLOTS;
use crate::response::{Response, Token};

type Handler = fn(&Session, &str) -> Reply;

/// Matched by prefix, first match wins.
const HANDLERS: &[(&str, Handler)] = &[
    ("nop", nop),
    ("meas_start", meas_start),
    ("meas_stop", meas_stop),
    ("meas_get_val", meas_get_val),
    ("conf_select:", conf_select),
    ("conf_get_selected", conf_get_selected),
    ("conf_set_gain_error:", conf_set_gain_error),
    ("conf_get_gain_error:", conf_get_gain_error),
    ("conf_set_zero_error:", conf_set_zero_error),
    ("conf_get_zero_error:", conf_get_zero_error),
    ("conf_set_wavelength:", conf_set_wavelength),
    ("conf_get_wavelength:", conf_get_wavelength),
    ("conf_commit", conf_commit),
    ("int_ref_calib", int_ref_calib),
    ("int_ref_get", int_ref_get),
    ("int_ref_commit", int_ref_commit),
    ("int_ref_check_enable", int_ref_check_enable),
    ("int_ref_check_disable", int_ref_check_disable),
    ("int_ref_check_get", int_ref_check_get),
];

/// Value that clears a setting.
const NONE: &str = "NONE";

pub(crate) fn dispatch(session: &Session, message: &str) -> Reply {
    HANDLERS
        .iter()
        .find_map(|(prefix, handler)| {
            message
                .strip_prefix(prefix)
                .map(|args| handler(session, args))
        })
        .unwrap_or_else(|| Reply::error(session.state))
}

fn nop(session: &Session, _: &str) -> Reply {
    match session.state {
        ProcedureState::Measurement => {
            Reply::new(ProcedureState::Measurement, Response::Silent, Effect::None)
        }
        ProcedureState::Default | ProcedureState::AwaitNop => {
            Reply::new(ProcedureState::Default, Token::Ok, Effect::None)
        }
    }
}

fn meas_start(session: &Session, _: &str) -> Reply {
    if session.state != ProcedureState::Default {
        return Reply::error(session.state);
    }
    let next = ProcedureState::Measurement;
    match session.selected_record() {
        None => Reply::new(next, Token::NoConfSelected, Effect::FailMeasurement),
        Some(record) if !record.is_complete() => {
            Reply::new(next, Token::NotAvailable, Effect::FailMeasurement)
        }
        // the first sample replaces this
        Some(_) => Reply::new(next, Token::Error, Effect::StartMeasurement),
    }
}

fn meas_stop(session: &Session, _: &str) -> Reply {
    if session.state != ProcedureState::Measurement {
        return Reply::error(session.state);
    }
    let token = if session.measurement_error {
        Token::ErrorsCleared
    } else {
        Token::Ok
    };
    Reply::new(ProcedureState::Default, token, Effect::StopMeasurement)
}

fn meas_get_val(session: &Session, _: &str) -> Reply {
    if session.state != ProcedureState::Measurement || session.measurement_error {
        return Reply::error(session.state);
    }
    Reply::new(session.state, Token::Error, Effect::SampleMeasurement)
}

/// Configuration commands run only in [`ProcedureState::Default`] and leave
/// their reply waiting for a `nop`.
fn configure(session: &Session, command: impl FnOnce() -> (Response, Effect)) -> Reply {
    if session.state != ProcedureState::Default {
        return Reply::error(session.state);
    }
    let (response, effect) = command();
    Reply::new(ProcedureState::AwaitNop, response, effect)
}

/// Configure with the outcome of a parse.
fn configure_parsed(session: &Session, parsed: Result<Effect, Token>) -> Reply {
    configure(session, || match parsed {
        Ok(effect) => (Token::Ok.into(), effect),
        Err(token) => (token.into(), Effect::None),
    })
}

fn parse_int(text: &str) -> Result<i64, Token> {
    text.parse::<i64>().map_err(|_| Token::Error)
}

fn parse_slot(text: &str) -> Result<usize, Token> {
    usize::try_from(parse_int(text)?)
        .ok()
        .filter(|slot| *slot < CALIB_SLOTS)
        .ok_or(Token::OutOfRange)
}

/// Split `<slot>:<value>`.
fn parse_slot_value(args: &str) -> Result<(usize, &str), Token> {
    let (slot, value) = args.split_once(':').ok_or(Token::Error)?;
    Ok((parse_slot(slot)?, value))
}

/// An integer setting, or `None` for `NONE`.
fn parse_setting<V: TryFrom<i64>>(text: &str) -> Result<Option<V>, Token> {
    if text == NONE {
        return Ok(None);
    }
    V::try_from(parse_int(text)?)
        .map(Some)
        .map_err(|_| Token::OutOfRange)
}

fn parse_gain(text: &str) -> Result<Option<f32>, Token> {
    if text == NONE {
        return Ok(None);
    }
    match text.parse::<f32>() {
        Ok(gain) if gain.is_finite() => Ok(Some(gain)),
        _ => Err(Token::Error),
    }
}

fn conf_select(session: &Session, args: &str) -> Reply {
    let parsed = if args == NONE {
        Ok(Effect::Select(None))
    } else {
        parse_slot(args).map(|slot| Effect::Select(Some(slot as u8)))
    };
    configure_parsed(session, parsed)
}

fn conf_get_selected(session: &Session, _: &str) -> Reply {
    configure(session, || {
        let response = match session.selected {
            Some(slot) => Response::format(format_args!("{}", slot)),
            None => Token::NotAvailable.into(),
        };
        (response, Effect::None)
    })
}

fn conf_set_gain_error(session: &Session, args: &str) -> Reply {
    let parsed = parse_slot_value(args)
        .and_then(|(slot, value)| Ok(Effect::SetGainError(slot, parse_gain(value)?)));
    configure_parsed(session, parsed)
}

fn conf_set_zero_error(session: &Session, args: &str) -> Reply {
    let parsed = parse_slot_value(args)
        .and_then(|(slot, value)| Ok(Effect::SetZeroError(slot, parse_setting(value)?)));
    configure_parsed(session, parsed)
}

fn conf_set_wavelength(session: &Session, args: &str) -> Reply {
    let parsed = parse_slot_value(args)
        .and_then(|(slot, value)| Ok(Effect::SetWavelength(slot, parse_setting(value)?)));
    configure_parsed(session, parsed)
}

/// Reply with a field of the record in slot `args`.
fn get_field<F>(session: &Session, args: &str, field: F) -> Reply
where
    F: FnOnce(&crate::calibration::CalibrationRecord) -> Option<Response>,
{
    configure(session, || {
        let response = match parse_slot(args) {
            Ok(slot) => {
                field(&session.calibration[slot]).unwrap_or(Token::NotAvailable.into())
            }
            Err(token) => token.into(),
        };
        (response, Effect::None)
    })
}

fn conf_get_gain_error(session: &Session, args: &str) -> Reply {
    get_field(session, args, |record| {
        record
            .gain_error()
            .map(|gain| Response::format(format_args!("{:.6}", gain)))
    })
}

fn conf_get_zero_error(session: &Session, args: &str) -> Reply {
    get_field(session, args, |record| {
        record
            .zero_error()
            .map(|zero| Response::format(format_args!("{}", zero)))
    })
}

fn conf_get_wavelength(session: &Session, args: &str) -> Reply {
    get_field(session, args, |record| {
        record
            .wavelength()
            .map(|wavelength| Response::format(format_args!("{}", wavelength)))
    })
}

fn conf_commit(session: &Session, _: &str) -> Reply {
    configure(session, || (Token::Ok.into(), Effect::CommitCalibration))
}

fn int_ref_calib(session: &Session, _: &str) -> Reply {
    configure(session, || (Token::Ok.into(), Effect::CalibrateIntRef))
}

fn int_ref_get(session: &Session, _: &str) -> Reply {
    configure(session, || {
        let response = match session.int_ref.value {
            Some(value) => Response::format(format_args!("{}", value)),
            None => Token::NotAvailable.into(),
        };
        (response, Effect::None)
    })
}

fn int_ref_commit(session: &Session, _: &str) -> Reply {
    configure(session, || (Token::Ok.into(), Effect::CommitIntRef))
}

fn int_ref_check_enable(session: &Session, _: &str) -> Reply {
    configure(session, || (Token::Ok.into(), Effect::SetSagCheck(true)))
}

fn int_ref_check_disable(session: &Session, _: &str) -> Reply {
    configure(session, || (Token::Ok.into(), Effect::SetSagCheck(false)))
}

fn int_ref_check_get(session: &Session, _: &str) -> Reply {
    configure(session, || {
        (Token::from(session.check_enabled).into(), Effect::None)
    })
}
