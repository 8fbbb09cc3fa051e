//! Conversion of command-line text into codec values.

use crate::error::{CliError, Result};
use chrono::{DateTime, NaiveDateTime};
use downlink_codec::{Axes, CommandSchema, FieldKind, FieldValue, Family, FunctionType, PartKind, Schedule, Target};
use lorawan_mac::MacParams;
use std::collections::BTreeMap;

const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Raw value arguments of `downlink encode`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueArgs {
    /// `--value`.
    pub value: Option<String>,
    /// `--part id=V`, in order.
    pub parts: Vec<(String, String)>,
    /// `--schedule`.
    pub schedule: Option<String>,
}

/// Raw addressing arguments of `downlink encode`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetArgs {
    /// `--channel`.
    pub channel: Option<u8>,
    /// `--port`.
    pub port: Option<u8>,
    /// `--rs485-channel`.
    pub rs485_channel: Option<u8>,
    /// `--axes`.
    pub axes: Option<String>,
}

/// Split `name=value`.
pub fn parse_key_value(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| CliError::invalid(format!("expected name=value, got '{}'", s)))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::invalid(format!("missing name in '{}'", s)));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Decimal (optionally negative) or `0x` hex integer.
pub fn parse_int(s: &str) -> Result<i64> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let parsed = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    };
    let value = parsed.map_err(|_| CliError::invalid(format!("'{}' is not an integer", s)))?;
    Ok(if negative { -value } else { value })
}

fn parse_u32(s: &str, what: &str) -> Result<u32> {
    let value = parse_int(s)?;
    u32::try_from(value).map_err(|_| CliError::invalid(format!("{} {} does not fit 0..={}", what, value, u32::MAX)))
}

fn parse_u8(s: &str, what: &str) -> Result<u8> {
    let value = parse_int(s)?;
    u8::try_from(value).map_err(|_| CliError::invalid(format!("{} {} does not fit 0..=255", what, value)))
}

/// Epoch seconds, `YYYY-MM-DD HH:MM:SS` (UTC) or RFC 3339.
pub fn parse_timestamp(s: &str) -> Result<u32> {
    let s = s.trim();
    let secs = if let Ok(secs) = parse_int(s) {
        secs
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        naive.and_utc().timestamp()
    } else if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        dt.timestamp()
    } else {
        return Err(CliError::invalid(format!("'{}' is not a timestamp", s)));
    };
    u32::try_from(secs).map_err(|_| CliError::invalid(format!("timestamp '{}' is outside the 32-bit epoch range", s)))
}

/// Axis letters, e.g. `xz`.
pub fn parse_axes(s: &str) -> Result<Axes> {
    let mut axes = Axes::default();
    for c in s.trim().chars() {
        match c.to_ascii_lowercase() {
            'x' => axes.x = true,
            'y' => axes.y = true,
            'z' => axes.z = true,
            ',' | ' ' => {}
            other => return Err(CliError::invalid(format!("unknown axis '{}'", other))),
        }
    }
    Ok(axes)
}

fn parse_time_of_day(s: &str) -> Result<(u8, u8)> {
    let bad = || CliError::invalid(format!("'{}' is not HH:MM", s));
    let (h, m) = s.split_once(':').ok_or_else(bad)?;
    let hour: u8 = h.trim().parse().map_err(|_| bad())?;
    let minute: u8 = m.trim().parse().map_err(|_| bad())?;
    if hour > 23 || minute > 59 {
        return Err(bad());
    }
    Ok((hour, minute))
}

/// Weekdays as a bit mask or `+`-joined names, e.g. `mon+tue+fri`.
fn parse_weekdays(s: &str) -> Result<u8> {
    if let Ok(mask) = parse_int(s) {
        return u8::try_from(mask)
            .ok()
            .filter(|m| *m < 0x80)
            .ok_or_else(|| CliError::invalid(format!("weekday mask {} does not fit 7 bits", mask)));
    }
    let mut mask = 0u8;
    for name in s.split('+') {
        let name = name.trim().to_ascii_lowercase();
        let prefix = name.get(..3).unwrap_or(&name);
        let bit = WEEKDAY_NAMES
            .iter()
            .position(|day| *day == prefix)
            .ok_or_else(|| CliError::invalid(format!("unknown weekday '{}'", name)))?;
        mask |= 1 << bit;
    }
    Ok(mask)
}

/// `mode=..,days=..,start=HH:MM,end=HH:MM,interval=..`.
pub fn parse_schedule(s: &str) -> Result<Schedule> {
    let mut schedule = Schedule::default();
    for item in s.split(',').filter(|item| !item.trim().is_empty()) {
        let (key, value) = parse_key_value(item)?;
        match key.as_str() {
            "mode" => {
                schedule.mode = match value.to_ascii_lowercase().as_str() {
                    "basic" => 0,
                    "advanced" => 1,
                    _ => parse_u8(&value, "mode")?,
                }
            }
            "days" => schedule.weekdays = parse_weekdays(&value)?,
            "start" => {
                (schedule.start_hour, schedule.start_minute) = parse_time_of_day(&value)?;
            }
            "end" => {
                (schedule.end_hour, schedule.end_minute) = parse_time_of_day(&value)?;
            }
            "interval" => schedule.interval_secs = parse_u32(&value, "interval")?,
            other => return Err(CliError::invalid(format!("unknown schedule key '{}'", other))),
        }
    }
    Ok(schedule)
}

fn required<'a>(args: &'a ValueArgs, schema: &CommandSchema) -> Result<&'a str> {
    args.value
        .as_deref()
        .ok_or_else(|| CliError::invalid(format!("'{}' needs --value", schema.name)))
}

fn check_max(schema: &CommandSchema, value: f64) -> Result<()> {
    match schema.max {
        Some(max) if value > max => Err(CliError::invalid(format!(
            "{} for '{}' exceeds the maximum {}",
            value, schema.name, max
        ))),
        _ => Ok(()),
    }
}

/// Build the typed value a schema expects.
pub fn build_value(schema: &CommandSchema, args: &ValueArgs) -> Result<FieldValue> {
    let value = match &schema.kind {
        FieldKind::Fixed { .. } | FieldKind::FixedHex { .. } => FieldValue::None,
        FieldKind::Select { options } => {
            let text = required(args, schema)?;
            match options.iter().find(|o| o.label.eq_ignore_ascii_case(text)) {
                Some(option) => FieldValue::Code(option.code),
                None => FieldValue::Code(parse_u8(text, "code")?),
            }
        }
        FieldKind::Scaled { .. } => {
            let text = required(args, schema)?;
            let v: f64 = text
                .parse()
                .map_err(|_| CliError::invalid(format!("'{}' is not a number", text)))?;
            check_max(schema, v)?;
            FieldValue::Scaled(v)
        }
        FieldKind::Number { .. } => {
            let v = parse_int(required(args, schema)?)?;
            check_max(schema, v as f64)?;
            FieldValue::Number(v)
        }
        FieldKind::Bitmask { options, .. } => {
            let text = required(args, schema)?;
            let mask = match parse_int(text) {
                Ok(v) => u16::try_from(v).map_err(|_| CliError::invalid(format!("bitmask {} does not fit 16 bits", v)))?,
                Err(_) => {
                    let mut mask = 0u16;
                    for label in text.split(',') {
                        let option = options
                            .iter()
                            .find(|o| o.label.eq_ignore_ascii_case(label.trim()))
                            .ok_or_else(|| CliError::invalid(format!("unknown option '{}'", label.trim())))?;
                        mask |= 1 << option.bit;
                    }
                    mask
                }
            };
            FieldValue::Bitmask(mask)
        }
        FieldKind::Composite { parts } => {
            let mut record = BTreeMap::new();
            for (id, text) in &args.parts {
                let part = parts
                    .iter()
                    .find(|p| p.id == id.as_str())
                    .ok_or_else(|| CliError::invalid(format!("'{}' has no part '{}'", schema.name, id)))?;
                let v = match part.kind {
                    PartKind::Number => parse_u32(text, part.id)?,
                    PartKind::Timestamp => parse_timestamp(text)?,
                };
                record.insert(part.id.to_string(), v);
            }
            FieldValue::Record(record)
        }
        FieldKind::Schedule => {
            let text = args
                .schedule
                .as_deref()
                .or(args.value.as_deref())
                .ok_or_else(|| CliError::invalid(format!("'{}' needs --schedule", schema.name)))?;
            FieldValue::Schedule(parse_schedule(text)?)
        }
        FieldKind::Ascii { .. } => FieldValue::Text(required(args, schema)?.to_string()),
        FieldKind::Timestamp => FieldValue::Timestamp(parse_timestamp(required(args, schema)?)?),
    };
    Ok(value)
}

/// Build the target for a function type. Range checks are left to the codec.
pub fn build_target(function_type: FunctionType, args: &TargetArgs) -> Result<Target> {
    let target = match function_type.family() {
        Family::Io => match args.channel {
            Some(channel) => Target::Channel { channel },
            None => Target::None,
        },
        Family::Sensor => match (function_type, args.axes.as_deref()) {
            (FunctionType::SensorAccelerometer, Some(axes)) => Target::Axes(parse_axes(axes)?),
            (FunctionType::SensorAccelerometer, None) => Target::Axes(Axes::ALL),
            (_, Some(_)) => return Err(CliError::invalid(format!("--axes does not apply to {}", function_type.name()))),
            _ => Target::SensorMask { mask: 0 },
        },
        Family::DeviceConfig => Target::None,
        Family::Rs485 => Target::Rs485 {
            port: args.port.unwrap_or(0),
            channel: args.rs485_channel.or(args.channel).unwrap_or(0),
        },
    };
    Ok(target)
}

/// Build MAC parameters from `name=value` pairs; `true`/`false` are flags.
pub fn build_mac_params(pairs: &[(String, String)]) -> Result<MacParams> {
    let mut params = MacParams::new();
    for (name, text) in pairs {
        let value = match text.to_ascii_lowercase().as_str() {
            "true" | "yes" => 1,
            "false" | "no" => 0,
            _ => parse_int(text)?,
        };
        params.insert(name.clone(), value);
    }
    Ok(params)
}
