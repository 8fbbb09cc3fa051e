//! Direction and parameter types.

use crate::MacError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which way a frame travels. Not encoded in the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Device to network server.
    Uplink,
    /// Network server to device.
    #[default]
    Downlink,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Uplink => write!(f, "uplink"),
            Direction::Downlink => write!(f, "downlink"),
        }
    }
}

impl FromStr for Direction {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "uplink" => Ok(Direction::Uplink),
            "down" | "downlink" => Ok(Direction::Downlink),
            other => Err(MacError::malformed(format!("unknown direction '{}'", other))),
        }
    }
}

/// Named integer parameters for building a command.
///
/// Flags read as false when absent; numbers are required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacParams {
    values: BTreeMap<String, i64>,
}

impl MacParams {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, returning self for chaining.
    pub fn with(mut self, name: impl Into<String>, value: i64) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: i64) {
        self.values.insert(name.into(), value);
    }

    /// Raw value, if present.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    /// Required number checked against an inclusive range.
    pub fn number(&self, name: &str, min: i64, max: i64) -> Result<i64, MacError> {
        let value = self
            .get(name)
            .ok_or_else(|| MacError::MissingParameter(name.to_string()))?;
        check_range(name, value, min, max)?;
        Ok(value)
    }

    /// Optional flag; any non-zero value is true.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| v != 0)
    }

    /// Parameter names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for MacParams {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let mut params = MacParams::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

pub(crate) fn check_range(name: &str, value: i64, min: i64, max: i64) -> Result<(), MacError> {
    if value < min || value > max {
        return Err(MacError::ParameterOutOfRange {
            name: name.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Uplink);
        assert_eq!("Downlink".parse::<Direction>().unwrap(), Direction::Downlink);
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(Direction::default(), Direction::Downlink);
    }

    #[test]
    fn test_params() {
        let params: MacParams = [("data_rate", 5), ("ack", 1)].into_iter().collect();
        assert_eq!(params.number("data_rate", 0, 15).unwrap(), 5);
        assert!(params.flag("ack"));
        assert!(!params.flag("other"));
        assert_eq!(
            params.number("tx_power", 0, 15),
            Err(MacError::MissingParameter("tx_power".to_string()))
        );
        assert!(matches!(
            params.number("data_rate", 0, 3),
            Err(MacError::ParameterOutOfRange { value: 5, max: 3, .. })
        ));
    }
}
