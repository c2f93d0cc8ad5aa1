//! The `"<N> <hour|day>(s)"` refresh interval edited on Configure indexing.

use anyhow::{bail, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagUnit {
    Hour,
    Day,
}

impl LagUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            LagUnit::Hour => "hour",
            LagUnit::Day => "day",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLag {
    pub value: u32,
    pub unit: LagUnit,
}

impl TargetLag {
    /// Read a stored lag the way the editor does: the leading integer is the
    /// value (1 when missing or zero), and the unit is hours whenever the text
    /// mentions "hour", days otherwise.
    pub fn parse_lenient(s: &str) -> TargetLag {
        let digits: String = s
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let value = match digits.parse::<u32>() {
            Ok(0) | Err(_) => 1,
            Ok(n) => n,
        };
        let unit = if s.contains("hour") {
            LagUnit::Hour
        } else {
            LagUnit::Day
        };
        TargetLag { value, unit }
    }

    /// Parse a lag that must be well formed, e.g. from a config file.
    pub fn parse(s: &str) -> Result<TargetLag> {
        let mut parts = s.split_whitespace();
        let (Some(n), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
            bail!("target lag must look like '<N> hours' or '<N> days', got '{}'", s);
        };
        let value: u32 = match n.parse() {
            Ok(v) if v > 0 => v,
            _ => bail!("target lag value must be a positive integer, got '{}'", n),
        };
        let unit = match unit {
            "hour" | "hours" => LagUnit::Hour,
            "day" | "days" => LagUnit::Day,
            other => bail!("target lag unit must be hour(s) or day(s), got '{}'", other),
        };
        Ok(TargetLag { value, unit })
    }

    /// Replace the number, keeping the unit. Input that is not a positive
    /// integer becomes 1.
    pub fn with_value_input(self, input: &str) -> TargetLag {
        let value = match input.trim().parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => 1,
        };
        TargetLag { value, ..self }
    }

    /// Replace the unit, keeping the number.
    pub fn with_unit(self, unit: LagUnit) -> TargetLag {
        TargetLag { unit, ..self }
    }
}

impl fmt::Display for TargetLag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.value != 1 { "s" } else { "" };
        write!(f, "{} {}{}", self.value, self.unit.as_str(), plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let lag = TargetLag {
            value: 1,
            unit: LagUnit::Hour,
        };
        assert_eq!(lag.to_string(), "1 hour");
        assert_eq!(lag.with_value_input("3").to_string(), "3 hours");
        assert_eq!(lag.with_unit(LagUnit::Day).to_string(), "1 day");
    }

    #[test]
    fn test_lenient_parse() {
        assert_eq!(
            TargetLag::parse_lenient("2 days"),
            TargetLag {
                value: 2,
                unit: LagUnit::Day
            }
        );
        assert_eq!(TargetLag::parse_lenient("12 hours").value, 12);
        assert_eq!(TargetLag::parse_lenient("garbage").value, 1);
        assert_eq!(TargetLag::parse_lenient("0 hours").value, 1);
        assert_eq!(TargetLag::parse_lenient("garbage").unit, LagUnit::Day);
    }

    #[test]
    fn test_changing_value_keeps_unit() {
        let lag = TargetLag::parse_lenient("4 days").with_value_input("1");
        assert_eq!(lag.to_string(), "1 day");
    }

    #[test]
    fn test_invalid_value_falls_back_to_one() {
        let lag = TargetLag::parse_lenient("4 hours");
        assert_eq!(lag.with_value_input("").to_string(), "1 hour");
        assert_eq!(lag.with_value_input("-2").to_string(), "1 hour");
        assert_eq!(lag.with_value_input("x").to_string(), "1 hour");
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!(TargetLag::parse("1 hour").unwrap().to_string(), "1 hour");
        assert_eq!(TargetLag::parse("3 days").unwrap().to_string(), "3 days");
        assert!(TargetLag::parse("0 hours").is_err());
        assert!(TargetLag::parse("3 weeks").is_err());
        assert!(TargetLag::parse("hourly").is_err());
    }
}
