//! Typed getters for [`Cell`].
//!
//! Getters widen, narrow or parse when the stored representation differs from
//! the requested type. A null cell yields the type's zero value; rejecting
//! nulls is the caller's decision.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{Cell, Payload, ScalarType};
use crate::error::ConversionError;

// 2^63 and 2^64 as f64, the exclusive upper bounds for truncating casts.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

const TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl Cell {
    fn error(&self, to: &'static str, detail: impl Into<String>) -> ConversionError {
        ConversionError::new(self.kind(), to, detail)
    }

    pub fn to_bool(&self) -> Result<bool, ConversionError> {
        match &self.payload {
            Payload::Null => Ok(false),
            Payload::Bool(b) => Ok(*b),
            Payload::Int(i) => Ok(*i != 0),
            Payload::Float(f) => Ok(*f != 0.0),
            Payload::Text(s) => {
                parse_bool(s).ok_or_else(|| self.error("bool", format!("'{s}' is not a boolean")))
            }
            Payload::Time(_) => Err(self.error("bool", "timestamps have no boolean form")),
        }
    }

    pub fn to_i64(&self) -> Result<i64, ConversionError> {
        match &self.payload {
            Payload::Null => Ok(0),
            Payload::Bool(b) => Ok(i64::from(*b)),
            Payload::Int(i) => {
                if self.decl.is_unsigned() && *i < 0 {
                    Err(self.error("i64", format!("{} out of range", *i as u64)))
                } else {
                    Ok(*i)
                }
            }
            Payload::Float(f) => {
                if f.fract() != 0.0 {
                    Err(self.error("i64", format!("{f} has a fractional part")))
                } else if f.is_finite() && *f >= -I64_BOUND && *f < I64_BOUND {
                    Ok(*f as i64)
                } else {
                    Err(self.error("i64", format!("{f} out of range")))
                }
            }
            Payload::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| self.error("i64", format!("cannot parse '{s}': {e}"))),
            Payload::Time(t) => Ok(t.timestamp()),
        }
    }

    pub fn to_i32(&self) -> Result<i32, ConversionError> {
        self.narrow_signed(ScalarType::I32)
    }

    pub fn to_u64(&self) -> Result<u64, ConversionError> {
        match &self.payload {
            Payload::Null => Ok(0),
            Payload::Bool(b) => Ok(u64::from(*b)),
            Payload::Int(i) => {
                if self.decl.is_unsigned() {
                    Ok(*i as u64)
                } else {
                    u64::try_from(*i).map_err(|_| self.error("u64", format!("{i} out of range")))
                }
            }
            Payload::Float(f) => {
                if f.fract() != 0.0 {
                    Err(self.error("u64", format!("{f} has a fractional part")))
                } else if f.is_finite() && *f >= 0.0 && *f < U64_BOUND {
                    Ok(*f as u64)
                } else {
                    Err(self.error("u64", format!("{f} out of range")))
                }
            }
            Payload::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| self.error("u64", format!("cannot parse '{s}': {e}"))),
            Payload::Time(t) => {
                u64::try_from(t.timestamp())
                    .map_err(|_| self.error("u64", "timestamp before epoch"))
            }
        }
    }

    pub fn to_u32(&self) -> Result<u32, ConversionError> {
        self.narrow_unsigned(ScalarType::U32)
    }

    pub fn to_f64(&self) -> Result<f64, ConversionError> {
        match &self.payload {
            Payload::Null => Ok(0.0),
            Payload::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Payload::Int(i) => {
                if self.decl.is_unsigned() {
                    Ok(*i as u64 as f64)
                } else {
                    Ok(*i as f64)
                }
            }
            Payload::Float(f) => Ok(*f),
            Payload::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| self.error("f64", format!("cannot parse '{s}': {e}"))),
            Payload::Time(_) => Err(self.error("f64", "timestamps have no numeric form")),
        }
    }

    pub fn to_f32(&self) -> Result<f32, ConversionError> {
        if let Payload::Text(s) = &self.payload {
            return s
                .trim()
                .parse()
                .map_err(|e| self.error("f32", format!("cannot parse '{s}': {e}")));
        }
        let wide = self.to_f64()?;
        let narrow = wide as f32;
        if wide.is_finite() && narrow.is_infinite() {
            return Err(self.error("f32", format!("{wide} out of range")));
        }
        Ok(narrow)
    }

    pub fn to_text(&self) -> Result<String, ConversionError> {
        Ok(match &self.payload {
            Payload::Null => String::new(),
            Payload::Bool(b) => b.to_string(),
            Payload::Int(i) => {
                if self.decl.is_unsigned() {
                    (*i as u64).to_string()
                } else {
                    i.to_string()
                }
            }
            Payload::Float(f) => f.to_string(),
            Payload::Text(s) => s.to_string(),
            Payload::Time(t) => t.to_rfc3339(),
        })
    }

    pub fn to_time(&self) -> Result<DateTime<Utc>, ConversionError> {
        match &self.payload {
            Payload::Null => Ok(DateTime::<Utc>::default()),
            Payload::Time(t) => Ok(*t),
            Payload::Int(i) => DateTime::from_timestamp(*i, 0)
                .ok_or_else(|| self.error("timestamp", format!("{i} out of range"))),
            Payload::Text(s) => {
                parse_time(s).ok_or_else(|| self.error("timestamp", format!("cannot parse '{s}'")))
            }
            Payload::Bool(_) | Payload::Float(_) => {
                Err(self.error("timestamp", "no timestamp form"))
            }
        }
    }

    pub(super) fn narrow_signed<T: TryFrom<i64>>(
        &self,
        ty: ScalarType,
    ) -> Result<T, ConversionError> {
        let wide = self.to_i64()?;
        T::try_from(wide).map_err(|_| self.error(ty.name(), format!("{wide} out of range")))
    }

    pub(super) fn narrow_unsigned<T: TryFrom<u64>>(
        &self,
        ty: ScalarType,
    ) -> Result<T, ConversionError> {
        let wide = self.to_u64()?;
        T::try_from(wide).map_err(|_| self.error(ty.name(), format!("{wide} out of range")))
    }
}

macro_rules! nullable_getters {
    ($($opt:ident => $get:ident: $ty:ty),+ $(,)?) => {
        impl Cell {
            $(
                #[doc = concat!("Nullable form of [`Cell::", stringify!($get), "`]: `None` for null cells.")]
                pub fn $opt(&self) -> Result<Option<$ty>, ConversionError> {
                    if self.is_null() {
                        Ok(None)
                    } else {
                        self.$get().map(Some)
                    }
                }
            )+
        }
    };
}

nullable_getters! {
    to_opt_bool => to_bool: bool,
    to_opt_i64 => to_i64: i64,
    to_opt_i32 => to_i32: i32,
    to_opt_u64 => to_u64: u64,
    to_opt_u32 => to_u32: u32,
    to_opt_f64 => to_f64: f64,
    to_opt_f32 => to_f32: f32,
    to_opt_text => to_text: String,
    to_opt_time => to_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DeclType;
    use chrono::TimeZone;

    fn text(s: &str) -> Cell {
        let mut cell = Cell::new(DeclType::Text);
        cell.set_string(s);
        cell
    }

    #[test]
    fn test_int_getters() {
        let mut cell = Cell::new(DeclType::Int64);
        cell.set_i64(123);
        assert!(cell.to_bool().unwrap());
        assert_eq!(cell.to_i64().unwrap(), 123);
        assert_eq!(cell.to_i32().unwrap(), 123);
        assert_eq!(cell.to_u64().unwrap(), 123);
        assert_eq!(cell.to_f64().unwrap(), 123.0);
        assert_eq!(cell.to_text().unwrap(), "123");
        assert_eq!(cell.to_opt_i64().unwrap(), Some(123));
        assert_eq!(cell.to_opt_bool().unwrap(), Some(true));
    }

    #[test]
    fn test_text_numeric_parsing() {
        let cell = text("123");
        assert_eq!(cell.to_i32().unwrap(), 123);
        assert_eq!(cell.to_i64().unwrap(), 123);
        assert_eq!(cell.to_u32().unwrap(), 123);
        assert_eq!(cell.to_u64().unwrap(), 123);

        let cell = text("123.45");
        assert_eq!(cell.to_f32().unwrap(), 123.45_f32);
        assert_eq!(cell.to_f64().unwrap(), 123.45);
    }

    #[test]
    fn test_text_numeric_parse_errors() {
        let cell = text("not a number");
        assert!(cell.to_i32().is_err());
        assert!(cell.to_i64().is_err());
        assert!(cell.to_u32().is_err());
        assert!(cell.to_u64().is_err());
        assert!(cell.to_f32().is_err());
        assert!(cell.to_f64().is_err());

        let err = cell.to_i64().unwrap_err();
        assert_eq!(err.from, "text");
        assert_eq!(err.to, "i64");
    }

    #[test]
    fn test_null_getters_return_zero_values() {
        let cell = Cell::null();
        assert!(!cell.to_bool().unwrap());
        assert_eq!(cell.to_i64().unwrap(), 0);
        assert_eq!(cell.to_u32().unwrap(), 0);
        assert_eq!(cell.to_f64().unwrap(), 0.0);
        assert_eq!(cell.to_text().unwrap(), "");
        assert_eq!(cell.to_time().unwrap(), DateTime::<Utc>::default());

        assert_eq!(cell.to_opt_bool().unwrap(), None);
        assert_eq!(cell.to_opt_i64().unwrap(), None);
        assert_eq!(cell.to_opt_i32().unwrap(), None);
        assert_eq!(cell.to_opt_f64().unwrap(), None);
        assert_eq!(cell.to_opt_text().unwrap(), None);
        assert_eq!(cell.to_opt_time().unwrap(), None);
    }

    #[test]
    fn test_float_to_integer_keeps_precision() {
        let mut cell = Cell::new(DeclType::Float64);
        cell.set_f64(123.0);
        assert_eq!(cell.to_i64().unwrap(), 123);
        assert_eq!(cell.to_u32().unwrap(), 123);

        cell.set_f64(1.5);
        assert!(cell.to_i64().is_err());
        assert!(cell.to_u64().is_err());
        assert!(cell.to_i32().is_err());

        cell.set_f64(f64::NAN);
        assert!(cell.to_i64().is_err());
        cell.set_f64(1e30);
        assert!(cell.to_i64().is_err());
        cell.set_f64(-1.0);
        assert!(cell.to_u64().is_err());
    }

    #[test]
    fn test_narrowing_range_checks() {
        let mut cell = Cell::new(DeclType::Int64);
        cell.set_i64(i64::from(i32::MAX) + 1);
        assert!(cell.to_i32().is_err());
        assert!(cell.to_opt_i32().is_err());

        cell.set_i64(-1);
        assert!(cell.to_u64().is_err());
        assert!(cell.to_u32().is_err());
    }

    #[test]
    fn test_unsigned_columns_reinterpret_bits() {
        let cell = Cell::from(u64::MAX);
        assert_eq!(cell.to_u64().unwrap(), u64::MAX);
        assert!(cell.to_i64().is_err());
        assert_eq!(cell.to_text().unwrap(), u64::MAX.to_string());
    }

    #[test]
    fn test_time_conversions() {
        let moment = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let cell = Cell::from(moment);
        assert_eq!(cell.to_time().unwrap(), moment);
        assert_eq!(cell.to_i64().unwrap(), moment.timestamp());
        assert_eq!(cell.to_opt_time().unwrap(), Some(moment));
        assert!(cell.to_bool().is_err());
        assert!(cell.to_f64().is_err());

        assert_eq!(text("2024-01-01 00:00:00").to_time().unwrap(), moment);
        assert_eq!(text("2024-01-01T00:00:00Z").to_time().unwrap(), moment);
        assert_eq!(text("2024-01-01").to_time().unwrap(), moment);
        assert!(text("yesterday").to_time().is_err());

        let mut cell = Cell::new(DeclType::Int64);
        cell.set_i64(moment.timestamp());
        assert_eq!(cell.to_time().unwrap(), moment);
    }

    #[test]
    fn test_bool_from_text() {
        assert!(text("true").to_bool().unwrap());
        assert!(text("1").to_bool().unwrap());
        assert!(!text("off").to_bool().unwrap());
        assert!(text("hello").to_bool().is_err());
    }

    #[test]
    fn test_getters_do_not_mutate() {
        let cell = text("42");
        let before = cell.clone();
        let _ = cell.to_i64();
        let _ = cell.to_f32();
        let _ = cell.to_time();
        assert_eq!(cell, before);
    }
}
