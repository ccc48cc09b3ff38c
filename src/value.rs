// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/value.rs - Conversion of single field values to and from text.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/*!
 * # `value` Module
 *
 * Typed field values and the per-field codec. [format] renders a [Value] as
 * exactly `length` bytes of padded text for a [FieldSpec], and [transform]
 * parses the text of one field back into a [Value].
 */

use std::fmt;
use std::str::FromStr;

use chrono::format::{Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::spec::{self, FieldSpec, Kind, PadPosition, TimeOfDay};

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    /// Wide enough to hold every `i64` and `u64` losslessly.
    Integer(i128),
    Decimal(Decimal),
    /// Dates without a time of day are stored at midnight.
    Date(NaiveDateTime),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::String(_) => Kind::String,
            Value::Integer(_) => Kind::Integer,
            Value::Decimal(_) => Kind::Decimal,
            Value::Date(_) => Kind::Date,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Date(dt) if dt.time() == NaiveTime::MIN => {
                write!(f, "{}", dt.format("%Y-%m-%d"))
            }
            Value::Date(dt) if dt.nanosecond() == 0 => {
                write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
            }
            Value::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

/// Types that can be read out of a record field as a [Value].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Types that can be assigned from a decoded [Value].
pub trait FromValue: Sized {
    /// Converts `value`, naming `field` in any error.
    fn from_value(value: Value, field: &str) -> Result<Self>;
}

fn mismatch(field: &str, expected: Kind, value: &Value) -> Error {
    Error::ValueMismatch {
        field: field.to_string(),
        expected,
        found: value.kind(),
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Value, _field: &str) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }
}

macro_rules! impl_integer_value {
    ($($ty:ty),+) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Integer(i128::from(*self))
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value, field: &str) -> Result<Self> {
                    match value {
                        Value::Integer(i) => <$ty>::try_from(i).map_err(|e| Error::FieldParse {
                            field: field.to_string(),
                            kind: Kind::Integer,
                            text: i.to_string(),
                            reason: format!("{} ({})", e, stringify!($ty)),
                        }),
                        other => Err(mismatch(field, Kind::Integer, &other)),
                    }
                }
            }
        )+
    };
}

impl_integer_value!(i64, i32, i16, i8, u64, u32, u16, u8);

impl ToValue for usize {
    fn to_value(&self) -> Value {
        // usize is at most 64 bits wide on every supported target.
        Value::Integer(*self as i128)
    }
}

impl FromValue for usize {
    fn from_value(value: Value, field: &str) -> Result<Self> {
        let wide = u64::from_value(value, field)?;
        usize::try_from(wide).map_err(|e| Error::FieldParse {
            field: field.to_string(),
            kind: Kind::Integer,
            text: wide.to_string(),
            reason: format!("{} (usize)", e),
        })
    }
}

fn integer_to_decimal(field: &str, i: i128) -> Result<Decimal> {
    Decimal::try_from_i128_with_scale(i, 0).map_err(|e| Error::FieldParse {
        field: field.to_string(),
        kind: Kind::Decimal,
        text: i.to_string(),
        reason: e.to_string(),
    })
}

impl ToValue for Decimal {
    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Decimal(d) => Ok(d),
            Value::Integer(i) => integer_to_decimal(field, i),
            other => Err(mismatch(field, Kind::Decimal, &other)),
        }
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::Date(*self)
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Date(dt) => Ok(dt),
            other => Err(mismatch(field, Kind::Date, &other)),
        }
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value {
        Value::Date(self.and_time(NaiveTime::MIN))
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value, field: &str) -> Result<Self> {
        NaiveDateTime::from_value(value, field).map(|dt| dt.date())
    }
}

/// Renders `value` as exactly `spec.length` bytes of text.
///
/// Values that are too wide are rejected rather than truncated.
pub fn format(spec: &FieldSpec, value: &Value) -> Result<String> {
    let text = match (spec.kind, value) {
        (Kind::String, v) => v.to_string(),
        (Kind::Integer, Value::Integer(i)) => i.to_string(),
        (Kind::Decimal, Value::Decimal(d)) => render_decimal(spec, *d)?,
        (Kind::Decimal, Value::Integer(i)) => render_decimal(spec, integer_to_decimal(&spec.name, *i)?)?,
        (Kind::Date, Value::Date(dt)) => render_date(spec, dt)?,
        (expected, other) => return Err(mismatch(&spec.name, expected, other)),
    };

    pad(spec, text)
}

fn render_decimal(spec: &FieldSpec, value: Decimal) -> Result<String> {
    let number_format = spec
        .number_format
        .as_ref()
        .ok_or_else(|| Error::Schema(format!("field {} has no decimal format", spec.name)))?;
    Ok(number_format.render(value))
}

fn render_date(spec: &FieldSpec, value: &NaiveDateTime) -> Result<String> {
    use std::fmt::Write;

    let pattern = date_pattern(spec)?;
    let mut text = String::new();
    write!(text, "{}", value.format_with_items(StrftimeItems::new(pattern))).map_err(|_| {
        Error::Schema(format!(
            "field {}: date format {:?} cannot be rendered",
            spec.name, pattern
        ))
    })?;
    Ok(text)
}

fn date_pattern(spec: &FieldSpec) -> Result<&str> {
    spec.format
        .as_deref()
        .ok_or_else(|| Error::Schema(format!("field {} has no date format", spec.name)))
}

fn pad(spec: &FieldSpec, text: String) -> Result<String> {
    let actual = text.len();
    if actual > spec.length {
        return Err(Error::FieldTooLong {
            field: spec.name.clone(),
            value: text,
            actual,
            allowed: spec.length,
        });
    }

    // Pad characters are ASCII, so each one is a single byte.
    let padding = std::iter::repeat_n(spec.pad_character, spec.length - actual);
    Ok(match spec.pad_position {
        PadPosition::Left => padding.chain(text.chars()).collect(),
        PadPosition::Right => text.chars().chain(padding).collect(),
    })
}

/// Parses the text of one field into a value of the field's kind.
///
/// Surrounding whitespace is trimmed first. Other pad characters are kept, so
/// a field padded with `'0'` still parses as a number but one padded with
/// `'*'` does not.
pub fn transform(spec: &FieldSpec, text: &str) -> Result<Value> {
    let text = text.trim();

    let parse_error = |reason: String| Error::FieldParse {
        field: spec.name.clone(),
        kind: spec.kind,
        text: text.to_string(),
        reason,
    };

    match spec.kind {
        Kind::String => Ok(Value::String(text.to_string())),
        Kind::Integer => text
            .parse::<i128>()
            .map(Value::Integer)
            .map_err(|e| parse_error(e.to_string())),
        // The format only drives writing; any plain or scientific decimal is accepted.
        Kind::Decimal => Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map(Value::Decimal)
            .map_err(|e| parse_error(e.to_string())),
        Kind::Date => {
            let pattern = date_pattern(spec)?;
            let mut parsed = Parsed::new();
            chrono::format::parse(&mut parsed, text, StrftimeItems::new(pattern))
                .map_err(|e| parse_error(format!("{} (expected format {:?})", e, pattern)))?;
            let date = parsed
                .to_naive_date()
                .map_err(|e| parse_error(format!("{} (expected format {:?})", e, pattern)))?;
            let time = match spec::time_of_day(pattern) {
                TimeOfDay::Absent => NaiveTime::MIN,
                _ => parsed
                    .to_naive_time()
                    .map_err(|e| parse_error(format!("{} (expected format {:?})", e, pattern)))?,
            };
            Ok(Value::Date(date.and_time(time)))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::spec::{FieldDecl, SchemaDeclaration, resolve};

    fn field(decl: FieldDecl) -> FieldSpec {
        let declaration = SchemaDeclaration::new().field("field", decl);
        resolve(&declaration).unwrap().fields.remove(0)
    }

    fn string_field(length: usize, position: PadPosition) -> FieldSpec {
        field(
            FieldDecl::new(1)
                .length(length)
                .kind(Kind::String)
                .pad(' ', position),
        )
    }

    fn decimal(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_right_padding() {
        let spec = string_field(5, PadPosition::Right);
        let text = format(&spec, &Value::String("AB".into())).unwrap();
        assert_eq!(text, "AB   ");
        assert!(text.starts_with("AB"));
    }

    #[test]
    fn test_left_padding() {
        let spec = field(
            FieldDecl::new(1)
                .length(6)
                .kind(Kind::Integer)
                .pad('0', PadPosition::Left),
        );
        let text = format(&spec, &Value::Integer(42)).unwrap();
        assert_eq!(text, "000042");
        assert!(text.ends_with("42"));
    }

    #[test]
    fn test_exact_width_needs_no_padding() {
        let spec = string_field(3, PadPosition::Left);
        assert_eq!(format(&spec, &Value::String("XYZ".into())).unwrap(), "XYZ");
    }

    #[test]
    fn test_too_long_is_rejected() {
        let spec = string_field(3, PadPosition::Right);
        match format(&spec, &Value::String("ABCD".into())) {
            Err(Error::FieldTooLong {
                field,
                actual,
                allowed,
                ..
            }) => {
                assert_eq!(field, "field");
                assert_eq!(actual, 4);
                assert_eq!(allowed, 3);
            }
            other => panic!("expected FieldTooLong, got {:?}", other),
        }
    }

    #[test]
    fn test_width_counts_bytes() {
        let spec = string_field(3, PadPosition::Right);
        assert!(matches!(
            format(&spec, &Value::String("éé".into())),
            Err(Error::FieldTooLong { actual: 4, .. })
        ));
        assert_eq!(format(&spec, &Value::String("é".into())).unwrap(), "é ");
    }

    #[test]
    fn test_decimal_format() {
        let spec = field(
            FieldDecl::new(1)
                .length(10)
                .kind(Kind::Decimal)
                .format("%.2f")
                .pad('0', PadPosition::Left),
        );
        assert_eq!(
            format(&spec, &Value::Decimal(decimal("123.456"))).unwrap(),
            "0000123.46"
        );
        assert_eq!(format(&spec, &Value::Integer(5)).unwrap(), "0000005.00");
    }

    #[test]
    fn test_date_format() {
        let spec = field(
            FieldDecl::new(1)
                .length(8)
                .kind(Kind::Date)
                .format("%Y%m%d")
                .pad(' ', PadPosition::Right),
        );
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(format(&spec, &date.to_value()).unwrap(), "20240229");
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let spec = field(
            FieldDecl::new(1)
                .length(4)
                .kind(Kind::Integer)
                .pad('0', PadPosition::Left),
        );
        assert!(matches!(
            format(&spec, &Value::String("12".into())),
            Err(Error::ValueMismatch {
                expected: Kind::Integer,
                found: Kind::String,
                ..
            })
        ));
    }

    #[test]
    fn test_transform_string_trims_whitespace_only() {
        let spec = string_field(8, PadPosition::Right);
        assert_eq!(
            transform(&spec, "  AB  ").unwrap(),
            Value::String("AB".into())
        );
        assert_eq!(
            transform(&spec, "AB****").unwrap(),
            Value::String("AB****".into())
        );
    }

    #[test]
    fn test_transform_integer() {
        let spec = field(
            FieldDecl::new(1)
                .length(4)
                .kind(Kind::Integer)
                .pad('0', PadPosition::Left),
        );
        assert_eq!(transform(&spec, "0007").unwrap(), Value::Integer(7));
        assert_eq!(transform(&spec, "  -12").unwrap(), Value::Integer(-12));
        assert!(matches!(
            transform(&spec, "12AB"),
            Err(Error::FieldParse { .. })
        ));
        assert!(matches!(transform(&spec, "    "), Err(Error::FieldParse { .. })));
        // Zero padding ahead of the sign is not a number.
        assert!(matches!(transform(&spec, "00-5"), Err(Error::FieldParse { .. })));
    }

    #[test]
    fn test_transform_decimal_ignores_format() {
        let spec = field(
            FieldDecl::new(1)
                .length(10)
                .kind(Kind::Decimal)
                .format("%.2f")
                .pad('0', PadPosition::Left),
        );
        assert_eq!(
            transform(&spec, "0000123.46").unwrap(),
            Value::Decimal(decimal("123.46"))
        );
        assert_eq!(
            transform(&spec, "1.2345").unwrap(),
            Value::Decimal(decimal("1.2345"))
        );
        assert_eq!(
            transform(&spec, "1.5e2").unwrap(),
            Value::Decimal(decimal("150"))
        );
        assert!(matches!(transform(&spec, "abc"), Err(Error::FieldParse { .. })));
    }

    #[test]
    fn test_transform_date() {
        let spec = field(
            FieldDecl::new(1)
                .length(10)
                .kind(Kind::Date)
                .format("%Y%m%d")
                .pad(' ', PadPosition::Right),
        );
        let expected = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(
            NaiveDate::from_value(transform(&spec, "20231231  ").unwrap(), "field").unwrap(),
            expected
        );
        assert!(matches!(
            transform(&spec, "2023-12-31"),
            Err(Error::FieldParse { .. })
        ));
        assert!(matches!(
            transform(&spec, "20231332"),
            Err(Error::FieldParse { .. })
        ));
    }

    #[test]
    fn test_transform_date_time() {
        let spec = field(
            FieldDecl::new(1)
                .length(14)
                .kind(Kind::Date)
                .format("%Y%m%d%H%M%S")
                .pad(' ', PadPosition::Right),
        );
        let expected = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(
            transform(&spec, "20230102030405").unwrap(),
            Value::Date(expected)
        );
        assert_eq!(format(&spec, &Value::Date(expected)).unwrap(), "20230102030405");
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(u8::from_value(Value::Integer(255), "f").unwrap(), 255);
        assert!(matches!(
            u8::from_value(Value::Integer(256), "f"),
            Err(Error::FieldParse { .. })
        ));
        assert!(matches!(
            i32::from_value(Value::String("1".into()), "f"),
            Err(Error::ValueMismatch { .. })
        ));
    }

    #[test]
    fn test_transform_twelve_hour_time() {
        let spec = field(
            FieldDecl::new(1)
                .length(14)
                .kind(Kind::Date)
                .format("%Y%m%d%I%M%p")
                .pad(' ', PadPosition::Right),
        );
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        assert_eq!(format(&spec, &Value::Date(expected)).unwrap(), "202403010330PM");
        assert_eq!(
            transform(&spec, "202403010330PM").unwrap(),
            Value::Date(expected)
        );
        assert_eq!(
            transform(&spec, "202403010330AM").unwrap(),
            Value::Date(expected.date().and_hms_opt(3, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_partial_time_field_cannot_be_built() {
        let declaration = SchemaDeclaration::new().field(
            "field",
            FieldDecl::new(1)
                .length(10)
                .kind(Kind::Date)
                .format("%Y%m%d%H")
                .pad(' ', PadPosition::Right),
        );
        assert!(matches!(resolve(&declaration), Err(Error::Schema(_))));

        // Specs built by hand skip resolution.
        let mut spec = field(
            FieldDecl::new(1)
                .length(10)
                .kind(Kind::Date)
                .format("%Y%m%d%H%M")
                .pad(' ', PadPosition::Right),
        );
        spec.format = Some("%Y%m%d%H".into());
        assert!(matches!(
            transform(&spec, "2024030115"),
            Err(Error::FieldParse { kind: Kind::Date, .. })
        ));
    }

    #[test]
    fn test_wide_integer_conversions() {
        let spec = field(
            FieldDecl::new(1)
                .length(20)
                .kind(Kind::Integer)
                .pad('0', PadPosition::Left),
        );
        let text = format(&spec, &u64::MAX.to_value()).unwrap();
        assert_eq!(text, "18446744073709551615");
        assert_eq!(
            u64::from_value(transform(&spec, &text).unwrap(), "f").unwrap(),
            u64::MAX
        );
        assert_eq!(usize::from_value(Value::Integer(42), "f").unwrap(), 42);
        assert_eq!(7usize.to_value(), Value::Integer(7));

        assert!(matches!(
            i64::from_value(u64::MAX.to_value(), "f"),
            Err(Error::FieldParse { .. })
        ));
        assert!(matches!(
            u64::from_value(Value::Integer(-1), "f"),
            Err(Error::FieldParse { .. })
        ));
        assert!(matches!(
            usize::from_value(Value::Integer(-1), "f"),
            Err(Error::FieldParse { .. })
        ));
    }

    #[test]
    fn test_display() {
        let date = NaiveDate::from_ymd_opt(2020, 5, 6).unwrap();
        assert_eq!(date.to_value().to_string(), "2020-05-06");
        assert_eq!(
            Value::Date(date.and_hms_opt(7, 8, 9).unwrap()).to_string(),
            "2020-05-06 07:08:09"
        );
        assert_eq!(Value::Decimal(decimal("1.50")).to_string(), "1.50");
    }
}
