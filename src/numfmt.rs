// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/numfmt.rs - printf-style numeric patterns for decimal fields.
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

//! Numeric patterns of the form `%[flags][width][.precision]conversion`.
//!
//! Supported flags are `-` (left-justify), `+` (always print a sign), ` `
//! (space in place of a plus sign) and `0` (zero-fill the width). The
//! conversion is `f`/`F` (fixed point, default precision 6) or `d` (rounded
//! to an integer). Literal text may surround the conversion and `%%` stands
//! for a percent sign.

use rust_decimal::{Decimal, RoundingStrategy};

const DEFAULT_PRECISION: u32 = 6;
// rust_decimal cannot represent more fractional digits than this.
const MAX_PRECISION: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Negative,
    Plus,
    Space,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    prefix: String,
    suffix: String,
    left_justify: bool,
    zero_fill: bool,
    sign: Sign,
    width: usize,
    precision: u32,
}

impl NumberFormat {
    /// Parses a numeric pattern such as `%.2f` or `%08.3f`.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        let mut prefix = String::new();
        let mut chars = pattern.chars().peekable();

        // Literal text up to the conversion.
        loop {
            match chars.next() {
                Some('%') if chars.peek() == Some(&'%') => {
                    chars.next();
                    prefix.push('%');
                }
                Some('%') => break,
                Some(c) => prefix.push(c),
                None => return Err(format!("pattern {:?} has no conversion", pattern)),
            }
        }

        let mut left_justify = false;
        let mut zero_fill = false;
        let mut sign = Sign::Negative;
        while let Some(&c) = chars.peek() {
            match c {
                '-' => left_justify = true,
                '0' => zero_fill = true,
                '+' => sign = Sign::Plus,
                ' ' if sign != Sign::Plus => sign = Sign::Space,
                ' ' => (),
                _ => break,
            }
            chars.next();
        }

        let mut width = 0usize;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            width = width
                .checked_mul(10)
                .and_then(|w| w.checked_add(d as usize))
                .ok_or_else(|| format!("width in pattern {:?} is too large", pattern))?;
            chars.next();
        }

        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut p = 0u32;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                p = p.saturating_mul(10).saturating_add(d);
                chars.next();
            }
            if p > MAX_PRECISION {
                return Err(format!(
                    "precision {} in pattern {:?} exceeds {}",
                    p, pattern, MAX_PRECISION
                ));
            }
            precision = Some(p);
        }

        let precision = match chars.next() {
            Some('f') | Some('F') => precision.unwrap_or(DEFAULT_PRECISION),
            Some('d') if precision.is_none() => 0,
            Some('d') => return Err(format!("pattern {:?} gives %d a precision", pattern)),
            Some(c) => {
                return Err(format!(
                    "unsupported conversion {:?} in pattern {:?}",
                    c, pattern
                ));
            }
            None => return Err(format!("pattern {:?} ends inside a conversion", pattern)),
        };

        let mut suffix = String::new();
        while let Some(c) = chars.next() {
            match c {
                '%' if chars.peek() == Some(&'%') => {
                    chars.next();
                    suffix.push('%');
                }
                '%' => {
                    return Err(format!(
                        "pattern {:?} has more than one conversion",
                        pattern
                    ));
                }
                c => suffix.push(c),
            }
        }

        Ok(Self {
            prefix,
            suffix,
            left_justify,
            zero_fill,
            sign,
            width,
            precision,
        })
    }

    /// Renders a decimal, rounding half away from zero.
    pub fn render(&self, value: Decimal) -> String {
        let mut rounded =
            value.round_dp_with_strategy(self.precision, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(self.precision);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }

        let negative = rounded.is_sign_negative();
        let digits = rounded.abs().to_string();
        let sign = match (negative, self.sign) {
            (true, _) => "-",
            (false, Sign::Plus) => "+",
            (false, Sign::Space) => " ",
            (false, Sign::Negative) => "",
        };

        let body_len = sign.len() + digits.len();
        let fill = self.width.saturating_sub(body_len);

        let mut number = String::with_capacity(body_len + fill);
        if self.left_justify {
            number.push_str(sign);
            number.push_str(&digits);
            number.extend(std::iter::repeat_n(' ', fill));
        } else if self.zero_fill {
            number.push_str(sign);
            number.extend(std::iter::repeat_n('0', fill));
            number.push_str(&digits);
        } else {
            number.extend(std::iter::repeat_n(' ', fill));
            number.push_str(sign);
            number.push_str(&digits);
        }

        format!("{}{}{}", self.prefix, number, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn render(pattern: &str, value: &str) -> String {
        NumberFormat::parse(pattern)
            .unwrap()
            .render(Decimal::from_str(value).unwrap())
    }

    #[test]
    fn test_fixed_point() {
        assert_eq!(render("%.2f", "12.345"), "12.35");
        assert_eq!(render("%.2f", "-12.345"), "-12.35");
        assert_eq!(render("%.2f", "7"), "7.00");
        assert_eq!(render("%.0f", "2.5"), "3");
        assert_eq!(render("%f", "1.5"), "1.500000");
    }

    #[test]
    fn test_width_and_flags() {
        assert_eq!(render("%08.2f", "-3.1"), "-0003.10");
        assert_eq!(render("%8.2f", "3.1"), "    3.10");
        assert_eq!(render("%-8.2f|", "3.1"), "3.10    |");
        assert_eq!(render("%+.1f", "3"), "+3.0");
        assert_eq!(render("% .1f", "3"), " 3.0");
        assert_eq!(render("%05d", "41.6"), "00042");
    }

    #[test]
    fn test_negative_zero_is_unsigned() {
        assert_eq!(render("%.2f", "-0.001"), "0.00");
    }

    #[test]
    fn test_literals() {
        assert_eq!(render("$%.2f", "5"), "$5.00");
        assert_eq!(render("%.1f%%", "12.34"), "12.3%");
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(NumberFormat::parse("").is_err());
        assert!(NumberFormat::parse("Ymd").is_err());
        assert!(NumberFormat::parse("%.2").is_err());
        assert!(NumberFormat::parse("%.2s").is_err());
        assert!(NumberFormat::parse("%.2f %d").is_err());
        assert!(NumberFormat::parse("%.2d").is_err());
        assert!(NumberFormat::parse("%.40f").is_err());
    }
}
