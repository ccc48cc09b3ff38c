// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/spec.rs - Field specifications and schema resolution.
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
 * # `spec` Module
 *
 * Record layouts are declared as a [SchemaDeclaration]: an ordered list of
 * named [FieldDecl]s plus optional record-level [FieldDefaults]. [resolve]
 * merges the defaults into every field and validates the result, producing a
 * [Schema] of fully-specified [FieldSpec]s.
 *
 * ## Usage Example
 *
 * ```
 * use fixedwidth::spec::{FieldDecl, FieldDefaults, Kind, PadPosition, SchemaDeclaration};
 *
 * let declaration = SchemaDeclaration::new()
 *     .with_defaults(FieldDefaults::new().pad(' ', PadPosition::Right).length(7))
 *     .field("code", FieldDecl::new(1).length(3).kind(Kind::String))
 *     .field("qty", FieldDecl::new(4).length(4).kind(Kind::Integer).pad('0', PadPosition::Left));
 *
 * let schema = fixedwidth::spec::resolve(&declaration).unwrap();
 * assert_eq!(schema.record_length, Some(7));
 * assert_eq!(schema.fields[0].pad_character, ' ');
 * ```
 */

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::Write;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDateTime;
use chrono::format::{Fixed, Item, Numeric, StrftimeItems};

use crate::error::{Error, Result};
use crate::numfmt::NumberFormat;
use crate::record::Record;

/// The datatype of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Text, stored verbatim.
    String,
    /// A base-10 signed integer.
    Integer,
    /// A decimal number, written with a printf-style pattern such as `%.2f`.
    Decimal,
    /// A date or date-time, written with a strftime pattern such as `%Y%m%d`.
    Date,
}

impl Kind {
    fn requires_format(self) -> bool {
        matches!(self, Kind::Decimal | Kind::Date)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Decimal => "decimal",
            Kind::Date => "date",
        })
    }
}

/// The side of the value that receives padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadPosition {
    /// Padding precedes the value (right-aligned text).
    Left,
    /// Padding follows the value (left-aligned text).
    Right,
}

/// A field declaration as written by the record author.
///
/// Every attribute except `start` may be left unset and inherited from the
/// record's [FieldDefaults].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    /// 1-based byte offset of the field within the record.
    pub start: usize,
    pub length: Option<usize>,
    pub kind: Option<Kind>,
    pub pad_character: Option<char>,
    pub pad_position: Option<PadPosition>,
    pub format: Option<&'static str>,
}

impl FieldDecl {
    pub const fn new(start: usize) -> Self {
        Self {
            start,
            length: None,
            kind: None,
            pad_character: None,
            pad_position: None,
            format: None,
        }
    }

    pub const fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub const fn kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub const fn pad(mut self, character: char, position: PadPosition) -> Self {
        self.pad_character = Some(character);
        self.pad_position = Some(position);
        self
    }

    pub const fn format(mut self, format: &'static str) -> Self {
        self.format = Some(format);
        self
    }

    /// Returns a copy of this declaration with every unset attribute taken
    /// from `defaults`. Attributes set here always win.
    pub fn merged(&self, defaults: &FieldDefaults) -> FieldDecl {
        FieldDecl {
            start: self.start,
            length: self.length.or(defaults.length),
            kind: self.kind.or(defaults.kind),
            pad_character: self.pad_character.or(defaults.pad_character),
            pad_position: self.pad_position.or(defaults.pad_position),
            format: self.format.or(defaults.format),
        }
    }
}

/// Record-level defaults for field attributes.
///
/// `length` has a second meaning: when set, it is also the exact byte length
/// every encoded record must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldDefaults {
    pub length: Option<usize>,
    pub kind: Option<Kind>,
    pub pad_character: Option<char>,
    pub pad_position: Option<PadPosition>,
    pub format: Option<&'static str>,
}

impl FieldDefaults {
    pub const fn new() -> Self {
        Self {
            length: None,
            kind: None,
            pad_character: None,
            pad_position: None,
            format: None,
        }
    }

    pub const fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub const fn kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub const fn pad(mut self, character: char, position: PadPosition) -> Self {
        self.pad_character = Some(character);
        self.pad_position = Some(position);
        self
    }

    pub const fn format(mut self, format: &'static str) -> Self {
        self.format = Some(format);
        self
    }
}

/// The declared layout of one record type, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaDeclaration {
    pub defaults: Option<FieldDefaults>,
    pub fields: Vec<(&'static str, FieldDecl)>,
}

impl SchemaDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(mut self, defaults: FieldDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn field(mut self, name: &'static str, decl: FieldDecl) -> Self {
        self.fields.push((name, decl));
        self
    }
}

/// A fully-resolved field layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// The record field this spec belongs to.
    pub name: String,
    /// 1-based byte offset of the field within the record.
    pub start: usize,
    /// Width of the field in bytes.
    pub length: usize,
    pub kind: Kind,
    pub pad_character: char,
    pub pad_position: PadPosition,
    /// Numeric pattern for [Kind::Decimal], strftime pattern for [Kind::Date].
    pub format: Option<String>,
    pub(crate) number_format: Option<NumberFormat>,
}

impl FieldSpec {
    /// 0-based byte range of the field within a record.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start - 1..self.start - 1 + self.length
    }
}

/// The resolved layout of one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Field specs in declaration order.
    pub fields: Vec<FieldSpec>,
    /// Required byte length of an encoded record, if declared.
    pub record_length: Option<usize>,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Resolves a schema declaration into a validated [Schema].
pub fn resolve(declaration: &SchemaDeclaration) -> Result<Schema> {
    let defaults = declaration.defaults.unwrap_or_default();

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(declaration.fields.len());
    for (name, decl) in &declaration.fields {
        if !seen.insert(*name) {
            return Err(Error::Schema(format!("field {} is declared twice", name)));
        }
        fields.push(resolve_field(name, &decl.merged(&defaults))?);
    }

    if let Some(0) = defaults.length {
        return Err(Error::Schema("record length must be at least 1".into()));
    }

    Ok(Schema {
        fields,
        record_length: defaults.length,
    })
}

fn resolve_field(name: &str, decl: &FieldDecl) -> Result<FieldSpec> {
    let missing = |attribute: &str| Error::Schema(format!("field {} has no {}", name, attribute));

    let length = decl.length.ok_or_else(|| missing("length"))?;
    let kind = decl.kind.ok_or_else(|| missing("kind"))?;
    let pad_character = decl.pad_character.ok_or_else(|| missing("pad character"))?;
    let pad_position = decl.pad_position.ok_or_else(|| missing("pad position"))?;

    if decl.start == 0 {
        return Err(Error::Schema(format!(
            "field {} has start 0; positions are 1-based",
            name
        )));
    }
    if length == 0 {
        return Err(Error::Schema(format!("field {} has length 0", name)));
    }
    if decl.start.checked_add(length).is_none() {
        return Err(Error::Schema(format!(
            "field {} at {} with length {} runs past the addressable range",
            name, decl.start, length
        )));
    }
    if !pad_character.is_ascii() {
        return Err(Error::Schema(format!(
            "field {} has non-ASCII pad character {:?}",
            name, pad_character
        )));
    }

    let format = decl.format.filter(|f| !f.is_empty());
    if kind.requires_format() && format.is_none() {
        return Err(Error::Schema(format!(
            "field {} with kind {} requires a format",
            name, kind
        )));
    }

    let number_format = match (kind, format) {
        (Kind::Decimal, Some(pattern)) => Some(
            NumberFormat::parse(pattern)
                .map_err(|e| Error::Schema(format!("field {}: {}", name, e)))?,
        ),
        (Kind::Date, Some(pattern)) => {
            check_date_format(pattern)
                .map_err(|e| Error::Schema(format!("field {}: {}", name, e)))?;
            None
        }
        _ => None,
    };

    Ok(FieldSpec {
        name: name.to_string(),
        start: decl.start,
        length,
        kind,
        pad_character,
        pad_position,
        format: format.map(String::from),
        number_format,
    })
}

fn check_date_format(pattern: &str) -> std::result::Result<(), String> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(format!("invalid date format {:?}", pattern));
    }

    if time_of_day(pattern) == TimeOfDay::Partial {
        return Err(format!(
            "date format {:?} has a partial time of day; it needs an hour (%H, or %I with %p) and a minute",
            pattern
        ));
    }

    // Items like %z need a timezone, which a naive date-time cannot supply.
    let sample = NaiveDateTime::default();
    let mut rendered = String::new();
    write!(rendered, "{}", sample.format(pattern))
        .map_err(|_| format!("date format {:?} cannot render a naive date-time", pattern))
}

/// How much of a time of day a date pattern carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimeOfDay {
    /// Date only. Parsed values land on midnight.
    Absent,
    /// Enough to build a time: an unambiguous hour and a minute.
    Complete,
    /// Some time items, but not enough to build a time.
    Partial,
}

pub(crate) fn time_of_day(pattern: &str) -> TimeOfDay {
    let mut hour24 = false;
    let mut hour12 = false;
    let mut meridiem = false;
    let mut minute = false;
    let mut finer = false;

    for item in StrftimeItems::new(pattern) {
        match item {
            Item::Numeric(Numeric::Hour, _) => hour24 = true,
            Item::Numeric(Numeric::Hour12, _) => hour12 = true,
            Item::Numeric(Numeric::Minute, _) => minute = true,
            Item::Numeric(Numeric::Second | Numeric::Nanosecond, _) => finer = true,
            Item::Fixed(Fixed::LowerAmPm | Fixed::UpperAmPm) => meridiem = true,
            Item::Fixed(
                Fixed::Nanosecond | Fixed::Nanosecond3 | Fixed::Nanosecond6 | Fixed::Nanosecond9,
            ) => finer = true,
            _ => {}
        }
    }

    if !(hour24 || hour12 || meridiem || minute || finer) {
        TimeOfDay::Absent
    } else if (hour24 || (hour12 && meridiem)) && minute {
        TimeOfDay::Complete
    } else {
        TimeOfDay::Partial
    }
}

/// Memoizes resolved schemas per record type.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<TypeId, Arc<Schema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resolved schema for `R`, resolving it on first use.
    pub fn get_or_resolve<R: Record>(&self) -> Result<Arc<Schema>> {
        let key = TypeId::of::<R>();
        if let Some(schema) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(schema));
        }

        let schema = Arc::new(resolve(&R::declaration())?);
        tracing::debug!(
            record = std::any::type_name::<R>(),
            fields = schema.fields.len(),
            record_length = ?schema.record_length,
            "resolved schema"
        );

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key).or_insert(schema)))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
