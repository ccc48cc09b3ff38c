// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/record.rs - Encoding and decoding of whole fixed-width records.
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
 * # `record` Module
 *
 * This module turns typed records into fixed-width lines and back.
 *
 * ## Usage Example
 *
 * ```
 * use fixedwidth::impl_record;
 * use fixedwidth::record::RecordCodec;
 * use fixedwidth::spec::{FieldDecl, Kind, PadPosition};
 *
 * #[derive(Debug, Default, PartialEq)]
 * struct Item {
 *     code: String,
 *     qty: i64,
 * }
 *
 * impl_record!(Item {
 *     fields: {
 *         code => FieldDecl::new(1).length(3).kind(Kind::String).pad(' ', PadPosition::Right),
 *         qty => FieldDecl::new(4).length(4).kind(Kind::Integer).pad('0', PadPosition::Left),
 *     }
 * });
 *
 * let codec = RecordCodec::new();
 * let line = codec.encode(&Item { code: "AB".into(), qty: 7 }).unwrap();
 * assert_eq!(line, "AB 0007");
 *
 * let mut item = Item::default();
 * codec.decode(&line, &mut item).unwrap();
 * assert_eq!(item, Item { code: "AB".into(), qty: 7 });
 * ```
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::spec::{FieldSpec, Schema, SchemaCache, SchemaDeclaration};
use crate::value::{self, Value};

/// A type whose instances map to fixed-width records.
///
/// Usually implemented with [impl_record!](crate::impl_record).
pub trait Record: 'static {
    /// The declared layout of this record type.
    fn declaration() -> SchemaDeclaration;

    /// Returns the value of the named field, or `None` if there is no such
    /// field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Assigns a decoded value to the named field.
    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;
}

/// Implements [Record] for a struct from a list of field declarations.
///
/// Each field's name in the schema is the struct field's identifier. Field
/// types must implement [ToValue](crate::value::ToValue) and
/// [FromValue](crate::value::FromValue).
#[macro_export]
macro_rules! impl_record {
    (
        $ty:ty {
            $(defaults: $defaults:expr,)?
            fields: {
                $($field:ident => $decl:expr),+ $(,)?
            } $(,)?
        }
    ) => {
        impl $crate::record::Record for $ty {
            fn declaration() -> $crate::spec::SchemaDeclaration {
                let mut declaration = $crate::spec::SchemaDeclaration::new();
                $(declaration = declaration.with_defaults($defaults);)?
                $(declaration = declaration.field(stringify!($field), $decl);)+
                declaration
            }

            fn field(&self, name: &str) -> ::core::option::Option<$crate::value::Value> {
                match name {
                    $(stringify!($field) => ::core::option::Option::Some(
                        $crate::value::ToValue::to_value(&self.$field),
                    ),)+
                    _ => ::core::option::Option::None,
                }
            }

            fn set_field(
                &mut self,
                name: &str,
                value: $crate::value::Value,
            ) -> $crate::error::Result<()> {
                match name {
                    $(stringify!($field) => {
                        self.$field = $crate::value::FromValue::from_value(value, name)?;
                        ::core::result::Result::Ok(())
                    })+
                    _ => ::core::result::Result::Err($crate::error::Error::UnknownField {
                        field: name.to_string(),
                    }),
                }
            }
        }
    };
}

/// What to do when a line ends before a field does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortLinePolicy {
    /// Use whatever part of the field is present, possibly nothing.
    #[default]
    Lenient,
    /// Fail with [Error::ShortLine].
    Strict,
}

/// Decoding options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecOptions {
    pub short_lines: ShortLinePolicy,
}

/// Encodes and decodes records, caching each record type's resolved schema.
#[derive(Debug, Default)]
pub struct RecordCodec {
    options: CodecOptions,
    schemas: SchemaCache,
    short_reads: AtomicU64,
}

impl RecordCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CodecOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Returns the resolved schema for `R`.
    pub fn schema<R: Record>(&self) -> Result<Arc<Schema>> {
        self.schemas.get_or_resolve::<R>()
    }

    /// Encodes `record` as one line, without a line terminator.
    pub fn encode<R: Record>(&self, record: &R) -> Result<String> {
        let schema = self.schema::<R>()?;
        encode_with(&schema, record)
    }

    /// Decodes `line` into `record`, overwriting every field in the schema.
    pub fn decode<'r, R: Record>(&self, line: &str, record: &'r mut R) -> Result<&'r mut R> {
        let schema = self.schema::<R>()?;
        let mut short = 0;
        let result = decode_fields(&schema, line, record, &self.options, &mut short);
        if short > 0 {
            self.short_reads.fetch_add(short, Ordering::Relaxed);
        }
        result?;
        Ok(record)
    }

    /// Number of fields so far that were read from a line too short to hold
    /// them.
    pub fn short_reads(&self) -> u64 {
        self.short_reads.load(Ordering::Relaxed)
    }
}

/// Encodes `record` using an already-resolved schema.
pub fn encode_with<R: Record>(schema: &Schema, record: &R) -> Result<String> {
    let mut line = String::with_capacity(schema.record_length.unwrap_or_default());
    for spec in &schema.fields {
        let value = record.field(&spec.name).ok_or_else(|| Error::UnknownField {
            field: spec.name.clone(),
        })?;
        line.push_str(&value::format(spec, &value)?);
    }

    if let Some(expected) = schema.record_length {
        if line.len() != expected {
            return Err(Error::RecordLengthMismatch {
                actual: line.len(),
                expected,
            });
        }
    }

    tracing::trace!(length = line.len(), "encoded record");
    Ok(line)
}

/// Decodes `line` into `record` using an already-resolved schema.
pub fn decode_with<'r, R: Record>(
    schema: &Schema,
    line: &str,
    record: &'r mut R,
    options: &CodecOptions,
) -> Result<&'r mut R> {
    decode_fields(schema, line, record, options, &mut 0)?;
    Ok(record)
}

// Counts fields that ran past the end of the line in `short`, including
// those read before a failure.
fn decode_fields<R: Record>(
    schema: &Schema,
    line: &str,
    record: &mut R,
    options: &CodecOptions,
    short: &mut u64,
) -> Result<()> {
    for spec in &schema.fields {
        let (text, complete) = field_text(spec, line, options)?;
        if !complete {
            *short += 1;
        }
        record.set_field(&spec.name, value::transform(spec, text)?)?;
    }

    tracing::trace!(length = line.len(), short_fields = *short, "decoded record");
    Ok(())
}

fn field_text<'a>(
    spec: &FieldSpec,
    line: &'a str,
    options: &CodecOptions,
) -> Result<(&'a str, bool)> {
    let bytes = line.as_bytes();
    let range = spec.range();
    let start = range.start.min(bytes.len());
    let end = range.end.min(bytes.len());
    let complete = end == range.end;

    if !complete {
        tracing::debug!(
            field = %spec.name,
            start = spec.start,
            length = spec.length,
            available = line.len(),
            "line ends inside field"
        );
        if options.short_lines == ShortLinePolicy::Strict {
            return Err(Error::ShortLine {
                field: spec.name.clone(),
                needed: range.end,
                available: line.len(),
            });
        }
    }

    let text = std::str::from_utf8(&bytes[start..end]).map_err(|e| Error::FieldParse {
        field: spec.name.clone(),
        kind: spec.kind,
        text: String::from_utf8_lossy(&bytes[start..end]).into_owned(),
        reason: format!("field boundary splits a character ({})", e),
    })?;

    Ok((text, complete))
}

/// Returns up to `length` bytes of `line` starting at the 1-based `start`.
///
/// Used to read a record type discriminator before choosing which record
/// type to decode a line into. Returns `None` if `start` lies beyond the end
/// of the line; a `start` just past the last byte yields an empty string.
pub fn record_identifier(line: &str, start: usize, length: usize) -> Option<&str> {
    let offset = start.checked_sub(1)?;
    if offset > line.len() {
        return None;
    }
    let end = offset.saturating_add(length).min(line.len());
    line.get(offset..end)
}
