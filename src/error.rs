// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error types for fixed-width record processing.
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

use thiserror::Error;

use crate::spec::Kind;

/// Errors produced while resolving schemas or encoding/decoding records.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema declaration is malformed.
    #[error("Schema error: {0}")]
    Schema(String),

    /// An encoded value does not fit in its field.
    #[error(
        "The value {value:?} with length {actual} is too long for field {field} with length {allowed}"
    )]
    FieldTooLong {
        field: String,
        value: String,
        actual: usize,
        allowed: usize,
    },

    /// Field text could not be parsed into the declared kind.
    #[error("Cannot parse {text:?} as {kind} for field {field}: {reason}")]
    FieldParse {
        field: String,
        kind: Kind,
        text: String,
        reason: String,
    },

    /// The encoded record length differs from the declared record length.
    #[error("Record length of {actual} does not match defined length of {expected}")]
    RecordLengthMismatch { actual: usize, expected: usize },

    /// A value of the wrong kind was supplied for a field.
    #[error("Field {field} expects a {expected} value, got {found}")]
    ValueMismatch {
        field: String,
        expected: Kind,
        found: Kind,
    },

    /// The record has no field with this name.
    #[error("Record has no field named {field}")]
    UnknownField { field: String },

    /// The line ends before the field does (strict short line policy only).
    #[error("Line too short for field {field}: needed {needed} bytes, {available} available")]
    ShortLine {
        field: String,
        needed: usize,
        available: usize,
    },

    /// An operation was attempted on an exhausted or unopened resource.
    #[error("Usage error: {0}")]
    Usage(String),

    /// A failure while processing one record of a file.
    #[error("Record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Wraps this error with the index of the record being processed.
    pub fn at_record(self, index: usize) -> Self {
        Self::Record {
            index,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
