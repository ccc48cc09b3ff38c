// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/tabular.rs - CSV export of fixed-width records.
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
 * # `tabular` Module
 *
 * Exports decoded records as CSV. [CsvExporter] writes a header row of field
 * names in schema order, then one row per record with each value rendered by
 * its [Display](std::fmt::Display) form.
 *
 * ## Usage Example
 *
 * ```
 * use fixedwidth::impl_record;
 * use fixedwidth::record::RecordCodec;
 * use fixedwidth::spec::{FieldDecl, FieldDefaults, Kind, PadPosition};
 * use fixedwidth::tabular::CsvExporter;
 *
 * #[derive(Debug, Default)]
 * struct Part {
 *     name: String,
 *     qty: u32,
 * }
 *
 * impl_record!(Part {
 *     defaults: FieldDefaults::new().length(9),
 *     fields: {
 *         name => FieldDecl::new(1).length(5).kind(Kind::String).pad(' ', PadPosition::Right),
 *         qty => FieldDecl::new(6).length(4).kind(Kind::Integer).pad('0', PadPosition::Left),
 *     }
 * });
 *
 * let codec = RecordCodec::new();
 * let mut part = Part::default();
 * codec.decode("bolt 0010", &mut part).unwrap();
 *
 * let mut exporter = CsvExporter::<Part, _>::new(&codec, Vec::new()).unwrap();
 * exporter.export(&part).unwrap();
 * let csv = String::from_utf8(exporter.finish().unwrap()).unwrap();
 * assert_eq!(csv, "name,qty\nbolt,10\n");
 * ```
 */

use std::io::Write;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::record::{Record, RecordCodec};
use crate::spec::Schema;

/// Writes records of type `R` as CSV rows, one column per schema field.
pub struct CsvExporter<R, W: Write> {
    writer: csv::Writer<W>,
    schema: Arc<Schema>,
    _record: PhantomData<fn(&R)>,
}

impl<R: Record, W: Write> CsvExporter<R, W> {
    /// Creates an exporter and writes the header row of field names.
    pub fn new(codec: &RecordCodec, sink: W) -> Result<Self> {
        let schema = codec.schema::<R>()?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        writer.write_record(schema.fields.iter().map(|f| f.name.as_str()))?;

        Ok(Self {
            writer,
            schema,
            _record: PhantomData,
        })
    }

    pub fn export(&mut self, record: &R) -> Result<()> {
        let mut row = Vec::with_capacity(self.schema.fields.len());
        for spec in &self.schema.fields {
            let value = record.field(&spec.name).ok_or_else(|| Error::UnknownField {
                field: spec.name.clone(),
            })?;
            row.push(value.to_string());
        }
        self.writer.write_record(&row)?;
        Ok(())
    }

    /// Flushes the CSV writer and returns the sink.
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::impl_record;
    use crate::spec::{FieldDecl, FieldDefaults, Kind, PadPosition};

    #[derive(Debug, Default)]
    struct Entry {
        name: String,
        amount: Decimal,
        posted: NaiveDate,
    }

    impl_record!(Entry {
        defaults: FieldDefaults::new().pad(' ', PadPosition::Right),
        fields: {
            name => FieldDecl::new(1).length(10).kind(Kind::String),
            amount => FieldDecl::new(11).length(8).kind(Kind::Decimal).format("%.2f"),
            posted => FieldDecl::new(19).length(8).kind(Kind::Date).format("%Y%m%d"),
        }
    });

    #[test]
    fn test_export() {
        let codec = RecordCodec::new();
        let mut exporter = CsvExporter::<Entry, _>::new(&codec, Vec::new()).unwrap();

        let mut entry = Entry::default();
        codec
            .decode("Smith, J. -12.50  20240105", &mut entry)
            .unwrap();
        exporter.export(&entry).unwrap();
        exporter
            .export(&Entry {
                name: "Doe".into(),
                amount: Decimal::from_str("3").unwrap(),
                posted: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            })
            .unwrap();

        let csv = String::from_utf8(exporter.finish().unwrap()).unwrap();
        assert_eq!(
            csv,
            "name,amount,posted\n\"Smith, J.\",-12.50,2024-01-05\nDoe,3,2024-01-06\n"
        );
    }
}
