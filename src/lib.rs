// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - Reader and writer library for fixed-width text records.
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
 * # `fixedwidth` Crate
 *
 * A library for converting between fixed-width text records and typed Rust
 * structs.
 *
 * Every field of a record occupies a known byte offset and length. This
 * crate provides:
 *
 * 1. [spec]: Declares record layouts and resolves them into field specs.
 * 2. [value]: Formats and parses single field values.
 * 3. [record]: Encodes and decodes whole records.
 * 4. [io]: Reads and writes fixed-width files one record per line.
 * 5. [tabular]: Exports decoded records as CSV.
 *
 * ## Usage Example
 *
 * ```no_run
 * use chrono::NaiveDate;
 * use rust_decimal::Decimal;
 *
 * use fixedwidth::impl_record;
 * use fixedwidth::io::{RecordReader, RecordWriter};
 * use fixedwidth::record::RecordCodec;
 * use fixedwidth::spec::{FieldDecl, FieldDefaults, Kind, PadPosition};
 *
 * #[derive(Debug, Default)]
 * struct Payment {
 *     account: u32,
 *     amount: Decimal,
 *     due: NaiveDate,
 * }
 *
 * impl_record!(Payment {
 *     defaults: FieldDefaults::new().length(24).pad(' ', PadPosition::Left),
 *     fields: {
 *         account => FieldDecl::new(1).length(6).kind(Kind::Integer).pad('0', PadPosition::Left),
 *         amount => FieldDecl::new(7).length(10).kind(Kind::Decimal).format("%.2f"),
 *         due => FieldDecl::new(17).length(8).kind(Kind::Date).format("%Y%m%d"),
 *     }
 * });
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let codec = RecordCodec::new();
 *
 *     // Read every payment from the file
 *     let mut reader = RecordReader::open("payments.txt")?;
 *     let payments: Vec<Payment> = reader.read_all(&codec)?;
 *
 *     // Write them back out, compressed
 *     let mut writer = RecordWriter::create("payments.txt.gz")?;
 *     for payment in &payments {
 *         println!("{}: {} due {}", payment.account, payment.amount, payment.due);
 *         writer.write_record(&codec, payment)?;
 *     }
 *     writer.close()?;
 *
 *     Ok(())
 * }
 * ```
 */

pub mod error;
pub mod io;
mod numfmt;
pub mod record;
pub mod spec;
pub mod tabular;
pub mod value;

pub use error::{Error, Result};
