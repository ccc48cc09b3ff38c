// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  fw2csv.rs - CSV conversion demo for fixed-width payment files.
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

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use clap::Parser;
use rust_decimal::Decimal;

use fixedwidth::impl_record;
use fixedwidth::io::RecordReader;
use fixedwidth::record::RecordCodec;
use fixedwidth::spec::{FieldDecl, FieldDefaults, Kind, PadPosition};
use fixedwidth::tabular::CsvExporter;

#[derive(Debug, Default)]
struct Payment {
    account: u32,
    payee: String,
    amount: Decimal,
    due: NaiveDate,
}

impl_record!(Payment {
    defaults: FieldDefaults::new().length(46).kind(Kind::String).pad(' ', PadPosition::Right),
    fields: {
        account => FieldDecl::new(1).length(8).kind(Kind::Integer).pad('0', PadPosition::Left),
        payee => FieldDecl::new(9).length(20),
        amount => FieldDecl::new(29)
            .length(10)
            .kind(Kind::Decimal)
            .format("%.2f")
            .pad(' ', PadPosition::Left),
        due => FieldDecl::new(39).length(8).kind(Kind::Date).format("%Y%m%d"),
    }
});

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to read.
    file: String,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let codec = RecordCodec::new();

    let mut reader = match RecordReader::open(&args.file) {
        Ok(r) => r,
        Err(error) => {
            eprintln!("Error opening file {:?}: {:?}", &args.file, error);
            return;
        }
    };

    // Write the CSV file next to the input file
    let output_path = Path::new(&args.file).with_extension("csv");
    let output = match File::create(&output_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to create {}: {}", output_path.display(), e);
            return;
        }
    };

    let mut exporter = match CsvExporter::<Payment, _>::new(&codec, output) {
        Ok(e) => e,
        Err(error) => {
            eprintln!("Error writing CSV header: {}", error);
            return;
        }
    };

    let mut count = 0;
    while !reader.is_exhausted() {
        let mut payment = Payment::default();
        if let Err(error) = reader.read_record(&codec, &mut payment) {
            eprintln!("Error reading file {:?}: {}", &args.file, error);
            return;
        }
        if let Err(error) = exporter.export(&payment) {
            eprintln!("Error writing record {}: {}", count, error);
            return;
        }
        count += 1;
    }

    if let Err(error) = exporter.finish() {
        eprintln!("Failed to finish {}: {}", output_path.display(), error);
        return;
    }

    println!("Wrote {} records to {}", count, output_path.display());
}
