// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  fwdump.rs - Record dump demo for fixed-width payment batch files.
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

use chrono::NaiveDate;
use clap::Parser;
use rust_decimal::Decimal;

use fixedwidth::impl_record;
use fixedwidth::io::RecordReader;
use fixedwidth::record::{CodecOptions, RecordCodec, ShortLinePolicy};
use fixedwidth::spec::{FieldDecl, FieldDefaults, Kind, PadPosition};

/// Batch header: `H`, batch number, creation date.
#[derive(Debug, Default)]
struct BatchHeader {
    tag: String,
    batch: u32,
    created: NaiveDate,
}

impl_record!(BatchHeader {
    defaults: FieldDefaults::new().length(15),
    fields: {
        tag => FieldDecl::new(1).length(1).kind(Kind::String).pad(' ', PadPosition::Right),
        batch => FieldDecl::new(2).length(6).kind(Kind::Integer).pad('0', PadPosition::Left),
        created => FieldDecl::new(8)
            .length(8)
            .kind(Kind::Date)
            .format("%Y%m%d")
            .pad(' ', PadPosition::Right),
    }
});

/// Payment detail: `D`, account, payee, amount.
#[derive(Debug, Default)]
struct Payment {
    tag: String,
    account: u32,
    payee: String,
    amount: Decimal,
}

impl_record!(Payment {
    defaults: FieldDefaults::new().kind(Kind::String).pad(' ', PadPosition::Right),
    fields: {
        tag => FieldDecl::new(1).length(1),
        account => FieldDecl::new(2).length(8).kind(Kind::Integer).pad('0', PadPosition::Left),
        payee => FieldDecl::new(10).length(20),
        amount => FieldDecl::new(30)
            .length(12)
            .kind(Kind::Decimal)
            .format("%.2f")
            .pad(' ', PadPosition::Left),
    }
});

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to read.
    file: String,

    /// Fail on lines shorter than their record layout.
    #[arg(long)]
    strict: bool,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let codec = RecordCodec::with_options(CodecOptions {
        short_lines: if args.strict {
            ShortLinePolicy::Strict
        } else {
            ShortLinePolicy::Lenient
        },
    });

    let mut reader = match RecordReader::open(&args.file) {
        Ok(r) => r,
        Err(error) => {
            eprintln!("Error opening file {:?}: {:?}", &args.file, error);
            return;
        }
    };

    while let Some(tag) = reader.record_identifier(1, 1) {
        let result = match tag {
            "H" => {
                let mut header = BatchHeader::default();
                reader
                    .read_record(&codec, &mut header)
                    .map(|_| println!("{:?}", header))
            }
            "D" => {
                let mut payment = Payment::default();
                reader
                    .read_record(&codec, &mut payment)
                    .map(|_| println!("{:?}", payment))
            }
            other => {
                eprintln!(
                    "Skipping record {} with unknown type {:?}",
                    reader.index(),
                    other
                );
                reader.advance()
            }
        };

        if let Err(error) = result {
            eprintln!("Error reading file {:?}: {}", &args.file, error);
            return;
        }
    }

    if codec.short_reads() > 0 {
        eprintln!("{} fields were read from short lines", codec.short_reads());
    }
}
