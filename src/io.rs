// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/io.rs - Line-oriented readers and writers for fixed-width files.
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
 * # `io` Module
 *
 * [RecordReader] walks a file one line at a time and decodes the current line
 * into a record; [RecordWriter] encodes records and writes them one per line.
 * Files whose names end in `.gz` are transparently (de)compressed.
 *
 * ## Usage Example
 *
 * ```no_run
 * use fixedwidth::impl_record;
 * use fixedwidth::io::RecordReader;
 * use fixedwidth::record::RecordCodec;
 * use fixedwidth::spec::{FieldDecl, Kind, PadPosition};
 *
 * #[derive(Debug, Default)]
 * struct Header {
 *     tag: String,
 *     batch: u32,
 * }
 *
 * impl_record!(Header {
 *     fields: {
 *         tag => FieldDecl::new(1).length(1).kind(Kind::String).pad(' ', PadPosition::Right),
 *         batch => FieldDecl::new(2).length(6).kind(Kind::Integer).pad('0', PadPosition::Left),
 *     }
 * });
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let codec = RecordCodec::new();
 *     let mut reader = RecordReader::open("batch.txt")?;
 *
 *     while let Some(tag) = reader.record_identifier(1, 1) {
 *         if tag == "H" {
 *             let mut header = Header::default();
 *             reader.read_record(&codec, &mut header)?;
 *             println!("Batch: {}", header.batch);
 *         } else {
 *             reader.advance()?;
 *         }
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::error::{Error, Result};
use crate::record::{self, Record, RecordCodec};

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Reads fixed-width records one line at a time.
#[derive(Debug)]
pub struct RecordReader<B> {
    source: B,
    current: Option<String>,
    index: usize,
}

impl RecordReader<Box<dyn BufRead>> {
    /// Opens a file for reading, decompressing it if the name ends in `.gz`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let source: Box<dyn BufRead> = if is_gzip(path) {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Self::new(source)
    }
}

impl<B: BufRead> RecordReader<B> {
    /// Creates a reader positioned on the first line of `source`.
    pub fn new(source: B) -> Result<Self> {
        let mut reader = Self {
            source,
            current: None,
            index: 0,
        };
        reader.current = reader.next_line()?;
        Ok(reader)
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .source
            .read_line(&mut line)
            .map_err(|e| Error::from(e).at_record(self.index))?;
        if read == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// The current line without its terminator, or `None` at end of input.
    pub fn current_line(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// 0-based index of the current line.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    /// Moves to the next line. Does nothing at end of input.
    pub fn advance(&mut self) -> Result<()> {
        if self.current.is_some() {
            self.index += 1;
            self.current = self.next_line()?;
        }
        Ok(())
    }

    /// Returns part of the current line, as [record::record_identifier].
    pub fn record_identifier(&self, start: usize, length: usize) -> Option<&str> {
        record::record_identifier(self.current.as_deref()?, start, length)
    }

    /// Decodes the current line into `record` without moving to the next line.
    pub fn decode_current<R: Record>(&self, codec: &RecordCodec, record: &mut R) -> Result<()> {
        let line = self.current.as_deref().ok_or_else(|| {
            Error::Usage(format!("no record to read after {} lines", self.index))
        })?;
        codec
            .decode(line, record)
            .map_err(|e| e.at_record(self.index))?;
        Ok(())
    }

    /// Decodes the current line into `record` and moves to the next line.
    pub fn read_record<R: Record>(&mut self, codec: &RecordCodec, record: &mut R) -> Result<()> {
        self.decode_current(codec, record)?;
        self.advance()
    }

    /// Decodes every remaining line as an `R`.
    pub fn read_all<R: Record + Default>(&mut self, codec: &RecordCodec) -> Result<Vec<R>> {
        let mut records = Vec::new();
        while !self.is_exhausted() {
            let mut record = R::default();
            self.read_record(codec, &mut record)?;
            records.push(record);
        }
        Ok(records)
    }
}

/// The terminator written after each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Writes fixed-width records one per line.
pub struct RecordWriter<W: Write> {
    sink: W,
    line_ending: LineEnding,
    written: usize,
}

impl RecordWriter<FileSink> {
    /// Creates (or truncates) a file for writing, compressing it if the name
    /// ends in `.gz`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = BufWriter::new(File::create(path)?);
        let sink = if is_gzip(path) {
            FileSink::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            FileSink::Plain(file)
        };
        Ok(Self::new(sink))
    }

    /// Flushes all records and finishes the file.
    pub fn close(self) -> Result<()> {
        self.finish()?.close()
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            line_ending: LineEnding::default(),
            written: 0,
        }
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Encodes `record` and writes it as one line. Nothing is written if
    /// encoding fails.
    pub fn write_record<R: Record>(&mut self, codec: &RecordCodec, record: &R) -> Result<()> {
        let mut line = codec
            .encode(record)
            .map_err(|e| e.at_record(self.written))?;
        line.push_str(self.line_ending.as_str());
        self.sink
            .write_all(line.as_bytes())
            .map_err(|e| Error::from(e).at_record(self.written))?;
        self.written += 1;
        Ok(())
    }

    /// Flushes the sink and returns it.
    pub fn finish(mut self) -> Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// A file opened by [RecordWriter::create].
pub enum FileSink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl FileSink {
    /// Writes any pending data, including the gzip trailer.
    pub fn close(self) -> Result<()> {
        let mut file = match self {
            FileSink::Plain(file) => file,
            FileSink::Gzip(encoder) => encoder.finish()?,
        };
        file.flush()?;
        Ok(())
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            FileSink::Plain(file) => file.write(buf),
            FileSink::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            FileSink::Plain(file) => file.flush(),
            FileSink::Gzip(encoder) => encoder.flush(),
        }
    }
}
