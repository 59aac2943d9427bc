//! Batch trial files - two numeric columns, actual then measured
//!
//! ```text
//! actual_time;measured_time
//! 5.013;5
//! 10.021;10
//! ```

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ppmeter_core::Sample;

use crate::{SourceError, SourceResult};

/// Default column delimiter
pub const DEFAULT_DELIMITER: u8 = b';';

/// Header written by [`SampleWriter`]
pub const HEADER: [&str; 2] = ["actual_time", "measured_time"];

/// How a trial file is laid out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Skip the first row
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: DEFAULT_DELIMITER,
            has_header: true,
        }
    }
}

/// Read a trial file from disk
pub fn read_samples(path: impl AsRef<Path>, options: &CsvOptions) -> SourceResult<Vec<Sample>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let samples = read_samples_from(file, options)?;
    tracing::debug!(path = %path.display(), samples = samples.len(), "trial file loaded");
    Ok(samples)
}

/// Read samples from any reader
///
/// Only the first two columns are used; extra columns are ignored. Rows
/// are returned in file order, without reordering or deduplication.
pub fn read_samples_from<R: Read>(reader: R, options: &CsvOptions) -> SourceResult<Vec<Sample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);

        if record.len() < 2 {
            return Err(SourceError::MissingColumns {
                line,
                found: record.len(),
            });
        }

        let actual = parse_field(&record, 0, line)?;
        let measured = parse_field(&record, 1, line)?;
        samples.push(Sample::new(actual, measured));
    }
    Ok(samples)
}

fn parse_field(record: &csv::StringRecord, column: usize, line: u64) -> SourceResult<f64> {
    let value = record.get(column).unwrap_or_default();
    value.parse::<f64>().map_err(|_| SourceError::InvalidNumber {
        line,
        column: column + 1,
        value: value.to_string(),
    })
}

/// Records samples as a trial file readable by [`read_samples`]
pub struct SampleWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl SampleWriter<File> {
    /// Create (or truncate) a trial file
    pub fn create(path: impl AsRef<Path>, delimiter: u8) -> SourceResult<Self> {
        Self::new(File::create(path)?, delimiter)
    }
}

impl<W: Write> SampleWriter<W> {
    /// Wrap a writer and emit the header row
    pub fn new(inner: W, delimiter: u8) -> SourceResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(inner);
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(SampleWriter { writer })
    }

    /// Append one sample and flush, so an interrupted run keeps its data
    pub fn write(&mut self, sample: &Sample) -> SourceResult<()> {
        self.writer.write_record(&[
            sample.actual_time.to_string(),
            sample.measured_time.to_string(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> SourceResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| SourceError::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_semicolon_with_header() {
        let data = "actual;measured\n5.013;5\n10.021;10\n15.03;15\n";
        let samples = read_samples_from(data.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(
            samples,
            vec![
                Sample::new(5.013, 5.0),
                Sample::new(10.021, 10.0),
                Sample::new(15.03, 15.0),
            ]
        );
    }

    #[test]
    fn test_read_custom_delimiter_no_header() {
        let options = CsvOptions {
            delimiter: b',',
            has_header: false,
        };
        let samples = read_samples_from("1.5, 1\n2.5, 2, extra\n".as_bytes(), &options).unwrap();
        assert_eq!(samples, vec![Sample::new(1.5, 1.0), Sample::new(2.5, 2.0)]);
    }

    #[test]
    fn test_missing_column() {
        let data = "a;m\n1;1\n2\n";
        let err = read_samples_from(data.as_bytes(), &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, SourceError::MissingColumns { line: 3, found: 1 }));
    }

    #[test]
    fn test_invalid_number() {
        let data = "a;m\n1;one\n";
        let err = read_samples_from(data.as_bytes(), &CsvOptions::default()).unwrap_err();
        match err {
            SourceError::InvalidNumber { line, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(column, 2);
                assert_eq!(value, "one");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_file() {
        let samples = read_samples_from("a;m\n".as_bytes(), &CsvOptions::default()).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_writer_output_reads_back() {
        let mut writer = SampleWriter::new(Vec::new(), DEFAULT_DELIMITER).unwrap();
        writer.write(&Sample::new(1.25, 1.0)).unwrap();
        writer.write(&Sample::new(2.5, 3.0)).unwrap();
        let bytes = writer.into_inner().unwrap();

        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("actual_time;measured_time\n"));

        let samples = read_samples_from(bytes.as_slice(), &CsvOptions::default()).unwrap();
        assert_eq!(samples, vec![Sample::new(1.25, 1.0), Sample::new(2.5, 3.0)]);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_samples("/nonexistent/ppmeter/trial.csv", &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
