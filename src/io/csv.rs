use csv::{ReaderBuilder, Writer};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::na::NA;
use crate::stats::check_aligned;
use crate::temporal::{Temporal, TimeSeries};

/// Cell contents read as a missing value
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Read one value column of a CSV file, indexed by a timestamp column.
pub fn read_csv<T: Temporal, P: AsRef<Path>>(
    path: P,
    time_column: &str,
    value_column: &str,
) -> Result<TimeSeries<T>> {
    let path = path.as_ref();
    log::debug!("reading {} from {}", value_column, path.display());
    let file = File::open(path)?;
    read_csv_from(file, time_column, value_column)
}

/// Same as [`read_csv`] for any reader
pub fn read_csv_from<T: Temporal, R: Read>(
    reader: R,
    time_column: &str,
    value_column: &str,
) -> Result<TimeSeries<T>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    };
    let time_idx = column(time_column)?;
    let value_idx = column(value_column)?;

    let mut timestamps = Vec::new();
    let mut values = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        // header is line 1
        let line = row + 2;

        let raw_time = record.get(time_idx).unwrap_or_default();
        let timestamp = T::parse_timestamp(raw_time)
            .map_err(|e| Error::Format(format!("line {}: {}", line, e)))?;

        let raw_value = record.get(value_idx).unwrap_or_default();
        let value = if MISSING_TOKENS.contains(&raw_value) {
            NA::NA
        } else {
            NA::Value(raw_value.parse::<f64>().map_err(|e| {
                Error::Format(format!("line {}: cannot parse {:?}: {}", line, raw_value, e))
            })?)
        };

        timestamps.push(timestamp);
        values.push(value);
    }

    TimeSeries::new(values, timestamps, Some(value_column.to_string()))
}

/// Write aligned series side by side: a `timestamp` column followed by one
/// column per series. Missing values are written as `NA`.
pub fn write_csv<T: Temporal, P: AsRef<Path>>(path: P, series: &[&TimeSeries<T>]) -> Result<()> {
    let path = path.as_ref();
    log::debug!("writing {} series to {}", series.len(), path.display());
    let file = File::create(path)?;
    write_csv_to(file, series)
}

/// Same as [`write_csv`] for any writer
pub fn write_csv_to<T: Temporal, W: Write>(writer: W, series: &[&TimeSeries<T>]) -> Result<()> {
    let first = series
        .first()
        .ok_or_else(|| Error::EmptyData("no series to write".to_string()))?;
    for other in &series[1..] {
        check_aligned(first, other)?;
    }

    let mut wtr = Writer::from_writer(writer);

    let mut header = vec!["timestamp".to_string()];
    header.extend(series.iter().enumerate().map(|(i, s)| match s.name() {
        Some(name) => name.to_string(),
        None => format!("series_{}", i),
    }));
    wtr.write_record(&header)?;

    for (row, timestamp) in first.timestamps().iter().enumerate() {
        let mut record = Vec::with_capacity(series.len() + 1);
        record.push(timestamp.format_timestamp());
        record.extend(series.iter().map(|s| s.values()[row].to_string()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
