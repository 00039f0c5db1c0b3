//! Flat CSV export/import of a note's timeline.
//!
//! The format is deliberately unsophisticated: comma-delimited, no quoting,
//! `\n` line endings, one header row. Embedded newlines and commas in free
//! text are replaced with a single space on export, which is lossy; this is
//! a documented property of the format, kept for compatibility with
//! previously exported files, not a bug to fix.

use std::fmt;
use std::io::BufRead;

use chrono::{NaiveDateTime, TimeZone};
use thiserror::Error;

use crate::stamp::{StampKind, StampRecord};

/// Header row of the exchange format.
pub const CSV_HEADER: &str = "date,kind,note,operator";

/// Date format of the `date` column, in local time.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CSV exchange errors.
///
/// Malformed rows are never errors; they are skipped silently and excluded
/// from the import count. Only an unreadable input or one with no data rows
/// at all is a hard failure.
#[derive(Debug, Error)]
pub enum CsvError {
    /// The input could not be read.
    #[error("failed to read CSV input")]
    Io(#[from] std::io::Error),
    /// The input was empty after removing the header.
    #[error("file is empty or contains no data rows")]
    Empty,
}

/// Serializes stamps to CSV, one row per stamp in the given order.
///
/// Rows carry the kind's display label (not its stable identifier) and the
/// stamp's local wall-clock time.
pub fn export_csv<Tz: TimeZone>(stamps: &[StampRecord], tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + stamps.len() * 40);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for stamp in stamps {
        let Some(local) = tz.timestamp_millis_opt(stamp.timestamp).single() else {
            tracing::debug!(
                timestamp = stamp.timestamp,
                "timestamp outside calendar range, skipping row"
            );
            continue;
        };
        let date = local.format(DATE_FORMAT);
        let kind = stamp.kind.label();
        let note = sanitize_field(&stamp.note);
        let operator = sanitize_field(stamp.operator.as_deref().unwrap_or(""));
        out.push_str(&format!("{date},{kind},{note},{operator}\n"));
    }
    out
}

/// Parses CSV back into a batch of unattributed stamps.
///
/// The header line is discarded. Each remaining line is split on `,` into at
/// most four fields; rows whose kind label matches no known kind, or whose
/// date fails to parse, are skipped and do not count toward the result. The
/// operator column is dropped: imported stamps are always unattributed.
pub fn parse_csv<R: BufRead, Tz: TimeZone>(reader: R, tz: &Tz) -> Result<Vec<StampRecord>, CsvError> {
    let mut lines = reader.lines();
    match lines.next() {
        Some(header) => drop(header?),
        None => return Err(CsvError::Empty),
    }

    let mut stamps = Vec::new();
    let mut data_lines = 0usize;
    for (line_num, line) in lines.enumerate() {
        let line = line?;
        data_lines += 1;

        let mut parts = line.splitn(4, ',');
        let date = parts.next().unwrap_or("");
        let Some(label) = parts.next() else {
            tracing::debug!(line = line_num + 2, "row has no kind column, skipping");
            continue;
        };
        let note = parts.next().unwrap_or("");
        // Fourth field is the operator; attribution is not re-imported.

        let Some(kind) = StampKind::from_label(label) else {
            tracing::debug!(line = line_num + 2, label, "unknown kind label, skipping");
            continue;
        };
        let Ok(naive) = NaiveDateTime::parse_from_str(date, DATE_FORMAT) else {
            tracing::debug!(line = line_num + 2, date, "unparseable date, skipping");
            continue;
        };
        let Some(local) = tz.from_local_datetime(&naive).earliest() else {
            tracing::debug!(line = line_num + 2, date, "date not representable, skipping");
            continue;
        };

        stamps.push(StampRecord::new(
            local.timestamp_millis(),
            kind,
            note.to_string(),
        ));
    }

    if data_lines == 0 {
        return Err(CsvError::Empty);
    }
    Ok(stamps)
}

fn sanitize_field(text: &str) -> String {
    text.replace('\n', " ").replace(',', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::Cursor;

    fn stamp(timestamp: i64, kind: StampKind, note: &str, operator: Option<&str>) -> StampRecord {
        StampRecord {
            timestamp,
            kind,
            note: note.to_string(),
            operator: operator.map(str::to_string),
        }
    }

    #[test]
    fn export_produces_header_and_rows() {
        let ts = Utc
            .with_ymd_and_hms(2024, 3, 5, 7, 30, 15)
            .unwrap()
            .timestamp_millis();
        let stamps = vec![stamp(ts, StampKind::WakeUp, "すっきり", Some("はは"))];

        let csv = export_csv(&stamps, &Utc);
        assert_eq!(
            csv,
            "date,kind,note,operator\n2024-03-05 07:30:15,おきる,すっきり,はは\n"
        );
    }

    #[test]
    fn export_flattens_newlines_and_commas() {
        let ts = Utc
            .with_ymd_and_hms(2024, 3, 5, 7, 0, 0)
            .unwrap()
            .timestamp_millis();
        let stamps = vec![stamp(ts, StampKind::Memo, "one,two\nthree", None)];

        let csv = export_csv(&stamps, &Utc);
        assert!(csv.ends_with("メモ,one two three,\n"));
    }

    #[test]
    fn round_trip_drops_operator() {
        let ts = Utc
            .with_ymd_and_hms(2024, 3, 5, 22, 0, 0)
            .unwrap()
            .timestamp_millis();
        let stamps = vec![
            stamp(ts, StampKind::Sleep, "", Some("ちち")),
            stamp(ts + 60_000, StampKind::Medication, "2ml", None),
        ];

        let csv = export_csv(&stamps, &Utc);
        let imported = parse_csv(Cursor::new(csv), &Utc).unwrap();

        assert_eq!(imported.len(), 2);
        for (original, parsed) in stamps.iter().zip(&imported) {
            assert_eq!(parsed.timestamp, original.timestamp);
            assert_eq!(parsed.kind, original.kind);
            assert_eq!(parsed.note, original.note);
            assert_eq!(parsed.operator, None);
        }
    }

    #[test]
    fn unknown_labels_and_bad_dates_are_skipped() {
        let input = "date,kind,note,operator\n\
                     2024-03-05 07:00:00,おきる,,\n\
                     2024-03-05 08:00:00,unknown,,\n\
                     not-a-date,おきる,,\n";
        let imported = parse_csv(Cursor::new(input), &Utc).unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].kind, StampKind::WakeUp);
    }

    #[test]
    fn short_rows_parse_without_note_or_operator() {
        let input = "date,kind,note,operator\n2024-03-05 07:00:00,おきる\n";
        let imported = parse_csv(Cursor::new(input), &Utc).unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].note, "");
    }

    #[test]
    fn empty_input_is_a_hard_failure() {
        let err = parse_csv(Cursor::new(""), &Utc).unwrap_err();
        assert!(matches!(err, CsvError::Empty));
    }

    #[test]
    fn header_only_input_is_a_hard_failure() {
        let err = parse_csv(Cursor::new("date,kind,note,operator\n"), &Utc).unwrap_err();
        assert!(matches!(err, CsvError::Empty));
    }
}
