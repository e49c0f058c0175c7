// src/process/mod.rs
pub mod date_parser;
pub mod utils;

use tracing::debug;

use crate::dataset::VaccinationRecord;
use crate::error::Result;
use crate::schema::ColumnIndex;
use utils::{parse_count, parse_ratio, strip_cr};

/// Turn feed text into records.
///
/// Line 0 is the header; a header without one of the required columns is a
/// [`TrackerError::MissingColumn`](crate::error::TrackerError::MissingColumn).
/// Data lines are split on `,` with no quoting. A line with fewer fields
/// than the header is dropped; extra trailing fields are ignored. A numeric
/// cell that is blank or unparseable becomes `None` without affecting the
/// rest of its row. Text fields are taken as-is, empty included.
pub fn parse_records(text: &str) -> Result<Vec<VaccinationRecord>> {
    let mut lines = text.split('\n');
    let header = strip_cr(lines.next().unwrap_or_default());
    let idx = ColumnIndex::from_header(header)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for line in lines {
        let fields: Vec<&str> = strip_cr(line).split(',').collect();
        if fields.len() < idx.width {
            skipped += 1;
            continue;
        }
        records.push(record_from_fields(&idx, &fields));
    }

    debug!(parsed = records.len(), skipped, "parsed feed");
    Ok(records)
}

fn record_from_fields(idx: &ColumnIndex, fields: &[&str]) -> VaccinationRecord {
    VaccinationRecord {
        location: fields[idx.location].to_string(),
        iso_code: fields[idx.iso_code].to_string(),
        date: fields[idx.date].to_string(),
        people_vaccinated: parse_count(fields[idx.people_vaccinated]),
        people_fully_vaccinated: parse_count(fields[idx.people_fully_vaccinated]),
        people_vaccinated_per_hundred: parse_ratio(fields[idx.people_vaccinated_per_hundred]),
        people_fully_vaccinated_per_hundred: parse_ratio(
            fields[idx.people_fully_vaccinated_per_hundred],
        ),
        daily_vaccinations: parse_count(fields[idx.daily_vaccinations]),
        daily_vaccinations_per_million: parse_count(fields[idx.daily_vaccinations_per_million]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;

    const HEADER: &str = "location,iso_code,date,total_vaccinations,people_vaccinated,\
people_fully_vaccinated,daily_vaccinations_raw,daily_vaccinations,\
total_vaccinations_per_hundred,people_vaccinated_per_hundred,\
people_fully_vaccinated_per_hundred,daily_vaccinations_per_million";

    fn feed(rows: &[&str]) -> String {
        let mut s = String::from(HEADER);
        for r in rows {
            s.push('\n');
            s.push_str(r);
        }
        s.push('\n');
        s
    }

    #[test]
    fn test_parses_full_row() {
        let text = feed(&["World,OWID_WRL,2021-03-10,330000000,250000000,80000000,8000000,7500000,4.2,3.2,1.03,962"]);
        let recs = parse_records(&text).unwrap();
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert_eq!(r.location, "World");
        assert_eq!(r.iso_code, "OWID_WRL");
        assert_eq!(r.date, "2021-03-10");
        assert_eq!(r.people_vaccinated, Some(250_000_000));
        assert_eq!(r.people_fully_vaccinated, Some(80_000_000));
        assert_eq!(r.daily_vaccinations, Some(7_500_000));
        assert_eq!(r.people_vaccinated_per_hundred, Some(3.2));
        assert_eq!(r.people_fully_vaccinated_per_hundred, Some(1.03));
        assert_eq!(r.daily_vaccinations_per_million, Some(962));
    }

    #[test]
    fn test_blank_and_garbage_cells_become_none() {
        let text = feed(&["Chile,CHL,2021-03-10,,x,,,,,oops,,"]);
        let recs = parse_records(&text).unwrap();
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert_eq!(r.location, "Chile");
        assert!(r.people_vaccinated.is_none());
        assert!(r.people_fully_vaccinated.is_none());
        assert!(r.people_vaccinated_per_hundred.is_none());
        assert!(r.people_fully_vaccinated_per_hundred.is_none());
        assert!(r.daily_vaccinations.is_none());
        assert!(r.daily_vaccinations_per_million.is_none());
    }

    #[test]
    fn test_short_rows_are_dropped_long_rows_kept() {
        let text = feed(&[
            "World,OWID_WRL,2021-03-01,1,1,1,1,1,1,1,1,1",
            "World,OWID_WRL,2021-03-02,1,1",
            "World,OWID_WRL,2021-03-03,1,1,1,1,1,1,1,1,1,extra,more",
            "",
        ]);
        let recs = parse_records(&text).unwrap();
        let dates: Vec<&str> = recs.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2021-03-01", "2021-03-03"]);
    }

    #[test]
    fn test_empty_text_fields_are_accepted() {
        let text = feed(&[",,,,,,,,,,,"]);
        let recs = parse_records(&text).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].location, "");
        assert_eq!(recs[0].date, "");
    }

    #[test]
    fn test_missing_column_fails_fast() {
        let text = "location,iso_code,date,people_vaccinated\nWorld,OWID_WRL,2021-03-01,5\n";
        match parse_records(text) {
            Err(TrackerError::MissingColumn(name)) => {
                assert_eq!(name, "people_fully_vaccinated")
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_a_format_failure() {
        let err = parse_records("").unwrap_err();
        assert!(err.is_format_failure());
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        assert!(parse_records(HEADER).unwrap().is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = feed(&["World,OWID_WRL,2021-03-01,1,2,3,4,5,6,7,8,9"]).replace('\n', "\r\n");
        let recs = parse_records(&text).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].daily_vaccinations_per_million, Some(9));
    }

    #[test]
    fn test_preserves_line_order() {
        let text = feed(&[
            "B,B,2021-01-02,,,,,,,,,",
            "A,A,2021-01-01,,,,,,,,,",
            "C,C,2021-01-03,,,,,,,,,",
        ]);
        let locs: Vec<String> = parse_records(&text)
            .unwrap()
            .into_iter()
            .map(|r| r.location)
            .collect();
        assert_eq!(locs, vec!["B", "A", "C"]);
    }
}
