//! Bulk import of bills from CSV.
//!
//! Rows are `description,amount,due_date,payment_date` with no header and
//! `YYYY-MM-DD` dates. A field that fails to parse degrades to a sentinel
//! (amount) or an absent date and is logged; the row is stored anyway.
//! Rows are stored one by one with no transaction spanning the file.
//! Bytes that are not valid UTF-8 (Latin-1 exports) decode to U+FFFD.

use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ByteRecord, StringRecord};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use super::domain::NewBill;
use super::repository::BillRepository;
use crate::errors::ServiceError;

/// Stored in place of an amount that could not be parsed: the smallest
/// positive decimal, so the row still satisfies `amount > 0`.
pub const AMOUNT_SENTINEL: Decimal = Decimal::from_parts(1, 0, 0, false, 28);

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub warnings: usize,
}

/// One CSV record turned into a bill, with the field problems found on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub bill: NewBill,
    pub warnings: Vec<String>,
}

fn parse_date(raw: &str, field: &str, warnings: &mut Vec<String>) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(d) => Some(d),
        Err(e) => {
            warnings.push(format!("invalid {field} {raw:?}: {e}"));
            None
        }
    }
}

/// Decode every field, replacing invalid UTF-8; one warning per lossy field.
pub fn decode_record(record: &ByteRecord) -> (StringRecord, Vec<String>) {
    let mut warnings = Vec::new();
    let mut decoded = StringRecord::with_capacity(record.as_slice().len(), record.len());
    for (i, raw) in record.iter().enumerate() {
        let field = String::from_utf8_lossy(raw);
        if std::str::from_utf8(raw).is_err() {
            warnings.push(format!("column {} is not valid UTF-8; decoded as {:?}", i + 1, field));
        }
        decoded.push_field(&field);
    }
    (decoded, warnings)
}

/// Parse one record. Never fails; see the module docs for the degradation rules.
pub fn parse_record(record: &StringRecord) -> ParsedRow {
    let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");
    let mut warnings = Vec::new();

    let amount = match Decimal::from_str(field(1)) {
        Ok(a) => a,
        Err(e) => {
            warnings.push(format!("invalid amount {:?}: {e}", field(1)));
            AMOUNT_SENTINEL
        }
    };
    let due_date = parse_date(field(2), "due date", &mut warnings);
    let payment_date = match field(3) {
        "" => None,
        raw => parse_date(raw, "payment date", &mut warnings),
    };

    ParsedRow {
        bill: NewBill { due_date, payment_date, amount, description: field(0).to_string() },
        warnings,
    }
}

/// Read every record from `data` and store it through `repo`.
///
/// An I/O failure of the reader ends the import early (rows before it stay
/// stored); a repository failure aborts with the error.
pub async fn import<R>(repo: &R, data: &[u8], today: NaiveDate) -> Result<ImportReport, ServiceError>
where
    R: BillRepository + ?Sized,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut report = ImportReport::default();
    for (idx, result) in rdr.byte_records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, imported = report.imported, "csv_read_failed");
                break;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);
        let (decoded, mut warnings) = decode_record(&record);
        let mut parsed = parse_record(&decoded);
        warnings.append(&mut parsed.warnings);
        parsed.warnings = warnings;
        for w in &parsed.warnings {
            warn!(line, warning = %w, "csv_field_degraded");
        }
        report.warnings += parsed.warnings.len();

        let bill = repo.insert(parsed.bill.into_fields(today)).await?;
        debug!(id = bill.id, line, status = ?bill.status, "csv_row_saved");
        report.imported += 1;
    }

    info!(imported = report.imported, warnings = report.warnings, "csv_import_finished");
    Ok(report)
}
