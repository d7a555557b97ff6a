//! CSV exports of training records and employees.
//!
//! Files are written with a standard CSV writer (non-numeric fields quoted) into the
//! configured export directory under a timestamped name. Existing files are never
//! overwritten.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::compliance::{days_until_expiry, expiry_status, ExpiryStatus};
use crate::domain::{
    string_enum, CompletionStatus, Department, Employee, EmployeeId, TrainingRecordDetail,
    TrainingTypeId,
};
use crate::store::{ComplianceStore, EmployeeFilter, RecordFilter, RepositoryError};

string_enum!(
    ExportKind, "export kind" {
        TrainingRecords => "training_records",
        Employees => "employees",
    }
);

pub const TRAINING_RECORD_HEADERS: [&str; 13] = [
    "Employee NIP",
    "Employee Name",
    "Department",
    "Training Type",
    "Category",
    "Certificate Number",
    "Issue Date",
    "Expiry Date",
    "Days Until Expiry",
    "Status",
    "Completion Status",
    "Training Provider",
    "Notes",
];

pub const EMPLOYEE_HEADERS: [&str; 9] = [
    "NIP",
    "NIK",
    "Name",
    "Email",
    "Department",
    "Unit",
    "Position",
    "Employment Status",
    "Active",
];

const MAX_NAME_SUFFIX: u32 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Narrowing applied to training-record exports.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingExportFilter {
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub training_type_id: Option<TrainingTypeId>,
    #[serde(default)]
    pub department: Option<Department>,
    /// Expiry classification on the export date.
    #[serde(default)]
    pub status: Option<ExpiryStatus>,
    #[serde(default)]
    pub completion_status: Option<CompletionStatus>,
}

/// Descriptor of a written export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFile {
    pub kind: ExportKind,
    pub relative_path: PathBuf,
    pub filename: String,
    pub rows: usize,
}

pub fn export_filename(kind: ExportKind, now: NaiveDateTime) -> String {
    format!("{}_export_{}.csv", kind.as_str(), now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Writes the header and one row per record; returns the number of data rows.
pub fn write_training_records<W: Write>(
    writer: W,
    records: &[TrainingRecordDetail],
    today: NaiveDate,
) -> Result<usize, ExportError> {
    let mut csv = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(writer);
    csv.write_record(TRAINING_RECORD_HEADERS)?;

    for detail in records {
        let record = &detail.record;
        csv.write_record([
            detail.employee.nip.clone(),
            detail.employee.name.clone(),
            detail.employee.department.to_string(),
            detail.training_type.name.clone(),
            detail.training_type.category.to_string(),
            record.certificate_number.clone().unwrap_or_default(),
            record.issue_date.format("%Y-%m-%d").to_string(),
            record.expiry_date.format("%Y-%m-%d").to_string(),
            days_until_expiry(record, today).to_string(),
            expiry_status(record, Some(&detail.training_type), today)
                .label()
                .to_string(),
            record.completion_status.to_string(),
            record.training_provider.clone().unwrap_or_default(),
            record.notes.clone().unwrap_or_default(),
        ])?;
    }

    csv.flush()?;
    Ok(records.len())
}

pub fn write_employees<W: Write>(writer: W, employees: &[Employee]) -> Result<usize, ExportError> {
    let mut csv = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(writer);
    csv.write_record(EMPLOYEE_HEADERS)?;

    for employee in employees {
        csv.write_record([
            employee.nip.as_str(),
            employee.nik.as_str(),
            employee.name.as_str(),
            employee.email.as_deref().unwrap_or_default(),
            employee.department.as_str(),
            employee.unit.as_deref().unwrap_or_default(),
            employee.position.as_deref().unwrap_or_default(),
            employee.employment_status.as_str(),
            if employee.is_active { "Yes" } else { "No" },
        ])?;
    }

    csv.flush()?;
    Ok(employees.len())
}

/// Store-backed exporter writing into one directory.
pub struct CsvExporter<S> {
    store: Arc<S>,
    directory: PathBuf,
}

impl<S> CsvExporter<S>
where
    S: ComplianceStore + 'static,
{
    pub fn new(store: Arc<S>, directory: impl Into<PathBuf>) -> Self {
        Self {
            store,
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn export_training_records(
        &self,
        filter: &TrainingExportFilter,
        now: NaiveDateTime,
    ) -> Result<ExportFile, ExportError> {
        let today = now.date();
        let records: Vec<TrainingRecordDetail> = self
            .store
            .list_training_records(&RecordFilter {
                employee_id: filter.employee_id,
                training_type_id: filter.training_type_id,
                department: filter.department,
                completion_status: filter.completion_status,
                ..RecordFilter::default()
            })?
            .into_iter()
            .filter(|detail| {
                filter.status.map_or(true, |status| {
                    expiry_status(&detail.record, Some(&detail.training_type), today) == status
                })
            })
            .collect();

        let (file, filename) = self.create_file(ExportKind::TrainingRecords, now)?;
        let rows = write_training_records(file, &records, today)?;
        Ok(self.finish(ExportKind::TrainingRecords, filename, rows))
    }

    pub fn export_employees(
        &self,
        filter: &EmployeeFilter,
        now: NaiveDateTime,
    ) -> Result<ExportFile, ExportError> {
        let employees = self.store.list_employees(filter)?;
        let (file, filename) = self.create_file(ExportKind::Employees, now)?;
        let rows = write_employees(file, &employees)?;
        Ok(self.finish(ExportKind::Employees, filename, rows))
    }

    fn create_file(&self, kind: ExportKind, now: NaiveDateTime) -> Result<(File, String), ExportError> {
        std::fs::create_dir_all(&self.directory)?;
        let base = export_filename(kind, now);
        let stem = base.trim_end_matches(".csv");

        for suffix in 0..MAX_NAME_SUFFIX {
            let filename = if suffix == 0 {
                base.clone()
            } else {
                format!("{stem}_{suffix}.csv")
            };
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.directory.join(&filename))
            {
                Ok(file) => return Ok((file, filename)),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free export filename for {base}"),
        )
        .into())
    }

    fn finish(&self, kind: ExportKind, filename: String, rows: usize) -> ExportFile {
        let relative_path = self.directory.join(&filename);
        info!(kind = %kind, path = %relative_path.display(), rows, "export written");
        ExportFile {
            kind,
            relative_path,
            filename,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{certified_record, date, employee, mandatory_type, record, store};

    fn now() -> NaiveDateTime {
        date(2025, 9, 1).and_hms_opt(14, 5, 9).expect("valid time")
    }

    #[test]
    fn filename_carries_kind_and_timestamp() {
        assert_eq!(
            export_filename(ExportKind::TrainingRecords, now()),
            "training_records_export_2025-09-01_14-05-09.csv"
        );
    }

    #[test]
    fn empty_input_writes_header_only() {
        let mut buffer = Vec::new();
        let rows = write_training_records(&mut buffer, &[], date(2025, 9, 1)).expect("written");
        assert_eq!(rows, 0);

        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("\"Employee NIP\",\"Employee Name\""));
    }

    #[test]
    fn fields_with_quotes_and_newlines_are_escaped() {
        let store = store();
        let mut sari = employee(&store, "1001", "Sari \"Ica\" Wulandari");
        sari.position = Some("Ramp Agent\nShift B".to_string());

        let mut buffer = Vec::new();
        write_employees(&mut buffer, &[sari]).expect("written");
        let text = String::from_utf8(buffer).expect("utf8");

        assert!(text.contains("\"Sari \"\"Ica\"\" Wulandari\""));
        assert!(text.contains("\"Ramp Agent\nShift B\""));
        assert!(text.contains("\n1001,"));
    }

    #[test]
    fn training_export_applies_status_filter_and_never_overwrites() {
        let store = store();
        let dir = tempfile::tempdir().expect("tempdir");
        let sari = employee(&store, "1001", "Sari Wulandari");
        let safety = mandatory_type(&store, "Aviation Safety");
        certified_record(
            &store,
            &sari,
            &safety,
            date(2024, 9, 10),
            date(2025, 9, 10),
            "GLC/AVI-000001/09/2024",
        );
        record(&store, &sari, &safety, date(2023, 1, 1), date(2025, 1, 1));

        let exporter = CsvExporter::new(store, dir.path().join("exports"));
        let expired = exporter
            .export_training_records(
                &TrainingExportFilter {
                    status: Some(ExpiryStatus::Expired),
                    ..TrainingExportFilter::default()
                },
                now(),
            )
            .expect("export written");
        assert_eq!(expired.rows, 1);
        assert_eq!(expired.filename, "training_records_export_2025-09-01_14-05-09.csv");

        let all = exporter
            .export_training_records(&TrainingExportFilter::default(), now())
            .expect("export written");
        assert_eq!(all.rows, 2);
        assert_eq!(all.filename, "training_records_export_2025-09-01_14-05-09_1.csv");

        let contents = std::fs::read_to_string(&expired.relative_path).expect("file readable");
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("\"Expired\""));
    }

    #[test]
    fn employee_export_respects_department_filter() {
        let store = store();
        let dir = tempfile::tempdir().expect("tempdir");
        employee(&store, "1001", "Sari Wulandari");

        let exporter = CsvExporter::new(store, dir.path());
        let cargo = exporter
            .export_employees(
                &EmployeeFilter {
                    department: Some(Department::Cargo),
                    ..EmployeeFilter::default()
                },
                now(),
            )
            .expect("export written");
        assert_eq!(cargo.rows, 0);
        let contents = std::fs::read_to_string(&cargo.relative_path).expect("file readable");
        assert_eq!(contents.lines().count(), 1);
    }
}
