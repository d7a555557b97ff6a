use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use training_compliance::certificates::{
    verify_certificate, BulkCertificateGenerator, CertificateSelection,
};
use training_compliance::compliance::{ComplianceReporter, ExpiryStatus};
use training_compliance::domain::{
    ComplianceLevel, Department, EmploymentStatus, NewEmployee, NewTrainingRecord,
    NewTrainingType, TrainingCategory,
};
use training_compliance::export::{CsvExporter, TrainingExportFilter};
use training_compliance::registry::{EmployeeRegistry, TrainingCatalog, TrainingRecordService};
use training_compliance::store::SqliteStore;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn at(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, 0, 0).expect("valid time")
}

#[test]
fn records_are_certified_verified_and_exported() {
    let workdir = tempfile::tempdir().expect("temp dir");
    let store =
        Arc::new(SqliteStore::open(&workdir.path().join("training.db")).expect("store opens"));

    let employees = EmployeeRegistry::new(store.clone());
    let catalog = TrainingCatalog::new(store.clone());
    let records = TrainingRecordService::new(store.clone());

    let sari = employees
        .register(NewEmployee::new(
            "1001",
            "Sari Wulandari",
            Department::Ramp,
            EmploymentStatus::Permanent,
        ))
        .expect("employee registered");
    let safety = catalog
        .create(
            NewTrainingType::new(
                "Aviation Safety",
                TrainingCategory::Safety,
                24,
                ComplianceLevel::Critical,
            )
            .mandatory(),
        )
        .expect("type created");
    let recorded = records
        .record(NewTrainingRecord::new(sari.id, safety.id, date(2025, 8, 4)))
        .expect("record created");
    assert_eq!(recorded.expiry_date, date(2027, 8, 4));

    let generator = BulkCertificateGenerator::new(store.clone(), 10);
    let report = generator
        .run(&CertificateSelection {
            missing_only: true,
            ..CertificateSelection::default()
        })
        .expect("bulk run");
    assert!(report.is_success());
    assert_eq!(report.issued.len(), 1);
    let number = report.issued[0].certificate_number.clone();
    assert_eq!(number, "GLC/AVI-000001/08/2025");

    let today = date(2025, 9, 1);
    let verification = verify_certificate(store.as_ref(), &number, today).expect("verified");
    assert!(verification.valid);
    assert_eq!(verification.status, ExpiryStatus::Valid);
    assert_eq!(verification.employee_name, "Sari Wulandari");

    let compliance = ComplianceReporter::new(store.clone())
        .employee_compliance(sari.id, today)
        .expect("compliance");
    assert!(compliance.is_compliant());

    let exporter = CsvExporter::new(store.clone(), workdir.path().join("exports"));
    let file = exporter
        .export_training_records(&TrainingExportFilter::default(), at(today, 9))
        .expect("export written");
    assert_eq!(file.rows, 1);
    let text = std::fs::read_to_string(exporter.directory().join(&file.filename))
        .expect("export readable");
    assert!(text.contains(&number));
}

#[test]
fn data_survives_reopening_the_database() {
    let workdir = tempfile::tempdir().expect("temp dir");
    let path = workdir.path().join("nested").join("training.db");

    let sari_id = {
        let store = Arc::new(SqliteStore::open(&path).expect("store opens"));
        EmployeeRegistry::new(store)
            .register(NewEmployee::new(
                "1001",
                "Sari Wulandari",
                Department::Ramp,
                EmploymentStatus::Permanent,
            ))
            .expect("employee registered")
            .id
    };

    let reopened = Arc::new(SqliteStore::open(&path).expect("store reopens"));
    let sari = EmployeeRegistry::new(reopened)
        .find_by_nip("1001")
        .expect("employee persisted");
    assert_eq!(sari.id, sari_id);
    assert_eq!(sari.nik, "AUTO-1001");
}
