use crate::infra::{bootstrap, open_store, parse_date, parse_expiry_status, TracingNotificationSink};
use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use training_compliance::certificates::{
    verify_certificate, BulkCertificateGenerator, BulkCertificateReport, CertificateSelection,
};
use training_compliance::compliance::ExpiryStatus;
use training_compliance::domain::{
    CompletionStatus, Department, EmployeeId, TrainingRecordId, TrainingTypeId,
};
use training_compliance::error::AppError;
use training_compliance::export::{CsvExporter, ExportFile, TrainingExportFilter};
use training_compliance::notifications::{
    NotificationCategory, NotificationRequest, NotificationRunReport, NotificationRunner,
};
use training_compliance::store::EmployeeFilter;

#[derive(Args, Debug)]
pub(crate) struct NotifyArgs {
    /// Which notifications to send: all, expiry, compliance or digest
    #[arg(long, default_value = "all")]
    pub(crate) category: NotificationCategory,
    /// Expiry lookahead in days (defaults to APP_NOTIFY_LOOKAHEAD_DAYS)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) days: Option<u32>,
    /// Send even if the category already ran in its current slot
    #[arg(long)]
    pub(crate) force: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct GenerateArgs {
    /// Only records without a certificate number
    #[arg(long)]
    pub(crate) missing_only: bool,
    /// Restrict to one employee id
    #[arg(long)]
    pub(crate) employee: Option<i64>,
    /// Restrict to one training type id
    #[arg(long)]
    pub(crate) training_type: Option<i64>,
    /// Records per batch (defaults to APP_CERTIFICATE_BATCH_SIZE)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) batch_size: Option<u64>,
    /// Explicit training record ids; overrides the filters
    pub(crate) ids: Vec<i64>,
}

#[derive(Args, Debug)]
pub(crate) struct VerifyArgs {
    /// Certificate number, e.g. GLC/AVI-000001/08/2025
    pub(crate) number: String,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct TrainingExportArgs {
    #[arg(long)]
    pub(crate) employee: Option<i64>,
    #[arg(long)]
    pub(crate) training_type: Option<i64>,
    #[arg(long)]
    pub(crate) department: Option<Department>,
    /// expired, expiring_soon or valid
    #[arg(long, value_parser = parse_expiry_status)]
    pub(crate) status: Option<ExpiryStatus>,
    #[arg(long)]
    pub(crate) completion_status: Option<CompletionStatus>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct EmployeeExportArgs {
    #[arg(long)]
    pub(crate) department: Option<Department>,
    /// Include inactive and removed employees
    #[arg(long)]
    pub(crate) include_inactive: bool,
}

pub(crate) fn run_notify(args: NotifyArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let store = open_store(&config.database)?;
    let runner = NotificationRunner::new(store, Arc::new(TracingNotificationSink));

    let request = NotificationRequest {
        category: args.category,
        days: args.days.unwrap_or(config.notifications.lookahead_days),
        force: args.force,
        now: Local::now().naive_local(),
    };
    let report = runner.run(&request)?;
    render_notification_report(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(AppError::BatchFailed {
            failed: report.errors,
            total: report.delivered + report.errors,
        })
    }
}

pub(crate) fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let store = open_store(&config.database)?;
    let batch_size = args
        .batch_size
        .map_or(config.certificates.batch_size, |size| size as usize);
    let generator = BulkCertificateGenerator::new(store, batch_size);

    let selection = selection_from_args(&args);
    let report = generator.run(&selection)?;
    render_bulk_report(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(AppError::BatchFailed {
            failed: report.failed,
            total: report.total,
        })
    }
}

pub(crate) fn run_verify(args: VerifyArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let store = open_store(&config.database)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let verification = verify_certificate(store.as_ref(), &args.number, today)?;
    print_json("Certificate", &verification);
    Ok(())
}

pub(crate) fn run_training_export(args: TrainingExportArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let store = open_store(&config.database)?;
    let exporter = CsvExporter::new(store, config.export.directory.clone());

    let filter = TrainingExportFilter {
        employee_id: args.employee.map(EmployeeId),
        training_type_id: args.training_type.map(TrainingTypeId),
        department: args.department,
        status: args.status,
        completion_status: args.completion_status,
    };
    let file = exporter.export_training_records(&filter, Local::now().naive_local())?;
    render_export(&exporter, &file);
    Ok(())
}

pub(crate) fn run_employee_export(args: EmployeeExportArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let store = open_store(&config.database)?;
    let exporter = CsvExporter::new(store, config.export.directory.clone());

    let filter = EmployeeFilter {
        department: args.department,
        include_inactive: args.include_inactive,
        include_deleted: args.include_inactive,
        ..EmployeeFilter::default()
    };
    let file = exporter.export_employees(&filter, Local::now().naive_local())?;
    render_export(&exporter, &file);
    Ok(())
}

fn selection_from_args(args: &GenerateArgs) -> CertificateSelection {
    CertificateSelection {
        ids: args.ids.iter().copied().map(TrainingRecordId).collect(),
        missing_only: args.missing_only,
        employee_id: args.employee.map(EmployeeId),
        training_type_id: args.training_type.map(TrainingTypeId),
    }
}

fn render_notification_report(report: &NotificationRunReport) {
    println!(
        "Notification run ({}{})",
        report.category,
        if report.forced { ", forced" } else { "" }
    );
    if let Some(expiry) = &report.expiry {
        println!(
            "- expiry: {} records | {} sent | {} employees | {} errors",
            expiry.records_found,
            expiry.notifications_sent,
            expiry.employees_notified,
            expiry.errors
        );
    }
    if let Some(compliance) = &report.compliance {
        println!(
            "- compliance: {} non-compliant | {} reminders | {} errors",
            compliance.non_compliant_employees, compliance.reminders_sent, compliance.errors
        );
    }
    if let Some(digest) = &report.digest {
        println!(
            "- digest: {} recipients | {} sent | {} errors",
            digest.recipients, digest.digests_sent, digest.errors
        );
    }
    for category in &report.skipped {
        println!("- {category}: not due");
    }
}

fn render_bulk_report(report: &BulkCertificateReport) {
    println!(
        "Certificates: {} total | {} successful | {} failed",
        report.total, report.successful, report.failed
    );
    for issued in &report.issued {
        println!(
            "  - record {} -> {}",
            issued.training_record_id, issued.certificate_number
        );
    }
    if !report.errors.is_empty() {
        println!("Errors:");
        for error in &report.errors {
            println!("  - {error}");
        }
    }
}

fn render_export<S>(exporter: &CsvExporter<S>, file: &ExportFile)
where
    S: training_compliance::store::ComplianceStore + 'static,
{
    info!(kind = %file.kind, rows = file.rows, "export written");
    println!(
        "Exported {} rows to {}",
        file.rows,
        exporter.directory().join(&file.filename).display()
    );
}

fn print_json<T: Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("{label} payload unavailable: {err}"),
    }
}
