use chrono::NaiveDate;
use serde::Serialize;

use crate::compliance::{days_until_expiry, expiry_status, is_valid, ExpiryStatus};
use crate::error::ServiceError;
use crate::store::TrainingRecordRepository;

/// Public answer for a certificate lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateVerification {
    pub certificate_number: String,
    pub valid: bool,
    pub employee_name: String,
    pub training_type: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: ExpiryStatus,
    pub status_label: &'static str,
    pub days_until_expiry: i64,
}

pub fn verify_certificate<S>(
    store: &S,
    certificate_number: &str,
    today: NaiveDate,
) -> Result<CertificateVerification, ServiceError>
where
    S: TrainingRecordRepository + ?Sized,
{
    let number = certificate_number.trim();
    if number.is_empty() {
        return Err(ServiceError::validation(
            "certificate_number",
            "must not be empty",
        ));
    }

    let detail = store
        .fetch_by_certificate_number(number)?
        .ok_or_else(|| ServiceError::not_found("certificate", number))?;
    let status = expiry_status(&detail.record, Some(&detail.training_type), today);

    Ok(CertificateVerification {
        certificate_number: number.to_string(),
        valid: is_valid(&detail.record, today),
        employee_name: detail.employee.name,
        training_type: detail.training_type.name,
        issue_date: detail.record.issue_date,
        expiry_date: detail.record.expiry_date,
        status,
        status_label: status.label(),
        days_until_expiry: days_until_expiry(&detail.record, today),
    })
}
