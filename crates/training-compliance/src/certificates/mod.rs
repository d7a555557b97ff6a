//! Certificate numbering, bulk issuing and public verification.

mod bulk;
mod number;
mod verify;

pub use bulk::{
    BulkCertificateGenerator, BulkCertificateReport, CertificateIssuer, CertificateOutcome,
    CertificateSelection, IssuedCertificate,
};
pub use number::{certificate_prefix, format_certificate_number, CERTIFICATE_ISSUER};
pub use verify::{verify_certificate, CertificateVerification};
