//! Training-compliance administration for airport ground-services staff.
//!
//! The crate covers the certificate lifecycle: expiry and compliance rules, certificate
//! numbering and bulk issuing, expiry/compliance notifications, and CSV export, on top
//! of a SQLite entity store.

pub mod certificates;
pub mod compliance;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod notifications;
pub mod registry;
pub mod router;
pub mod store;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;
