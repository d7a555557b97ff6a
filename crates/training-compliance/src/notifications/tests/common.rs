use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{Employee, TrainingType, UserRole};
use crate::notifications::{DeliveryError, Notification, NotificationSink};
use crate::store::{EmployeeRepository, SqliteStore, UserRepository};
use crate::testing::{certified_record, date, employee, mandatory_type, record, store};

#[derive(Default, Clone)]
pub(super) struct MemorySink {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("sink mutex poisoned").clone()
    }
}

impl NotificationSink for MemorySink {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        self.events
            .lock()
            .expect("sink mutex poisoned")
            .push(notification.clone());
        Ok(())
    }
}

/// Rejects every notification addressed to `blocked`.
pub(super) struct BlockingSink {
    pub(super) blocked: String,
    pub(super) inner: MemorySink,
}

impl NotificationSink for BlockingSink {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        if notification.recipient() == Some(self.blocked.as_str()) {
            return Err(DeliveryError(format!("mailbox {} unavailable", self.blocked)));
        }
        self.inner.deliver(notification)
    }
}

pub(super) fn today() -> NaiveDate {
    date(2025, 9, 1)
}

pub(super) fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0).expect("valid time")
}

pub(super) struct Scenario {
    pub(super) store: Arc<SqliteStore>,
    pub(super) sari: Employee,
    pub(super) budi: Employee,
    pub(super) safety: TrainingType,
}

fn with_email(store: &SqliteStore, mut employee: Employee, email: &str) -> Employee {
    employee.email = Some(email.to_string());
    store.update_employee(&employee).expect("employee updated");
    employee
}

/// Two employees and two mandatory types:
/// Sari is compliant; one of her certificates expires today and two more within 30 days,
/// Budi's safety certificate lapsed last month.
pub(super) fn scenario() -> Scenario {
    let store = store();
    let sari = employee(&store, "1001", "Sari Wulandari");
    let sari = with_email(&store, sari, "sari@example.com");
    let budi = employee(&store, "1002", "Budi Santoso");
    let budi = with_email(&store, budi, "budi@example.com");
    let safety = mandatory_type(&store, "Aviation Safety");
    let security = mandatory_type(&store, "Security Awareness");

    certified_record(
        &store,
        &sari,
        &safety,
        date(2023, 9, 1),
        today(),
        "GLC/AVI-000001/09/2023",
    );
    certified_record(
        &store,
        &sari,
        &safety,
        date(2023, 9, 20),
        date(2025, 9, 20),
        "GLC/AVI-000002/09/2023",
    );
    certified_record(
        &store,
        &sari,
        &security,
        date(2024, 9, 30),
        date(2025, 10, 1),
        "GLC/SEC-000001/09/2024",
    );
    // Inside the window but never certified.
    record(&store, &budi, &security, date(2024, 9, 5), date(2025, 9, 5));
    certified_record(
        &store,
        &budi,
        &safety,
        date(2023, 8, 1),
        date(2025, 8, 1),
        "GLC/AVI-000001/08/2023",
    );

    store
        .insert_user("Dewi Admin", "dewi@example.com", UserRole::Admin)
        .expect("user inserted");

    Scenario {
        store,
        sari,
        budi,
        safety,
    }
}
