use crate::domain::{BackgroundCheckStatus, BackgroundCheckType, EmployeeId, NewBackgroundCheck};
use crate::error::ServiceError;
use crate::registry::{BackgroundCheckRegistry, EmployeeRegistry};
use crate::store::EmployeeRepository;
use crate::testing::{date, employee, store};

fn passed_check(employee_id: EmployeeId) -> NewBackgroundCheck {
    NewBackgroundCheck {
        employee_id,
        check_date: date(2024, 6, 1),
        check_type: BackgroundCheckType::SecurityClearance,
        status: BackgroundCheckStatus::Passed,
        valid_until: Some(date(2025, 6, 1)),
        notes: Some("  ".to_string()),
    }
}

#[test]
fn checks_require_an_existing_employee_and_a_forward_window() {
    let store = store();
    let registry = BackgroundCheckRegistry::new(store.clone());

    assert!(matches!(
        registry.record(passed_check(EmployeeId(77))),
        Err(ServiceError::NotFound { entity: "employee", .. })
    ));

    let sari = employee(&store, "1001", "Sari Wulandari");
    let mut backwards = passed_check(sari.id);
    backwards.valid_until = Some(date(2024, 5, 1));
    match registry.record(backwards) {
        Err(ServiceError::Validation(err)) => assert_eq!(err.field, "valid_until"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let check = registry.record(passed_check(sari.id)).expect("check recorded");
    assert_eq!(check.notes, None);
    assert_eq!(registry.for_employee(sari.id).unwrap(), vec![check]);
}

#[test]
fn lapsed_passes_are_expired_in_bulk() {
    let store = store();
    let sari = employee(&store, "1001", "Sari Wulandari");
    let registry = BackgroundCheckRegistry::new(store.clone());
    let lapsing = registry.record(passed_check(sari.id)).expect("check recorded");
    let mut open_ended = passed_check(sari.id);
    open_ended.valid_until = None;
    registry.record(open_ended).expect("check recorded");

    assert_eq!(registry.expire_lapsed(date(2025, 5, 31)).unwrap(), 0);
    assert_eq!(registry.expire_lapsed(date(2025, 6, 1)).unwrap(), 1);
    assert_eq!(
        registry.get(lapsing.id).unwrap().status,
        BackgroundCheckStatus::Expired
    );
    assert_eq!(registry.expire_lapsed(date(2025, 6, 2)).unwrap(), 0);
}

#[test]
fn checks_are_removed_with_their_employee() {
    let store = store();
    let employees = EmployeeRegistry::new(store.clone());
    let sari = employee(&store, "1001", "Sari Wulandari");
    let registry = BackgroundCheckRegistry::new(store.clone());
    registry.record(passed_check(sari.id)).expect("check recorded");

    employees.purge(sari.id).expect("purged");
    assert!(store.fetch_employee(sari.id).unwrap().is_none());
    assert!(registry.for_employee(sari.id).unwrap().is_empty());
}

#[test]
fn checks_cannot_move_between_employees() {
    let store = store();
    let sari = employee(&store, "1001", "Sari Wulandari");
    let budi = employee(&store, "1002", "Budi Santoso");
    let registry = BackgroundCheckRegistry::new(store.clone());
    let check = registry.record(passed_check(sari.id)).expect("check recorded");

    let mut moved = check.clone();
    moved.employee_id = budi.id;
    match registry.update(&moved) {
        Err(ServiceError::Validation(err)) => assert_eq!(err.field, "employee_id"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let mut failed = check;
    failed.status = BackgroundCheckStatus::Failed;
    registry.update(&failed).expect("status updated");
    assert_eq!(
        registry.get(failed.id).unwrap().status,
        BackgroundCheckStatus::Failed
    );
}
