use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDateTime;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::{debug, info};

use super::schema::{CREATE_TABLES, SCHEMA_VERSION};
use super::{
    BackgroundCheckRepository, CertificateWrite, EmployeeFilter, EmployeeRepository,
    NotificationLedger, RecordFilter, RepositoryError, SequenceKey, TrainingRecordRepository,
    TrainingTypeFilter, TrainingTypeRepository, UserRepository,
};
use crate::domain::{
    BackgroundCheck, BackgroundCheckId, Employee, EmployeeId, NewBackgroundCheck, NewEmployee,
    NewTrainingRecord, NewTrainingType, TrainingRecord, TrainingRecordDetail, TrainingRecordId,
    TrainingType, TrainingTypeId, UnknownVariant, User, UserId, UserRole,
    DEFAULT_NOTIFICATION_DAYS,
};
use crate::notifications::NotificationCategory;

const EMPLOYEE_COLUMNS: &str = "e.id, e.nip, e.nik, e.name, e.email, e.department, e.unit, \
     e.position, e.employment_status, e.is_active, e.deleted_at";
const TRAINING_TYPE_COLUMNS: &str = "t.id, t.name, t.code, t.category, t.is_mandatory, \
     t.validity_months, t.notification_days, t.compliance_level, t.is_active, t.description";
const RECORD_COLUMNS: &str = "r.id, r.employee_id, r.training_type_id, r.certificate_number, \
     r.issue_date, r.expiry_date, r.completion_status, r.training_provider, r.notes, \
     r.previous_training_id";
const CHECK_COLUMNS: &str =
    "id, employee_id, check_date, check_type, status, valid_until, notes";

const RECORD_WIDTH: usize = 10;
const EMPLOYEE_WIDTH: usize = 11;

/// SQLite-backed store sharing one connection behind a mutex.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and bring the schema up to date.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        info!(path = %path.display(), "training database opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        conn.execute_batch(CREATE_TABLES)?;
        let applied = conn.execute(
            "INSERT OR IGNORE INTO schema_migrations (version) VALUES (?1)",
            [SCHEMA_VERSION],
        )?;
        if applied > 0 {
            info!(version = SCHEMA_VERSION, "training schema created");
        }
        Ok(())
    }

    /// Direct connection access for maintenance tasks and tests.
    pub fn with_connection<F, T>(&self, f: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.lock()?;
        Ok(f(&conn)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Unavailable("connection mutex poisoned".to_string()))
    }

    fn details_query(filter: &RecordFilter) -> (String, Vec<Value>) {
        let mut sql = format!(
            "SELECT {RECORD_COLUMNS}, {EMPLOYEE_COLUMNS}, {TRAINING_TYPE_COLUMNS}
             FROM training_records r
             JOIN employees e ON e.id = r.employee_id
             JOIN training_types t ON t.id = r.training_type_id
             WHERE 1 = 1"
        );
        let mut values = Vec::new();

        if let Some(employee_id) = filter.employee_id {
            sql.push_str(" AND r.employee_id = ?");
            values.push(Value::Integer(employee_id.0));
        }
        if let Some(training_type_id) = filter.training_type_id {
            sql.push_str(" AND r.training_type_id = ?");
            values.push(Value::Integer(training_type_id.0));
        }
        if let Some(department) = filter.department {
            sql.push_str(" AND e.department = ?");
            values.push(Value::Text(department.as_str().to_string()));
        }
        if let Some(status) = filter.completion_status {
            sql.push_str(" AND r.completion_status = ?");
            values.push(Value::Text(status.as_str().to_string()));
        }
        if filter.missing_certificate {
            sql.push_str(" AND r.certificate_number IS NULL");
        }
        if filter.with_certificate {
            sql.push_str(" AND r.certificate_number IS NOT NULL");
        }
        if let Some((from, to)) = filter.expiring_between {
            sql.push_str(" AND r.expiry_date > ? AND r.expiry_date <= ?");
            values.push(Value::Text(from.format("%Y-%m-%d").to_string()));
            values.push(Value::Text(to.format("%Y-%m-%d").to_string()));
        }

        sql.push_str(" ORDER BY r.expiry_date, r.id");
        (sql, values)
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                RepositoryError::Conflict(
                    message
                        .clone()
                        .unwrap_or_else(|| "constraint violation".to_string()),
                )
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound,
            _ => RepositoryError::Unavailable(err.to_string()),
        }
    }
}

fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn employee_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: EmployeeId(row.get(base)?),
        nip: row.get(base + 1)?,
        nik: row.get(base + 2)?,
        name: row.get(base + 3)?,
        email: row.get(base + 4)?,
        department: enum_column(row, base + 5)?,
        unit: row.get(base + 6)?,
        position: row.get(base + 7)?,
        employment_status: enum_column(row, base + 8)?,
        is_active: row.get(base + 9)?,
        deleted_at: row.get(base + 10)?,
    })
}

fn training_type_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<TrainingType> {
    Ok(TrainingType {
        id: TrainingTypeId(row.get(base)?),
        name: row.get(base + 1)?,
        code: row.get(base + 2)?,
        category: enum_column(row, base + 3)?,
        is_mandatory: row.get(base + 4)?,
        validity_months: row.get(base + 5)?,
        notification_days: row.get(base + 6)?,
        compliance_level: enum_column(row, base + 7)?,
        is_active: row.get(base + 8)?,
        description: row.get(base + 9)?,
    })
}

fn record_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<TrainingRecord> {
    Ok(TrainingRecord {
        id: TrainingRecordId(row.get(base)?),
        employee_id: EmployeeId(row.get(base + 1)?),
        training_type_id: TrainingTypeId(row.get(base + 2)?),
        certificate_number: row.get(base + 3)?,
        issue_date: row.get(base + 4)?,
        expiry_date: row.get(base + 5)?,
        completion_status: enum_column(row, base + 6)?,
        training_provider: row.get(base + 7)?,
        notes: row.get(base + 8)?,
        previous_training_id: row
            .get::<_, Option<i64>>(base + 9)?
            .map(TrainingRecordId),
    })
}

fn detail_from_row(row: &Row<'_>) -> rusqlite::Result<TrainingRecordDetail> {
    Ok(TrainingRecordDetail {
        record: record_from_row(row, 0)?,
        employee: employee_from_row(row, RECORD_WIDTH)?,
        training_type: training_type_from_row(row, RECORD_WIDTH + EMPLOYEE_WIDTH)?,
    })
}

fn check_from_row(row: &Row<'_>) -> rusqlite::Result<BackgroundCheck> {
    Ok(BackgroundCheck {
        id: BackgroundCheckId(row.get(0)?),
        employee_id: EmployeeId(row.get(1)?),
        check_date: row.get(2)?,
        check_type: enum_column(row, 3)?,
        status: enum_column(row, 4)?,
        valid_until: row.get(5)?,
        notes: row.get(6)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        role: enum_column(row, 3)?,
    })
}

fn ensure_changed(changed: usize) -> Result<(), RepositoryError> {
    if changed == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

impl EmployeeRepository for SqliteStore {
    fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee, RepositoryError> {
        let id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO employees
                    (nip, nik, name, email, department, unit, position, employment_status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    employee.nip,
                    employee.nik,
                    employee.name,
                    employee.email,
                    employee.department.as_str(),
                    employee.unit,
                    employee.position,
                    employee.employment_status.as_str(),
                ],
            )?;
            EmployeeId(conn.last_insert_rowid())
        };
        debug!(%id, nip = %employee.nip, "employee inserted");

        self.fetch_employee(id)?.ok_or(RepositoryError::NotFound)
    }

    fn update_employee(&self, employee: &Employee) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE employees
             SET nip = ?1, nik = ?2, name = ?3, email = ?4, department = ?5, unit = ?6,
                 position = ?7, employment_status = ?8, is_active = ?9, deleted_at = ?10,
                 updated_at = datetime('now')
             WHERE id = ?11",
            params![
                employee.nip,
                employee.nik,
                employee.name,
                employee.email,
                employee.department.as_str(),
                employee.unit,
                employee.position,
                employee.employment_status.as_str(),
                employee.is_active,
                employee.deleted_at,
                employee.id.0,
            ],
        )?;
        ensure_changed(changed)
    }

    fn fetch_employee(&self, id: EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        let conn = self.lock()?;
        let employee = conn
            .query_row(
                &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees e WHERE e.id = ?1"),
                [id.0],
                |row| employee_from_row(row, 0),
            )
            .optional()?;
        Ok(employee)
    }

    fn fetch_employee_by_nip(&self, nip: &str) -> Result<Option<Employee>, RepositoryError> {
        let conn = self.lock()?;
        let employee = conn
            .query_row(
                &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees e WHERE e.nip = ?1"),
                [nip],
                |row| employee_from_row(row, 0),
            )
            .optional()?;
        Ok(employee)
    }

    fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, RepositoryError> {
        let mut sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees e WHERE 1 = 1");
        let mut values = Vec::new();

        if !filter.include_inactive {
            sql.push_str(" AND e.is_active = 1");
        }
        if !filter.include_deleted {
            sql.push_str(" AND e.deleted_at IS NULL");
        }
        if let Some(department) = filter.department {
            sql.push_str(" AND e.department = ?");
            values.push(Value::Text(department.as_str().to_string()));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                sql.push_str(" AND (e.name LIKE ? OR e.nip LIKE ? OR e.nik LIKE ?)");
                let pattern = format!("%{search}%");
                values.extend(std::iter::repeat(Value::Text(pattern)).take(3));
            }
        }
        sql.push_str(" ORDER BY e.name, e.id");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let employees = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                employee_from_row(row, 0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(employees)
    }

    fn delete_employee(&self, id: EmployeeId) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM employees WHERE id = ?1", [id.0])?;
        ensure_changed(changed)
    }
}

impl TrainingTypeRepository for SqliteStore {
    fn insert_training_type(
        &self,
        training_type: &NewTrainingType,
    ) -> Result<TrainingType, RepositoryError> {
        let id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO training_types
                    (name, code, category, is_mandatory, validity_months, notification_days,
                     compliance_level, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    training_type.name,
                    training_type.code,
                    training_type.category.as_str(),
                    training_type.is_mandatory,
                    training_type.validity_months,
                    training_type
                        .notification_days
                        .unwrap_or(DEFAULT_NOTIFICATION_DAYS),
                    training_type.compliance_level.as_str(),
                    training_type.description,
                ],
            )?;
            TrainingTypeId(conn.last_insert_rowid())
        };

        self.fetch_training_type(id)?
            .ok_or(RepositoryError::NotFound)
    }

    fn update_training_type(&self, training_type: &TrainingType) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE training_types
             SET name = ?1, code = ?2, category = ?3, is_mandatory = ?4, validity_months = ?5,
                 notification_days = ?6, compliance_level = ?7, is_active = ?8,
                 description = ?9, updated_at = datetime('now')
             WHERE id = ?10",
            params![
                training_type.name,
                training_type.code,
                training_type.category.as_str(),
                training_type.is_mandatory,
                training_type.validity_months,
                training_type.notification_days,
                training_type.compliance_level.as_str(),
                training_type.is_active,
                training_type.description,
                training_type.id.0,
            ],
        )?;
        ensure_changed(changed)
    }

    fn fetch_training_type(
        &self,
        id: TrainingTypeId,
    ) -> Result<Option<TrainingType>, RepositoryError> {
        let conn = self.lock()?;
        let training_type = conn
            .query_row(
                &format!("SELECT {TRAINING_TYPE_COLUMNS} FROM training_types t WHERE t.id = ?1"),
                [id.0],
                |row| training_type_from_row(row, 0),
            )
            .optional()?;
        Ok(training_type)
    }

    fn list_training_types(
        &self,
        filter: &TrainingTypeFilter,
    ) -> Result<Vec<TrainingType>, RepositoryError> {
        let mut sql = format!("SELECT {TRAINING_TYPE_COLUMNS} FROM training_types t WHERE 1 = 1");
        if filter.mandatory_only {
            sql.push_str(" AND t.is_mandatory = 1");
        }
        if !filter.include_inactive {
            sql.push_str(" AND t.is_active = 1");
        }
        sql.push_str(" ORDER BY t.name");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let types = stmt
            .query_map([], |row| training_type_from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(types)
    }
}

impl TrainingRecordRepository for SqliteStore {
    fn insert_training_record(
        &self,
        record: &NewTrainingRecord,
    ) -> Result<TrainingRecord, RepositoryError> {
        let expiry_date = record
            .expiry_date
            .ok_or_else(|| RepositoryError::Conflict("expiry_date is required".to_string()))?;

        let id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO training_records
                    (employee_id, training_type_id, certificate_number, issue_date, expiry_date,
                     completion_status, training_provider, notes, previous_training_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.employee_id.0,
                    record.training_type_id.0,
                    record.certificate_number,
                    record.issue_date,
                    expiry_date,
                    record.completion_status.as_str(),
                    record.training_provider,
                    record.notes,
                    record.previous_training_id.map(|id| id.0),
                ],
            )?;
            TrainingRecordId(conn.last_insert_rowid())
        };

        self.fetch_training_record(id)?
            .ok_or(RepositoryError::NotFound)
    }

    fn update_training_record(&self, record: &TrainingRecord) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE training_records
             SET issue_date = ?1, expiry_date = ?2, completion_status = ?3,
                 training_provider = ?4, notes = ?5, previous_training_id = ?6,
                 certificate_number = COALESCE(certificate_number, ?7),
                 updated_at = datetime('now')
             WHERE id = ?8",
            params![
                record.issue_date,
                record.expiry_date,
                record.completion_status.as_str(),
                record.training_provider,
                record.notes,
                record.previous_training_id.map(|id| id.0),
                record.certificate_number,
                record.id.0,
            ],
        )?;
        ensure_changed(changed)
    }

    fn fetch_training_record(
        &self,
        id: TrainingRecordId,
    ) -> Result<Option<TrainingRecord>, RepositoryError> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM training_records r WHERE r.id = ?1"),
                [id.0],
                |row| record_from_row(row, 0),
            )
            .optional()?;
        Ok(record)
    }

    fn fetch_by_certificate_number(
        &self,
        certificate_number: &str,
    ) -> Result<Option<TrainingRecordDetail>, RepositoryError> {
        let conn = self.lock()?;
        let detail = conn
            .query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS}, {EMPLOYEE_COLUMNS}, {TRAINING_TYPE_COLUMNS}
                     FROM training_records r
                     JOIN employees e ON e.id = r.employee_id
                     JOIN training_types t ON t.id = r.training_type_id
                     WHERE r.certificate_number = ?1"
                ),
                [certificate_number.trim()],
                detail_from_row,
            )
            .optional()?;
        Ok(detail)
    }

    fn list_training_records(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<TrainingRecordDetail>, RepositoryError> {
        let (sql, values) = Self::details_query(filter);
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let details = stmt
            .query_map(params_from_iter(values.iter()), detail_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(details)
    }

    fn next_certificate_sequence(&self, key: SequenceKey) -> Result<u32, RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<u32> = tx
            .query_row(
                "SELECT last_value FROM certificate_sequences
                 WHERE training_type_id = ?1 AND year = ?2 AND month = ?3",
                params![key.training_type_id.0, key.year, key.month],
                |row| row.get(0),
            )
            .optional()?;

        // First use of a period starts after numbers already issued in it.
        let next = match current {
            Some(value) => value + 1,
            None => {
                let issued: u32 = tx.query_row(
                    "SELECT COUNT(*) FROM training_records
                     WHERE training_type_id = ?1
                       AND certificate_number IS NOT NULL
                       AND CAST(strftime('%Y', issue_date) AS INTEGER) = ?2
                       AND CAST(strftime('%m', issue_date) AS INTEGER) = ?3",
                    params![key.training_type_id.0, key.year, key.month],
                    |row| row.get(0),
                )?;
                issued + 1
            }
        };

        tx.execute(
            "INSERT INTO certificate_sequences (training_type_id, year, month, last_value)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (training_type_id, year, month)
             DO UPDATE SET last_value = excluded.last_value",
            params![key.training_type_id.0, key.year, key.month, next],
        )?;
        tx.commit()?;

        Ok(next)
    }

    fn assign_certificate_number(
        &self,
        id: TrainingRecordId,
        number: &str,
    ) -> Result<CertificateWrite, RepositoryError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE training_records
             SET certificate_number = ?1, updated_at = datetime('now')
             WHERE id = ?2 AND certificate_number IS NULL",
            params![number, id.0],
        )?;
        if changed == 1 {
            return Ok(CertificateWrite::Assigned);
        }

        let existing: Option<Option<String>> = conn
            .query_row(
                "SELECT certificate_number FROM training_records WHERE id = ?1",
                [id.0],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            None => Err(RepositoryError::NotFound),
            Some(Some(current)) => Ok(CertificateWrite::AlreadyAssigned(current)),
            Some(None) => Err(RepositoryError::Unavailable(format!(
                "certificate write for training record {id} did not apply"
            ))),
        }
    }
}

impl BackgroundCheckRepository for SqliteStore {
    fn insert_background_check(
        &self,
        check: &NewBackgroundCheck,
    ) -> Result<BackgroundCheck, RepositoryError> {
        let id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO background_checks
                    (employee_id, check_date, check_type, status, valid_until, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    check.employee_id.0,
                    check.check_date,
                    check.check_type.as_str(),
                    check.status.as_str(),
                    check.valid_until,
                    check.notes,
                ],
            )?;
            BackgroundCheckId(conn.last_insert_rowid())
        };

        self.fetch_background_check(id)?
            .ok_or(RepositoryError::NotFound)
    }

    fn update_background_check(&self, check: &BackgroundCheck) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE background_checks
             SET check_date = ?1, check_type = ?2, status = ?3, valid_until = ?4, notes = ?5,
                 updated_at = datetime('now')
             WHERE id = ?6",
            params![
                check.check_date,
                check.check_type.as_str(),
                check.status.as_str(),
                check.valid_until,
                check.notes,
                check.id.0,
            ],
        )?;
        ensure_changed(changed)
    }

    fn fetch_background_check(
        &self,
        id: BackgroundCheckId,
    ) -> Result<Option<BackgroundCheck>, RepositoryError> {
        let conn = self.lock()?;
        let check = conn
            .query_row(
                &format!("SELECT {CHECK_COLUMNS} FROM background_checks WHERE id = ?1"),
                [id.0],
                check_from_row,
            )
            .optional()?;
        Ok(check)
    }

    fn list_background_checks(
        &self,
        employee_id: Option<EmployeeId>,
    ) -> Result<Vec<BackgroundCheck>, RepositoryError> {
        let conn = self.lock()?;
        let checks = match employee_id {
            Some(employee_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {CHECK_COLUMNS} FROM background_checks
                     WHERE employee_id = ?1 ORDER BY check_date DESC, id DESC"
                ))?;
                let rows = stmt
                    .query_map([employee_id.0], check_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {CHECK_COLUMNS} FROM background_checks
                     ORDER BY check_date DESC, id DESC"
                ))?;
                let rows = stmt
                    .query_map([], check_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(checks)
    }
}

impl UserRepository for SqliteStore {
    fn insert_user(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (name, email, role) VALUES (?1, ?2, ?3)",
            params![name, email, role.as_str()],
        )?;
        Ok(User {
            id: UserId(conn.last_insert_rowid()),
            name: name.to_string(),
            email: email.to_string(),
            role,
        })
    }

    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, email, role FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

impl NotificationLedger for SqliteStore {
    fn last_notification_run(
        &self,
        category: NotificationCategory,
    ) -> Result<Option<NaiveDateTime>, RepositoryError> {
        let conn = self.lock()?;
        let last_run = conn
            .query_row(
                "SELECT last_run_at FROM notification_runs WHERE category = ?1",
                [category.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(last_run)
    }

    fn record_notification_run(
        &self,
        category: NotificationCategory,
        at: NaiveDateTime,
    ) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO notification_runs (category, last_run_at) VALUES (?1, ?2)
             ON CONFLICT (category) DO UPDATE SET last_run_at = excluded.last_run_at",
            params![category.as_str(), at],
        )?;
        Ok(())
    }
}
