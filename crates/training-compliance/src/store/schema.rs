pub(super) const SCHEMA_VERSION: i32 = 1;

pub(super) const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nip TEXT NOT NULL UNIQUE,
    nik TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    email TEXT UNIQUE,
    department TEXT NOT NULL,
    unit TEXT,
    position TEXT,
    employment_status TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    deleted_at TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_employees_department ON employees(department);

CREATE TABLE IF NOT EXISTS training_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    code TEXT,
    category TEXT NOT NULL,
    is_mandatory INTEGER NOT NULL DEFAULT 0,
    validity_months INTEGER NOT NULL CHECK (validity_months > 0),
    notification_days INTEGER NOT NULL DEFAULT 30,
    compliance_level TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS training_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id INTEGER NOT NULL,
    training_type_id INTEGER NOT NULL,
    certificate_number TEXT UNIQUE,
    issue_date TEXT NOT NULL,
    expiry_date TEXT NOT NULL,
    completion_status TEXT NOT NULL,
    training_provider TEXT,
    notes TEXT,
    previous_training_id INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE,
    FOREIGN KEY (training_type_id) REFERENCES training_types(id),
    FOREIGN KEY (previous_training_id) REFERENCES training_records(id) ON DELETE SET NULL,
    CHECK (expiry_date > issue_date)
);

CREATE INDEX IF NOT EXISTS idx_training_records_employee ON training_records(employee_id);
CREATE INDEX IF NOT EXISTS idx_training_records_type ON training_records(training_type_id);
CREATE INDEX IF NOT EXISTS idx_training_records_expiry ON training_records(expiry_date);

CREATE TABLE IF NOT EXISTS certificate_sequences (
    training_type_id INTEGER NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    last_value INTEGER NOT NULL,
    PRIMARY KEY (training_type_id, year, month),
    FOREIGN KEY (training_type_id) REFERENCES training_types(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS background_checks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id INTEGER NOT NULL,
    check_date TEXT NOT NULL,
    check_type TEXT NOT NULL,
    status TEXT NOT NULL,
    valid_until TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_background_checks_employee ON background_checks(employee_id);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL CHECK (role IN ('admin', 'super_admin')),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS notification_runs (
    category TEXT PRIMARY KEY,
    last_run_at TEXT NOT NULL
);
"#;
