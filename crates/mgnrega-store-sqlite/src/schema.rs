//! SQL schema for the performance store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Name of the performance table.
pub const TABLE: &str = "mgnrega_performance";

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// Metric columns must match `mgnrega_core::metrics::METRIC_FIELDS` by name.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS mgnrega_performance (
    id                           INTEGER PRIMARY KEY AUTOINCREMENT,
    data_for_date                TEXT NOT NULL,   -- YYYY-MM-01
    state_name                   TEXT,
    district_name                TEXT NOT NULL,

    job_cards_issued             INTEGER,
    total_active_workers         INTEGER,
    total_active_cards           INTEGER,
    total_workers                INTEGER,
    sc_active_workers            INTEGER,
    st_active_workers            INTEGER,
    approved_labour_budget       REAL,
    persondays_liability         REAL,
    sc_persondays                REAL,
    st_persondays                REAL,
    women_persondays             REAL,
    avg_days_employment_per_hh   REAL,
    avg_wage_rate                REAL,
    hh_completed_100_days        INTEGER,
    total_households_worked      INTEGER,
    total_individuals_worked     INTEGER,
    differently_abled_worked     INTEGER,
    gps_with_nil_exp             INTEGER,
    total_works_takenup          INTEGER,
    ongoing_works                INTEGER,
    completed_works              INTEGER,
    pct_nrm_expenditure          REAL,
    pct_category_b_works         REAL,
    pct_agri_expenditure         REAL,
    total_exp_lakhs              REAL,
    wages_lakhs                  REAL,
    material_skilled_wages_lakhs REAL,
    admin_exp_lakhs              REAL
);

-- One row per district and month; district names compare case-insensitively.
CREATE UNIQUE INDEX IF NOT EXISTS performance_identity_idx
    ON mgnrega_performance(district_name COLLATE NOCASE, data_for_date);
CREATE INDEX IF NOT EXISTS performance_state_idx
    ON mgnrega_performance(state_name COLLATE NOCASE);

-- Written in the same transaction as the dataset replacement.
CREATE TABLE IF NOT EXISTS ingestion_runs (
    run_id      TEXT PRIMARY KEY,
    started_at  TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    fetched     INTEGER NOT NULL,
    rejected    INTEGER NOT NULL,
    duplicates  INTEGER NOT NULL,
    deleted     INTEGER NOT NULL,
    inserted    INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS ingestion_runs_finished_idx ON ingestion_runs(finished_at);

PRAGMA user_version = 1;
";
