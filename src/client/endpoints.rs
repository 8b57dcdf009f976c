//! Paths of the remote API, relative to the environment's base address.

pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_LOGOUT: &str = "/auth/logout";
pub const AUTH_PROFILE: &str = "/auth/profile";

pub const DATABASE_TABLES: &str = "/database/tables";
pub const TABLE_COLUMNS: &str = "/table_columns";

pub const UPLOAD: &str = "/upload";
pub const FILES: &str = "/files";
pub const SHEETS: &str = "/sheets";
pub const READ_COLUMNS: &str = "/read_columns";
pub const RAW_DATA: &str = "/raw_data";

/// `/database/tables/{table}/data`
pub fn table_data(table: &str) -> String {
    format!("{}/{}/data", DATABASE_TABLES, urlencoding::encode(table))
}

/// `/database/tables/{table}/data/{id}`
pub fn table_row(table: &str, id: i64) -> String {
    format!("{}/{}", table_data(table), id)
}

/// `/database/tables/{table}/count`
pub fn table_count(table: &str) -> String {
    format!("{}/{}/count", DATABASE_TABLES, urlencoding::encode(table))
}

/// Analytical aggregates computed server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsKind {
    Column,
    MultiSubject,
    YearlyAdmission,
    SchoolSource,
    AdmissionMethod,
    Geographic,
    TopSchools,
    SubjectAverage,
    GenderSubject,
    AdmissionSubject,
}

impl StatsKind {
    pub fn path(&self) -> &'static str {
        match self {
            StatsKind::Column => "/column_stats",
            StatsKind::MultiSubject => "/multi_subject_stats",
            StatsKind::YearlyAdmission => "/yearly_admission_stats",
            StatsKind::SchoolSource => "/school_source_stats",
            StatsKind::AdmissionMethod => "/admission_method_stats",
            StatsKind::Geographic => "/geographic_stats",
            StatsKind::TopSchools => "/top_schools_stats",
            StatsKind::SubjectAverage => "/subject_average_stats",
            StatsKind::GenderSubject => "/analysis/gender-subject",
            StatsKind::AdmissionSubject => "/analysis/admission-subject",
        }
    }
}
