/// Source name constants to ensure consistency across the codebase
/// These constants define the mapping between user-friendly source names and stored ids

// User-friendly source names (used in CLI)
pub const LABOUR_DEPT_SOURCE: &str = "labour_dept";
pub const HKTDC_SOURCE: &str = "hktdc";
pub const JOBSDB_SOURCE: &str = "jobsdb";

// Canonical source ids (used in stored records and corpus filenames)
pub const LABOUR_DEPT_ID: &str = "labour_dept_hk";
pub const HKTDC_ID: &str = "hktdc";
pub const JOBSDB_ID: &str = "jobsdb_hk";

/// Convert user-friendly source name to the id used in stored records
pub fn source_name_to_id(source_name: &str) -> String {
    match source_name {
        LABOUR_DEPT_SOURCE => LABOUR_DEPT_ID.to_string(),
        HKTDC_SOURCE => HKTDC_ID.to_string(),
        JOBSDB_SOURCE => JOBSDB_ID.to_string(),
        other => other.to_string(),
    }
}

/// Convert stored source id to the user-friendly name
pub fn source_id_to_name(source_id: &str) -> String {
    match source_id {
        LABOUR_DEPT_ID => LABOUR_DEPT_SOURCE.to_string(),
        HKTDC_ID => HKTDC_SOURCE.to_string(),
        JOBSDB_ID => JOBSDB_SOURCE.to_string(),
        other => other.to_string(),
    }
}

/// Get all supported user-friendly source names
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![LABOUR_DEPT_SOURCE, HKTDC_SOURCE, JOBSDB_SOURCE]
}
