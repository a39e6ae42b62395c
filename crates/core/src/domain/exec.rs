// Statement Execution Result

use serde::Serialize;

/// Outcome of a successful statement execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: i64,
}

impl ExecResult {
    pub fn new(rows_affected: u64, last_insert_id: i64) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }
}
