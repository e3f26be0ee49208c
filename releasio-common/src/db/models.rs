//! Database models

use serde::{Deserialize, Serialize};

/// One persisted cell as stored in the `cells` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CellRow {
    pub key: String,
    pub value: String,
    pub revision: i64,
}
