// Column-agnostic row decoding for `sqlog query`

use sqlx::sqlite::SqliteRow;
use sqlx::{Column, FromRow, Row, TypeInfo, ValueRef};

/// A row as a JSON object keyed by column name, in column order
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRow(pub Vec<(String, serde_json::Value)>);

impl JsonRow {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(self.0.iter().cloned().collect())
    }

    /// JSON object text with keys in column order
    pub fn render(&self) -> String {
        let entries: Vec<String> = self
            .0
            .iter()
            .map(|(name, value)| format!("{}:{}", serde_json::Value::from(name.as_str()), value))
            .collect();
        format!("{{{}}}", entries.join(","))
    }
}

impl<'r> FromRow<'r, SqliteRow> for JsonRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let mut columns = Vec::with_capacity(row.columns().len());

        for column in row.columns() {
            let i = column.ordinal();
            let raw = row.try_get_raw(i)?;

            let value = if raw.is_null() {
                serde_json::Value::Null
            } else {
                match raw.type_info().name() {
                    "INTEGER" | "BOOLEAN" => row.try_get_unchecked::<i64, _>(i)?.into(),
                    "REAL" => row.try_get_unchecked::<f64, _>(i)?.into(),
                    "BLOB" => row.try_get_unchecked::<Vec<u8>, _>(i)?.into(),
                    _ => row.try_get_unchecked::<String, _>(i)?.into(),
                }
            };

            columns.push((column.name().to_string(), value));
        }

        Ok(JsonRow(columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlog_infra_sqlite::{create_pool, SqlExecutor, SqliteExecutor};

    #[tokio::test]
    async fn test_decodes_each_storage_class() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let db = SqliteExecutor::new(pool);

        let rows: Vec<JsonRow> = db
            .select("SELECT 1 AS i, 2.5 AS r, 'a' AS t, x'0102' AS b, NULL AS n", &[])
            .await
            .unwrap();

        assert_eq!(
            rows[0].to_json(),
            serde_json::json!({"i": 1, "r": 2.5, "t": "a", "b": [1, 2], "n": null})
        );
        assert_eq!(rows[0].render(), r#"{"i":1,"r":2.5,"t":"a","b":[1,2],"n":null}"#);
    }
}
