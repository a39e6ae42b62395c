// Positional Argument Binding

use sqlog_core::Value;
use sqlx::sqlite::SqliteArguments;
use sqlx::Arguments;

/// Bind values to `?` placeholders in order
pub(crate) fn to_arguments(values: &[Value]) -> Result<SqliteArguments<'_>, sqlx::Error> {
    let mut arguments = SqliteArguments::default();
    for value in values {
        let added = match value {
            Value::Null => arguments.add(None::<i64>),
            Value::Bool(b) => arguments.add(*b),
            Value::Int(i) => arguments.add(*i),
            Value::Float(f) => arguments.add(*f),
            Value::Text(s) => arguments.add(s.as_str()),
            Value::Blob(b) => arguments.add(b.as_slice()),
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;

    #[tokio::test]
    async fn test_binds_every_variant() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(7),
            Value::Float(1.5),
            Value::Text("a".to_string()),
            Value::Blob(vec![0xde, 0xad]),
        ];
        let arguments = to_arguments(&values).unwrap();

        let row: (Option<i64>, bool, i64, f64, String, Vec<u8>) =
            sqlx::query_as_with("SELECT ?, ?, ?, ?, ?, ?", arguments)
                .fetch_one(&pool)
                .await
                .unwrap();

        assert_eq!(row, (None, true, 7, 1.5, "a".to_string(), vec![0xde, 0xad]));
    }
}
