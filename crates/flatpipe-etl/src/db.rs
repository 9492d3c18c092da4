//! Relational persistence for the transformed records

use crate::error::Result;
use crate::load::render_cell;
use crate::transform::{
    coerce_f64, HEIGHT_IN_COLUMN, HEIGHT_M_COLUMN, WEIGHT_KG_COLUMN, WEIGHT_LB_COLUMN,
};
use flatpipe_common::types::RecordSet;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

/// Destination table name.
pub const PERSONS_TABLE: &str = "persons";

/// Column the person name is read from.
pub const NAME_COLUMN: &str = "Name";

const INSERT_CHUNK_SIZE: usize = 1000;

pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await?;
    info!("Connected to database");
    Ok(pool)
}

/// Create the persons table when it does not exist yet. Safe to run on
/// every pipeline run; repeated runs append rows cumulatively.
pub async fn ensure_persons_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
            name TEXT,
            height DOUBLE PRECISION,
            weight DOUBLE PRECISION
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Table '{}' checked/created", PERSONS_TABLE);
    Ok(())
}

/// One row bound for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRow {
    pub name: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

/// Map the record set onto the persons schema.
///
/// Height and weight take the converted metric values when those
/// columns exist, the raw imperial values otherwise, and NULL when
/// neither does. Cells that do not coerce become NULL rather than
/// failing; the output artifact is already written by the time this
/// runs and the database phase is best-effort.
pub fn person_rows(records: &RecordSet) -> Vec<PersonRow> {
    (0..records.len())
        .map(|row| PersonRow {
            name: cell_text(records, row, NAME_COLUMN),
            height: cell_number(records, row, HEIGHT_M_COLUMN)
                .or_else(|| cell_number(records, row, HEIGHT_IN_COLUMN)),
            weight: cell_number(records, row, WEIGHT_KG_COLUMN)
                .or_else(|| cell_number(records, row, WEIGHT_LB_COLUMN)),
        })
        .collect()
}

fn cell_text(records: &RecordSet, row: usize, column: &str) -> Option<String> {
    match records.get(row, column)? {
        Value::Null => None,
        value => Some(render_cell(value)),
    }
}

fn cell_number(records: &RecordSet, row: usize, column: &str) -> Option<f64> {
    coerce_f64(records.get(row, column)?)
}

/// Bulk-append the record set into the persons table.
pub async fn append_persons(pool: &PgPool, records: &RecordSet) -> Result<u64> {
    let rows = person_rows(records);
    if rows.is_empty() {
        info!("No rows to append");
        return Ok(0);
    }

    let mut appended = 0u64;
    for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
        let mut builder =
            QueryBuilder::<Postgres>::new("INSERT INTO persons (name, height, weight) ");
        builder.push_values(chunk, |mut b, row| {
            b.push_bind(row.name.clone())
                .push_bind(row.height)
                .push_bind(row.weight);
        });
        let result = builder.build().execute(pool).await?;
        appended += result.rows_affected();
    }

    info!("Appended {} rows to '{}'", appended, PERSONS_TABLE);
    Ok(appended)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_person_rows_prefer_metric_columns() {
        let mut records = RecordSet::with_columns(vec![
            NAME_COLUMN.to_string(),
            HEIGHT_IN_COLUMN.to_string(),
            HEIGHT_M_COLUMN.to_string(),
            WEIGHT_LB_COLUMN.to_string(),
            WEIGHT_KG_COLUMN.to_string(),
        ]);
        records
            .push_row(vec![
                json!("Alice"),
                json!("65"),
                json!(1.651),
                json!("130"),
                json!(58.96696),
            ])
            .unwrap();

        let rows = person_rows(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.as_deref(), Some("Alice"));
        assert_eq!(rows[0].height, Some(1.651));
        assert_eq!(rows[0].weight, Some(58.96696));
    }

    #[test]
    fn test_person_rows_fall_back_to_imperial_columns() {
        let mut records = RecordSet::with_columns(vec![
            NAME_COLUMN.to_string(),
            HEIGHT_IN_COLUMN.to_string(),
        ]);
        records.push_row(vec![json!("Bob"), json!("70")]).unwrap();

        let rows = person_rows(&records);
        assert_eq!(rows[0].height, Some(70.0));
        assert_eq!(rows[0].weight, None);
    }

    #[test]
    fn test_person_rows_null_cells_become_none() {
        let mut records = RecordSet::with_columns(vec![
            NAME_COLUMN.to_string(),
            HEIGHT_M_COLUMN.to_string(),
        ]);
        records
            .push_row(vec![Value::Null, json!("not a number")])
            .unwrap();

        let rows = person_rows(&records);
        assert_eq!(rows[0].name, None);
        assert_eq!(rows[0].height, None);
    }

    #[test]
    fn test_person_rows_empty_record_set() {
        assert!(person_rows(&RecordSet::new()).is_empty());
    }
}
