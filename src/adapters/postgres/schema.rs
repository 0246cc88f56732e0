//! Idempotent warehouse schema bootstrap.
//!
//! The DDL is generated rather than embedded because the schema
//! namespace is configurable. Table creation is `IF NOT EXISTS`, so
//! every run can execute the full list safely; a full-refresh run then
//! truncates everything with CASCADE before reloading.

use sqlx::PgPool;

use crate::domain::errors::EtlResult;

/// Warehouse tables in dependency order (facts last).
pub const TABLES: [&str; 8] = [
    "dim_issues",
    "dim_project",
    "dim_users",
    "dim_milestone",
    "dim_labels",
    "fact_issues",
    "fact_issue_participation",
    "fact_issue_labels",
];

fn ddl_statements(schema: &str) -> Vec<String> {
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {schema}"),
        format!(
            "CREATE TABLE IF NOT EXISTS {schema}.dim_issues (
                issue_pk TEXT PRIMARY KEY,
                issue_id BIGINT NOT NULL,
                project_id BIGINT NOT NULL,
                title TEXT,
                description TEXT,
                state TEXT,
                created_at TIMESTAMPTZ,
                start_date DATE,
                due_date DATE,
                closed_at TIMESTAMPTZ,
                issue_type TEXT,
                last_synced_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {schema}.dim_project (
                project_id BIGINT PRIMARY KEY,
                project_name TEXT,
                group_id BIGINT,
                group_name TEXT,
                last_synced_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {schema}.dim_users (
                user_id BIGINT PRIMARY KEY,
                username TEXT,
                name TEXT,
                last_synced_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {schema}.dim_milestone (
                milestone_id BIGINT PRIMARY KEY,
                title TEXT,
                description TEXT,
                start_date DATE,
                due_date DATE,
                state TEXT,
                project_id BIGINT,
                last_synced_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {schema}.dim_labels (
                label_id BIGSERIAL PRIMARY KEY,
                name TEXT UNIQUE NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {schema}.fact_issues (
                fact_issue_id BIGSERIAL PRIMARY KEY,
                issue_pk TEXT REFERENCES {schema}.dim_issues (issue_pk),
                project_id BIGINT REFERENCES {schema}.dim_project (project_id),
                milestone_id BIGINT REFERENCES {schema}.dim_milestone (milestone_id)
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {schema}.fact_issue_participation (
                fact_id BIGSERIAL PRIMARY KEY,
                issue_pk TEXT REFERENCES {schema}.dim_issues (issue_pk),
                user_id BIGINT REFERENCES {schema}.dim_users (user_id),
                project_id BIGINT REFERENCES {schema}.dim_project (project_id),
                role TEXT NOT NULL,
                process TEXT,
                activity TEXT
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {schema}.fact_issue_labels (
                label_fact_id BIGSERIAL PRIMARY KEY,
                issue_pk TEXT REFERENCES {schema}.dim_issues (issue_pk),
                label_id BIGINT REFERENCES {schema}.dim_labels (label_id)
            )"
        ),
    ]
}

/// Create the schema namespace and all warehouse tables if absent.
pub async fn ensure_tables(pool: &PgPool, schema: &str) -> EtlResult<()> {
    for statement in ddl_statements(schema) {
        sqlx::query(&statement).execute(pool).await?;
    }
    Ok(())
}

/// Empty every warehouse table. CASCADE clears fact rows referencing
/// the truncated dimensions regardless of ordering.
pub async fn truncate_all(pool: &PgPool, schema: &str) -> EtlResult<()> {
    let tables = TABLES
        .iter()
        .map(|t| format!("{schema}.{t}"))
        .collect::<Vec<_>>()
        .join(", ");
    sqlx::query(&format!("TRUNCATE TABLE {tables} CASCADE"))
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_covers_every_table() {
        let statements = ddl_statements("git_lab");
        // One CREATE SCHEMA plus one CREATE TABLE per warehouse table.
        assert_eq!(statements.len(), TABLES.len() + 1);
        for table in TABLES {
            assert!(
                statements.iter().any(|s| s.contains(&format!("git_lab.{table}"))),
                "missing DDL for {table}"
            );
        }
    }

    #[test]
    fn ddl_is_idempotent_by_construction() {
        for statement in ddl_statements("w") {
            assert!(statement.contains("IF NOT EXISTS"));
        }
    }
}
