//! Fact inserts.
//!
//! Fact rows are plain appends; idempotency across runs comes from the
//! refresh policy (truncation in full-refresh mode, per-issue fact
//! deletion in incremental mode), not from conflict handling here.

use sqlx::PgConnection;

use crate::domain::errors::EtlResult;
use crate::domain::models::{Classification, IssueKey, Role};

/// Insert the one-per-issue fact backbone row.
pub async fn insert_issue_fact(
    conn: &mut PgConnection,
    schema: &str,
    key: &IssueKey,
    project_id: i64,
    milestone_id: Option<i64>,
) -> EtlResult<()> {
    let sql = format!(
        "INSERT INTO {schema}.fact_issues (issue_pk, project_id, milestone_id)
         VALUES ($1, $2, $3)"
    );
    sqlx::query(&sql)
        .bind(key.as_str())
        .bind(project_id)
        .bind(milestone_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Insert one (issue, label) fact row.
pub async fn insert_label_fact(
    conn: &mut PgConnection,
    schema: &str,
    key: &IssueKey,
    label_id: i64,
) -> EtlResult<()> {
    let sql = format!(
        "INSERT INTO {schema}.fact_issue_labels (issue_pk, label_id) VALUES ($1, $2)"
    );
    sqlx::query(&sql)
        .bind(key.as_str())
        .bind(label_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Insert one participation row; the classification pair is duplicated
/// onto every participation row of the issue.
pub async fn insert_participation(
    conn: &mut PgConnection,
    schema: &str,
    key: &IssueKey,
    user_id: i64,
    project_id: i64,
    role: Role,
    classification: &Classification,
) -> EtlResult<()> {
    let sql = format!(
        "INSERT INTO {schema}.fact_issue_participation
            (issue_pk, user_id, project_id, role, process, activity)
         VALUES ($1, $2, $3, $4, $5, $6)"
    );
    sqlx::query(&sql)
        .bind(key.as_str())
        .bind(user_id)
        .bind(project_id)
        .bind(role.as_str())
        .bind(&classification.process)
        .bind(&classification.activity)
        .execute(conn)
        .await?;
    Ok(())
}

/// Delete all fact rows of one issue. Incremental runs call this before
/// rewriting, so a reprocessed issue never accumulates duplicate facts.
pub async fn delete_issue_facts(
    conn: &mut PgConnection,
    schema: &str,
    key: &IssueKey,
) -> EtlResult<()> {
    for table in ["fact_issue_labels", "fact_issue_participation", "fact_issues"] {
        let sql = format!("DELETE FROM {schema}.{table} WHERE issue_pk = $1");
        sqlx::query(&sql).bind(key.as_str()).execute(&mut *conn).await?;
    }
    Ok(())
}
