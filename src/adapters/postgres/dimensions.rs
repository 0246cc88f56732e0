//! Dimension upserts.
//!
//! One function per dimension, each executed on the caller's
//! transaction so referential integrity holds when the fact rows land.
//! In full-refresh mode every upsert is insert-if-absent (first write
//! wins, the dimension is never updated); in incremental mode the
//! conflict path refreshes the row's attributes and `last_synced_at`.

use sqlx::PgConnection;

use crate::domain::errors::EtlResult;
use crate::domain::models::{
    Issue, IssueDates, IssueKey, Milestone, Project, RefreshMode, UserRef,
};

/// Upsert the issue dimension row and return the composite key for the
/// fact rows to reference.
pub async fn upsert_issue(
    conn: &mut PgConnection,
    schema: &str,
    issue: &Issue,
    dates: IssueDates,
    mode: RefreshMode,
) -> EtlResult<IssueKey> {
    let key = issue.key();
    let conflict = match mode {
        RefreshMode::FullRefresh => "DO NOTHING",
        RefreshMode::Incremental => {
            "DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                state = EXCLUDED.state,
                created_at = EXCLUDED.created_at,
                start_date = EXCLUDED.start_date,
                due_date = EXCLUDED.due_date,
                closed_at = EXCLUDED.closed_at,
                issue_type = EXCLUDED.issue_type,
                last_synced_at = now()"
        }
    };

    let sql = format!(
        "INSERT INTO {schema}.dim_issues
            (issue_pk, issue_id, project_id, title, description, state,
             created_at, start_date, due_date, closed_at, issue_type)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         ON CONFLICT (issue_pk) {conflict}"
    );

    sqlx::query(&sql)
        .bind(key.as_str())
        .bind(issue.id)
        .bind(issue.project_id)
        .bind(&issue.title)
        .bind(&issue.description)
        .bind(&issue.state)
        .bind(issue.created_at)
        .bind(dates.start)
        .bind(dates.due)
        .bind(issue.closed_at)
        .bind(&issue.issue_type)
        .execute(conn)
        .await?;

    Ok(key)
}

pub async fn upsert_project(
    conn: &mut PgConnection,
    schema: &str,
    project: &Project,
    mode: RefreshMode,
) -> EtlResult<()> {
    let conflict = match mode {
        RefreshMode::FullRefresh => "DO NOTHING",
        RefreshMode::Incremental => {
            "DO UPDATE SET
                project_name = EXCLUDED.project_name,
                group_id = EXCLUDED.group_id,
                group_name = EXCLUDED.group_name,
                last_synced_at = now()"
        }
    };

    let sql = format!(
        "INSERT INTO {schema}.dim_project (project_id, project_name, group_id, group_name)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (project_id) {conflict}"
    );

    sqlx::query(&sql)
        .bind(project.id)
        .bind(&project.name)
        .bind(project.group_id)
        .bind(&project.group_name)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn upsert_user(
    conn: &mut PgConnection,
    schema: &str,
    user: &UserRef,
    mode: RefreshMode,
) -> EtlResult<()> {
    let conflict = match mode {
        RefreshMode::FullRefresh => "DO NOTHING",
        RefreshMode::Incremental => {
            "DO UPDATE SET
                username = EXCLUDED.username,
                name = EXCLUDED.name,
                last_synced_at = now()"
        }
    };

    let sql = format!(
        "INSERT INTO {schema}.dim_users (user_id, username, name)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id) {conflict}"
    );

    sqlx::query(&sql)
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.name)
        .execute(conn)
        .await?;

    Ok(())
}

/// Upsert the milestone dimension and return its id for the fact FK.
pub async fn upsert_milestone(
    conn: &mut PgConnection,
    schema: &str,
    milestone: &Milestone,
    project_id: i64,
    mode: RefreshMode,
) -> EtlResult<i64> {
    let conflict = match mode {
        RefreshMode::FullRefresh => "DO NOTHING",
        RefreshMode::Incremental => {
            "DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                start_date = EXCLUDED.start_date,
                due_date = EXCLUDED.due_date,
                state = EXCLUDED.state,
                project_id = EXCLUDED.project_id,
                last_synced_at = now()"
        }
    };

    let sql = format!(
        "INSERT INTO {schema}.dim_milestone
            (milestone_id, title, description, start_date, due_date, state, project_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (milestone_id) {conflict}"
    );

    sqlx::query(&sql)
        .bind(milestone.id)
        .bind(&milestone.title)
        .bind(&milestone.description)
        .bind(milestone.start_date)
        .bind(milestone.due_date)
        .bind(&milestone.state)
        .bind(project_id)
        .execute(conn)
        .await?;

    Ok(milestone.id)
}

/// Upsert a label by name and return its surrogate id.
///
/// The store generates the id, so this is insert-if-absent followed by
/// a select on the natural key. Two issues sharing a label name resolve
/// to the same single dimension row.
pub async fn upsert_label(
    conn: &mut PgConnection,
    schema: &str,
    name: &str,
) -> EtlResult<i64> {
    let insert = format!(
        "INSERT INTO {schema}.dim_labels (name) VALUES ($1) ON CONFLICT (name) DO NOTHING"
    );
    sqlx::query(&insert).bind(name).execute(&mut *conn).await?;

    let select = format!("SELECT label_id FROM {schema}.dim_labels WHERE name = $1");
    let (label_id,): (i64,) = sqlx::query_as(&select)
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    Ok(label_id)
}
