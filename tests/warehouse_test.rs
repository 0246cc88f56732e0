//! End-to-end pipeline tests against a live PostgreSQL instance.
//!
//! Ignored by default. Run with a scratch database:
//!
//! ```sh
//! ISSUESTAR_TEST_DATABASE_URL=postgres://localhost:5432/issuestar_test \
//!     cargo test --test warehouse_test -- --ignored
//! ```
//!
//! Each test works in its own schema namespace and drops it first, so
//! tests can run concurrently and reruns start clean.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use sqlx::PgPool;

use issuestar::domain::errors::{EtlError, EtlResult};
use issuestar::domain::models::{
    Config, Issue, IssueDates, Milestone, Note, Project, RefreshMode, RunConfig, UserRef,
    WarehouseConfig,
};
use issuestar::domain::ports::IssueTracker;
use issuestar::services::LoadOrchestrator;

const PROJECT_ID: i64 = 10;

/// In-memory tracker fed with fixture data.
struct FakeTracker {
    project: Project,
    issues: Vec<Issue>,
    notes: HashMap<i64, Vec<Note>>,
    dates: HashMap<i64, IssueDates>,
    fail_dates: bool,
}

impl FakeTracker {
    fn new(issues: Vec<Issue>) -> Self {
        Self {
            project: Project {
                id: PROJECT_ID,
                name: "fixture".to_string(),
                group_id: Some(3),
                group_name: Some("analytics".to_string()),
            },
            issues,
            notes: HashMap::new(),
            dates: HashMap::new(),
            fail_dates: false,
        }
    }

    fn with_notes(mut self, iid: i64, notes: Vec<Note>) -> Self {
        self.notes.insert(iid, notes);
        self
    }

    fn with_dates(mut self, iid: i64, dates: IssueDates) -> Self {
        self.dates.insert(iid, dates);
        self
    }

    fn failing_dates(mut self) -> Self {
        self.fail_dates = true;
        self
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn fetch_project(&self, _project_id: i64) -> EtlResult<Project> {
        Ok(self.project.clone())
    }

    async fn list_issues(
        &self,
        project_id: i64,
        _created_after: NaiveDate,
    ) -> EtlResult<Vec<Issue>> {
        Ok(self
            .issues
            .iter()
            .filter(|issue| issue.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_notes(&self, _project_id: i64, issue_iid: i64) -> EtlResult<Vec<Note>> {
        Ok(self.notes.get(&issue_iid).cloned().unwrap_or_default())
    }

    async fn fetch_start_due_dates(&self, issue_iid: i64) -> EtlResult<IssueDates> {
        if self.fail_dates {
            return Err(EtlError::TrackerStatus {
                status: 500,
                context: "work item dates".to_string(),
                body: "fixture failure".to_string(),
            });
        }
        Ok(self.dates.get(&issue_iid).copied().unwrap_or_default())
    }
}

fn user(id: i64, username: &str) -> UserRef {
    UserRef {
        id,
        username: username.to_string(),
        name: username.to_uppercase(),
    }
}

fn note(author: UserRef, system: bool) -> Note {
    Note { author, system }
}

fn issue(iid: i64, labels: &[&str]) -> Issue {
    Issue {
        id: 1_000 + iid,
        iid,
        project_id: PROJECT_ID,
        title: format!("issue {iid}"),
        description: Some("body".to_string()),
        state: "opened".to_string(),
        created_at: Utc.with_ymd_and_hms(2025, 5, 2, 10, 30, 0).unwrap(),
        closed_at: None,
        issue_type: Some("issue".to_string()),
        labels: labels.iter().map(ToString::to_string).collect(),
        milestone: None,
        assignee: None,
        author: None,
    }
}

fn config(schema: &str, refresh: RefreshMode) -> Config {
    let url = std::env::var("ISSUESTAR_TEST_DATABASE_URL")
        .expect("set ISSUESTAR_TEST_DATABASE_URL to run warehouse tests");
    Config {
        warehouse: WarehouseConfig {
            url,
            schema: schema.to_string(),
            max_connections: 2,
        },
        run: RunConfig {
            project_ids: vec![PROJECT_ID],
            created_after: NaiveDate::MIN,
            refresh,
        },
        ..Config::default()
    }
}

/// Connect and drop any leftover schema from a previous run.
async fn fresh_pool(config: &Config) -> PgPool {
    let pool = issuestar::adapters::postgres::create_pool(&config.warehouse)
        .await
        .expect("warehouse pool");
    sqlx::query(&format!(
        "DROP SCHEMA IF EXISTS {} CASCADE",
        config.warehouse.schema
    ))
    .execute(&pool)
    .await
    .expect("drop schema");
    pool
}

async fn count(pool: &PgPool, schema: &str, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT count(*) FROM {schema}.{table}"))
        .fetch_one(pool)
        .await
        .expect("count query")
}

#[tokio::test]
#[ignore = "needs a live PostgreSQL instance"]
async fn full_refresh_loads_dimensions_and_facts() {
    let mut first = issue(1, &["bug", "PGD - Onboarding***Review"]);
    first.assignee = Some(user(100, "ana"));
    first.author = Some(user(101, "ben"));
    first.milestone = Some(Milestone {
        id: 7,
        title: "Q2".to_string(),
        description: None,
        start_date: NaiveDate::from_ymd_opt(2025, 4, 1),
        due_date: NaiveDate::from_ymd_opt(2025, 6, 30),
        state: "active".to_string(),
    });
    let second = issue(2, &[]);

    let tracker = FakeTracker::new(vec![first, second])
        .with_notes(
            1,
            vec![
                note(user(102, "cara"), false),
                note(user(103, "gitlab-bot"), true),
            ],
        )
        .with_dates(
            1,
            IssueDates {
                start: NaiveDate::from_ymd_opt(2025, 5, 5),
                due: NaiveDate::from_ymd_opt(2025, 5, 20),
            },
        );

    let config = config("istest_full", RefreshMode::FullRefresh);
    let pool = fresh_pool(&config).await;
    let schema = config.warehouse.schema.as_str();

    let summary = LoadOrchestrator::new(&tracker, &pool, &config)
        .run()
        .await
        .expect("run");

    assert_eq!(summary.projects, 1);
    assert_eq!(summary.issues, 2);
    assert_eq!(summary.date_enrichment_failures, 0);

    assert_eq!(count(&pool, schema, "dim_issues").await, 2);
    assert_eq!(count(&pool, schema, "dim_project").await, 1);
    assert_eq!(count(&pool, schema, "dim_milestone").await, 1);
    assert_eq!(count(&pool, schema, "fact_issues").await, 2);
    // Assignee + real commenter + creator for issue 1; the system note
    // author never becomes a participant.
    assert_eq!(count(&pool, schema, "fact_issue_participation").await, 3);

    let (start, due): (Option<NaiveDate>, Option<NaiveDate>) = sqlx::query_as(&format!(
        "SELECT start_date, due_date FROM {schema}.dim_issues WHERE issue_pk = '10-1'"
    ))
    .fetch_one(&pool)
    .await
    .expect("dates row");
    assert_eq!(start, NaiveDate::from_ymd_opt(2025, 5, 5));
    assert_eq!(due, NaiveDate::from_ymd_opt(2025, 5, 20));

    let (process, activity): (Option<String>, Option<String>) = sqlx::query_as(&format!(
        "SELECT process, activity FROM {schema}.fact_issue_participation
         WHERE issue_pk = '10-1' AND role = 'Commenter'"
    ))
    .fetch_one(&pool)
    .await
    .expect("participation row");
    assert_eq!(process.as_deref(), Some("Onboarding"));
    assert_eq!(activity.as_deref(), Some("Review"));

    let bare_milestone: Option<i64> = sqlx::query_scalar(&format!(
        "SELECT milestone_id FROM {schema}.fact_issues WHERE issue_pk = '10-2'"
    ))
    .fetch_one(&pool)
    .await
    .expect("milestone column");
    assert_eq!(bare_milestone, None);

    pool.close().await;
}

#[tokio::test]
#[ignore = "needs a live PostgreSQL instance"]
async fn duplicate_commenter_notes_yield_one_participation_row() {
    let ana = user(100, "ana");
    let tracker = FakeTracker::new(vec![issue(1, &[])]).with_notes(
        1,
        vec![
            note(ana.clone(), false),
            note(ana.clone(), false),
            note(ana, false),
        ],
    );

    let config = config("istest_dedup", RefreshMode::FullRefresh);
    let pool = fresh_pool(&config).await;
    let schema = config.warehouse.schema.as_str();

    LoadOrchestrator::new(&tracker, &pool, &config)
        .run()
        .await
        .expect("run");

    let commenter_rows: i64 = sqlx::query_scalar(&format!(
        "SELECT count(*) FROM {schema}.fact_issue_participation WHERE role = 'Commenter'"
    ))
    .fetch_one(&pool)
    .await
    .expect("count");
    assert_eq!(commenter_rows, 1);
    assert_eq!(count(&pool, schema, "dim_users").await, 1);

    pool.close().await;
}

#[tokio::test]
#[ignore = "needs a live PostgreSQL instance"]
async fn shared_label_produces_one_dimension_row() {
    let tracker = FakeTracker::new(vec![
        issue(1, &["backend", "bug"]),
        issue(2, &["backend"]),
    ]);

    let config = config("istest_labels", RefreshMode::FullRefresh);
    let pool = fresh_pool(&config).await;
    let schema = config.warehouse.schema.as_str();

    LoadOrchestrator::new(&tracker, &pool, &config)
        .run()
        .await
        .expect("run");

    assert_eq!(count(&pool, schema, "dim_labels").await, 2);
    assert_eq!(count(&pool, schema, "fact_issue_labels").await, 3);

    let shared: i64 = sqlx::query_scalar(&format!(
        "SELECT count(*) FROM {schema}.fact_issue_labels fil
         JOIN {schema}.dim_labels dl ON dl.label_id = fil.label_id
         WHERE dl.name = 'backend'"
    ))
    .fetch_one(&pool)
    .await
    .expect("count");
    assert_eq!(shared, 2);

    pool.close().await;
}

#[tokio::test]
#[ignore = "needs a live PostgreSQL instance"]
async fn failed_date_query_degrades_to_null_dates() {
    let tracker = FakeTracker::new(vec![issue(1, &[])]).failing_dates();

    let config = config("istest_degrade", RefreshMode::FullRefresh);
    let pool = fresh_pool(&config).await;
    let schema = config.warehouse.schema.as_str();

    let summary = LoadOrchestrator::new(&tracker, &pool, &config)
        .run()
        .await
        .expect("run survives the failed date query");

    assert_eq!(summary.issues, 1);
    assert_eq!(summary.date_enrichment_failures, 1);

    let (start, due): (Option<NaiveDate>, Option<NaiveDate>) = sqlx::query_as(&format!(
        "SELECT start_date, due_date FROM {schema}.dim_issues WHERE issue_pk = '10-1'"
    ))
    .fetch_one(&pool)
    .await
    .expect("issue row still written");
    assert_eq!(start, None);
    assert_eq!(due, None);

    pool.close().await;
}

#[tokio::test]
#[ignore = "needs a live PostgreSQL instance"]
async fn incremental_rerun_does_not_duplicate_facts() {
    let mut one = issue(1, &["bug"]);
    one.assignee = Some(user(100, "ana"));
    let tracker = FakeTracker::new(vec![one]);

    let config = config("istest_rerun", RefreshMode::Incremental);
    let pool = fresh_pool(&config).await;
    let schema = config.warehouse.schema.as_str();

    let orchestrator = LoadOrchestrator::new(&tracker, &pool, &config);
    orchestrator.run().await.expect("first run");
    orchestrator.run().await.expect("second run");

    assert_eq!(count(&pool, schema, "dim_issues").await, 1);
    assert_eq!(count(&pool, schema, "fact_issues").await, 1);
    assert_eq!(count(&pool, schema, "fact_issue_labels").await, 1);
    assert_eq!(count(&pool, schema, "fact_issue_participation").await, 1);

    pool.close().await;
}

#[tokio::test]
#[ignore = "needs a live PostgreSQL instance"]
async fn full_refresh_rerun_rebuilds_from_scratch() {
    let tracker = FakeTracker::new(vec![issue(1, &["bug"])]);

    let config = config("istest_truncate", RefreshMode::FullRefresh);
    let pool = fresh_pool(&config).await;
    let schema = config.warehouse.schema.as_str();

    let orchestrator = LoadOrchestrator::new(&tracker, &pool, &config);
    orchestrator.run().await.expect("first run");
    orchestrator.run().await.expect("second run");

    assert_eq!(count(&pool, schema, "dim_issues").await, 1);
    assert_eq!(count(&pool, schema, "fact_issues").await, 1);

    pool.close().await;
}
