//! Load orchestrator.
//!
//! Top-level sequencing of the run: schema bootstrap, optional
//! truncation, then project by project, issue by issue. Each issue's
//! dimension upserts and fact inserts commit as one transaction, so
//! readers of the warehouse never observe a partially loaded issue.
//!
//! Per-call degradation policy: a failed date query or note listing is
//! logged and the issue loads without those fields; only startup
//! connection failures and project-level listing failures abort the
//! run.

use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::adapters::postgres::{dimensions, facts, schema};
use crate::domain::errors::EtlResult;
use crate::domain::models::{Config, Issue, IssueDates, Project, RefreshMode, Role};
use crate::domain::ports::IssueTracker;
use crate::services::classifier::classify;
use crate::services::participants::resolve_commenters;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunSummary {
    pub projects: usize,
    pub issues: usize,
    pub date_enrichment_failures: usize,
    pub comment_lookup_failures: usize,
}

/// Drives a full extraction run against one tracker and one warehouse.
pub struct LoadOrchestrator<'a, T: IssueTracker + ?Sized> {
    tracker: &'a T,
    pool: &'a PgPool,
    config: &'a Config,
}

impl<'a, T: IssueTracker + ?Sized> LoadOrchestrator<'a, T> {
    pub fn new(tracker: &'a T, pool: &'a PgPool, config: &'a Config) -> Self {
        Self {
            tracker,
            pool,
            config,
        }
    }

    /// Run the pipeline end to end and return the counters.
    pub async fn run(&self) -> EtlResult<RunSummary> {
        let schema_name = &self.config.warehouse.schema;

        schema::ensure_tables(self.pool, schema_name).await?;
        if self.config.run.refresh == RefreshMode::FullRefresh {
            schema::truncate_all(self.pool, schema_name).await?;
            info!("warehouse truncated for full refresh");
        }

        let mut summary = RunSummary::default();
        let total = self.config.run.project_ids.len();

        for (idx, &project_id) in self.config.run.project_ids.iter().enumerate() {
            let project = self.tracker.fetch_project(project_id).await?;
            info!(
                project = %project.name,
                project_id = project.id,
                "processing project {} of {total}",
                idx + 1
            );
            self.load_project(&project, &mut summary).await?;
            summary.projects += 1;
        }

        Ok(summary)
    }

    async fn load_project(&self, project: &Project, summary: &mut RunSummary) -> EtlResult<()> {
        let schema_name = &self.config.warehouse.schema;
        let mode = self.config.run.refresh;

        // The project dimension lands before any of its issues so their
        // fact rows always have a referent.
        let mut conn = self.pool.acquire().await?;
        dimensions::upsert_project(&mut conn, schema_name, project, mode).await?;
        drop(conn);

        let issues = self
            .tracker
            .list_issues(project.id, self.config.run.created_after)
            .await?;
        info!(count = issues.len(), project_id = project.id, "issues listed");

        for issue in &issues {
            self.load_issue(project, issue, summary).await?;
            summary.issues += 1;
        }

        Ok(())
    }

    /// Load one issue as a single atomic unit.
    ///
    /// Both external lookups happen before the transaction opens; a
    /// database transaction never waits on the network.
    async fn load_issue(
        &self,
        project: &Project,
        issue: &Issue,
        summary: &mut RunSummary,
    ) -> EtlResult<()> {
        let schema_name = &self.config.warehouse.schema;
        let mode = self.config.run.refresh;

        let dates = match self.tracker.fetch_start_due_dates(issue.iid).await {
            Ok(dates) => dates,
            Err(err) => {
                warn!(
                    iid = issue.iid,
                    error = %err,
                    "date enrichment failed, issue loads without start/due dates"
                );
                summary.date_enrichment_failures += 1;
                IssueDates::default()
            }
        };

        let commenters = match resolve_commenters(self.tracker, issue).await {
            Ok(commenters) => commenters,
            Err(err) => {
                warn!(
                    issue_key = %issue.key(),
                    error = %err,
                    "comment listing failed, issue loads without commenter rows"
                );
                summary.comment_lookup_failures += 1;
                Vec::new()
            }
        };

        let mut tx = self.pool.begin().await?;

        let key = dimensions::upsert_issue(&mut tx, schema_name, issue, dates, mode).await?;

        let milestone_id = match &issue.milestone {
            Some(milestone) => Some(
                dimensions::upsert_milestone(&mut tx, schema_name, milestone, issue.project_id, mode)
                    .await?,
            ),
            None => None,
        };

        if mode == RefreshMode::Incremental {
            facts::delete_issue_facts(&mut tx, schema_name, &key).await?;
        }

        facts::insert_issue_fact(&mut tx, schema_name, &key, project.id, milestone_id).await?;

        for label in &issue.labels {
            let label_id = dimensions::upsert_label(&mut tx, schema_name, label).await?;
            facts::insert_label_fact(&mut tx, schema_name, &key, label_id).await?;
        }

        let classification = classify(&issue.labels);

        if let Some(assignee) = &issue.assignee {
            dimensions::upsert_user(&mut tx, schema_name, assignee, mode).await?;
            facts::insert_participation(
                &mut tx,
                schema_name,
                &key,
                assignee.id,
                project.id,
                Role::Assignee,
                &classification,
            )
            .await?;
        }

        for commenter in &commenters {
            dimensions::upsert_user(&mut tx, schema_name, commenter, mode).await?;
            facts::insert_participation(
                &mut tx,
                schema_name,
                &key,
                commenter.id,
                project.id,
                Role::Commenter,
                &classification,
            )
            .await?;
        }

        if let Some(author) = &issue.author {
            dimensions::upsert_user(&mut tx, schema_name, author, mode).await?;
            facts::insert_participation(
                &mut tx,
                schema_name,
                &key,
                author.id,
                project.id,
                Role::Creator,
                &classification,
            )
            .await?;
        }

        tx.commit().await?;
        debug!(issue_key = %key, "issue committed");
        Ok(())
    }
}
