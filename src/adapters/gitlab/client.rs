//! GitLab HTTP client.
//!
//! Wraps the GitLab REST API v4 and the GraphQL work-item query,
//! providing the typed operations behind the [`IssueTracker`] port.
//! Every request is timeout-bound at the client level and goes through
//! the bounded [`RetryPolicy`].

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::domain::errors::{EtlError, EtlResult};
use crate::domain::models::{GitLabConfig, HttpConfig, Issue, IssueDates, Note, Project};
use crate::domain::ports::IssueTracker;

use super::models::{
    DateQueryResponse, GitLabIssue, GitLabNote, GitLabProject, GraphqlRequest,
};
use super::retry::RetryPolicy;

/// Page size used for every paginated listing.
const PER_PAGE: usize = 100;

/// GraphQL query for the start/due-date widget of one issue.
const START_DUE_DATE_QUERY: &str = r"
query($fullPath: ID!, $iid: String!) {
  project(fullPath: $fullPath) {
    workItems(iids: [$iid], types: [ISSUE]) {
      nodes {
        widgets(onlyTypes: [START_AND_DUE_DATE]) {
          ... on WorkItemWidgetStartAndDueDate {
            startDate
            dueDate
          }
        }
      }
    }
  }
}
";

/// HTTP client for a GitLab instance.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_url: String,
    token: String,
    /// Full path scoping the work-item date query.
    project_full_path: String,
    retry: RetryPolicy,
}

impl GitLabClient {
    /// Build a client from configuration. The reqwest client carries the
    /// per-request timeout, so a hung endpoint costs at most
    /// `timeout * (1 + max_retries)` per call.
    pub fn new(gitlab: &GitLabConfig, http: &HttpConfig) -> EtlResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| EtlError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            http: client,
            base_url: gitlab.base_url.trim_end_matches('/').to_string(),
            token: gitlab.token.clone(),
            project_full_path: gitlab.project_full_path.clone(),
            retry: RetryPolicy::from_config(http),
        })
    }

    /// Probe the instance before the run starts. A failure here is
    /// fatal: there is no point iterating projects against a dead host.
    pub async fn verify_connection(&self) -> EtlResult<()> {
        let url = format!("{}/api/v4/version", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| EtlError::ConnectionFailed(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(EtlError::ConnectionFailed(format!(
                "GitLab version probe returned HTTP {}",
                resp.status()
            )))
        }
    }

    /// Single GET attempt, decoded as JSON.
    async fn get_json_once<T: DeserializeOwned>(&self, url: &str, context: &str) -> EtlResult<T> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| EtlError::TrackerRequest {
                context: context.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EtlError::TrackerStatus {
                status: status.as_u16(),
                context: context.to_string(),
                body,
            });
        }

        resp.json::<T>().await.map_err(|e| EtlError::MalformedPayload {
            context: context.to_string(),
            message: e.to_string(),
        })
    }

    /// Single GraphQL POST attempt.
    async fn post_graphql_once(
        &self,
        variables: &serde_json::Value,
        context: &str,
    ) -> EtlResult<DateQueryResponse> {
        let url = format!("{}/api/graphql", self.base_url);
        let body = GraphqlRequest {
            query: START_DUE_DATE_QUERY,
            variables: variables.clone(),
        };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| EtlError::TrackerRequest {
                context: context.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(EtlError::TrackerStatus {
                status: status.as_u16(),
                context: context.to_string(),
                body: body_text,
            });
        }

        resp.json::<DateQueryResponse>()
            .await
            .map_err(|e| EtlError::MalformedPayload {
                context: context.to_string(),
                message: e.to_string(),
            })
    }

    /// Fetch every page of a listing endpoint. `path_and_query` must
    /// already carry a query string so pagination params can append.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        context: &str,
    ) -> EtlResult<Vec<T>> {
        let mut all = Vec::new();
        let mut page: u32 = 1;

        loop {
            let url = format!(
                "{}{path_and_query}&per_page={PER_PAGE}&page={page}",
                self.base_url
            );
            let batch: Vec<T> = self
                .retry
                .execute(context, || self.get_json_once(&url, context))
                .await?;
            let fetched = batch.len();
            all.extend(batch);

            if fetched < PER_PAGE {
                return Ok(all);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl IssueTracker for GitLabClient {
    async fn fetch_project(&self, project_id: i64) -> EtlResult<Project> {
        let url = format!("{}/api/v4/projects/{project_id}", self.base_url);
        let context = format!("fetch_project {project_id}");
        let project: GitLabProject = self
            .retry
            .execute(&context, || self.get_json_once(&url, &context))
            .await?;
        Ok(project.into())
    }

    async fn list_issues(
        &self,
        project_id: i64,
        created_after: NaiveDate,
    ) -> EtlResult<Vec<Issue>> {
        let mut path =
            format!("/api/v4/projects/{project_id}/issues?order_by=created_at&sort=asc");
        if created_after > NaiveDate::MIN {
            path.push_str(&format!(
                "&created_after={}",
                created_after.format("%Y-%m-%d")
            ));
        }

        let context = format!("list_issues project={project_id}");
        let issues: Vec<GitLabIssue> = self.get_all_pages(&path, &context).await?;
        Ok(issues.into_iter().map(Into::into).collect())
    }

    async fn list_notes(&self, project_id: i64, issue_iid: i64) -> EtlResult<Vec<Note>> {
        let path = format!("/api/v4/projects/{project_id}/issues/{issue_iid}/notes?sort=asc");
        let context = format!("list_notes project={project_id} iid={issue_iid}");
        let notes: Vec<GitLabNote> = self.get_all_pages(&path, &context).await?;
        Ok(notes.into_iter().map(Into::into).collect())
    }

    async fn fetch_start_due_dates(&self, issue_iid: i64) -> EtlResult<IssueDates> {
        let context = format!("start_due_dates iid={issue_iid}");
        let variables = serde_json::json!({
            "fullPath": self.project_full_path,
            "iid": issue_iid.to_string(),
        });

        let resp = self
            .retry
            .execute(&context, || self.post_graphql_once(&variables, &context))
            .await?;
        Ok(resp.into_dates())
    }
}
