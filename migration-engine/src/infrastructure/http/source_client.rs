// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use migration_domain::entities::{Folder, Project, TestCase, TestCycle, TestExecution, TestStep};
use migration_domain::repositories::{EntityPage, SourceClient};
use migration_domain::{MigrationError, MigrationResult};

use super::Page;

fn http_err(err: reqwest::Error) -> MigrationError {
    if err.is_timeout() {
        MigrationError::TimeoutError(err.to_string())
    } else {
        MigrationError::IoError(err.to_string())
    }
}

pub struct HttpSourceClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    page_size: u32,
}

impl HttpSourceClient {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>, timeout: std::time::Duration, page_size: u32) -> MigrationResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(http_err)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_token: api_token.into(),
            page_size,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> MigrationResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.api_token)
            .query(query)
            .send()
            .await
            .map_err(http_err)?;
        let response = response.error_for_status().map_err(http_err)?;
        response.json().await.map_err(http_err)
    }

    /// Drives `GET {path}?page=N&page_size=M` into a lazy, finite stream.
    /// Pagination state (`page`, `done`) lives in the stream's closure, so
    /// the caller sees a plain, non-restartable iterator (§6.1).
    fn paginate<'a, T>(&'a self, path: &'a str) -> EntityPage<'a, T>
    where
        T: serde::de::DeserializeOwned + Send + 'a,
    {
        let state = (self, 0u32, false);
        stream::unfold(state, move |(client, page, done)| async move {
            if done {
                return None;
            }
            let query = [("page", page.to_string()), ("page_size", client.page_size.to_string())];
            match client.get_json::<Page<T>>(path, &query).await {
                Ok(page_data) => {
                    let items: Vec<MigrationResult<T>> = page_data.items.into_iter().map(Ok).collect();
                    Some((stream::iter(items), (client, page + 1, !page_data.has_more)))
                }
                Err(err) => Some((stream::iter(vec![Err(err)]), (client, page, true))),
            }
        })
        .flatten()
        .boxed()
    }
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    async fn get_project(&self, key: &str) -> MigrationResult<Project> {
        self.get_json(&format!("projects/{key}"), &[]).await
    }

    fn get_folders(&self) -> EntityPage<'_, Folder> {
        self.paginate("folders")
    }

    fn get_test_cases(&self) -> EntityPage<'_, TestCase> {
        self.paginate("test-cases")
    }

    async fn get_test_steps(&self, case_id: &str) -> MigrationResult<Vec<TestStep>> {
        self.get_json(&format!("test-cases/{case_id}/steps"), &[]).await
    }

    fn get_test_cycles(&self) -> EntityPage<'_, TestCycle> {
        self.paginate("test-cycles")
    }

    fn get_test_executions(&self) -> EntityPage<'_, TestExecution> {
        self.paginate("test-executions")
    }

    async fn download_attachment(&self, id: &str) -> MigrationResult<Vec<u8>> {
        let response = self
            .client
            .get(self.url(&format!("attachments/{id}")))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(http_err)?;
        let response = response.error_for_status().map_err(http_err)?;
        Ok(response.bytes().await.map_err(http_err)?.to_vec())
    }

    async fn check_connection(&self) -> MigrationResult<bool> {
        let response = self.client.get(self.url("health")).bearer_auth(&self.api_token).send().await;
        Ok(matches!(response, Ok(r) if r.status().is_success()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn paginates_until_has_more_is_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/folders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "00000000-0000-0000-0000-000000000001", "source_id": "F-1", "project_key": "PROJ", "parent_source_id": null, "name": "Root", "kind": "test_case"}],
                "has_more": false,
            })))
            .mount(&server)
            .await;

        let client = HttpSourceClient::new(server.uri(), "token", std::time::Duration::from_secs(5), 50).unwrap();
        let folders: Vec<_> = client.get_folders().collect().await;
        assert_eq!(folders.len(), 1);
        assert!(folders[0].is_ok());
    }

    #[tokio::test]
    async fn check_connection_reports_false_on_unreachable_host() {
        let client = HttpSourceClient::new("http://127.0.0.1:1", "token", std::time::Duration::from_millis(50), 50).unwrap();
        assert!(!client.check_connection().await.unwrap());
    }
}
