// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

use async_trait::async_trait;
use serde::Deserialize;

use migration_domain::entities::{Module, TargetProject, TargetTestCase, TargetTestCycle, TestLog, TestRun};
use migration_domain::repositories::TargetClient;
use migration_domain::{MigrationError, MigrationResult};

fn http_err(err: reqwest::Error) -> MigrationError {
    if err.is_timeout() {
        MigrationError::TimeoutError(err.to_string())
    } else {
        MigrationError::IoError(err.to_string())
    }
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

pub struct HttpTargetClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl HttpTargetClient {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>, timeout: std::time::Duration) -> MigrationResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(http_err)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_token: api_token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    async fn post_for_id(&self, path: &str, body: &impl serde::Serialize) -> MigrationResult<String> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await
            .map_err(http_err)?;
        let response = response.error_for_status().map_err(http_err)?;
        Ok(response.json::<Created>().await.map_err(http_err)?.id)
    }

    async fn delete(&self, path: &str) -> MigrationResult<()> {
        let response = self.client.delete(self.url(path)).bearer_auth(&self.api_token).send().await.map_err(http_err)?;
        response.error_for_status().map_err(http_err)?;
        Ok(())
    }
}

#[async_trait]
impl TargetClient for HttpTargetClient {
    async fn create_module(&self, module: &Module) -> MigrationResult<String> {
        self.post_for_id("modules", module).await
    }

    async fn create_test_case(&self, case: &TargetTestCase) -> MigrationResult<String> {
        self.post_for_id("test-cases", case).await
    }

    async fn create_test_cycle(&self, cycle: &TargetTestCycle) -> MigrationResult<String> {
        self.post_for_id("test-cycles", cycle).await
    }

    async fn create_test_run(&self, run: &TestRun) -> MigrationResult<String> {
        self.post_for_id("test-runs", run).await
    }

    async fn submit_test_log(&self, run_id: &str, log: &TestLog) -> MigrationResult<()> {
        let response = self
            .client
            .post(self.url(&format!("test-runs/{run_id}/logs")))
            .bearer_auth(&self.api_token)
            .json(log)
            .send()
            .await
            .map_err(http_err)?;
        response.error_for_status().map_err(http_err)?;
        Ok(())
    }

    async fn upload_attachment(&self, object_type: &str, object_id: &str, file_path: &std::path::Path) -> MigrationResult<()> {
        let bytes = tokio::fs::read(file_path).await?;
        let filename = file_path.file_name().and_then(|n| n.to_str()).unwrap_or("attachment").to_string();
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename);
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(self.url(&format!("{object_type}/{object_id}/attachments")))
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(http_err)?;
        response.error_for_status().map_err(http_err)?;
        Ok(())
    }

    async fn delete_test_run(&self, id: &str) -> MigrationResult<()> {
        self.delete(&format!("test-runs/{id}")).await
    }

    async fn delete_test_cycle(&self, id: &str) -> MigrationResult<()> {
        self.delete(&format!("test-cycles/{id}")).await
    }

    async fn delete_test_case(&self, id: &str) -> MigrationResult<()> {
        self.delete(&format!("test-cases/{id}")).await
    }

    async fn check_connection(&self) -> MigrationResult<bool> {
        let response = self.client.get(self.url("health")).bearer_auth(&self.api_token).send().await;
        Ok(matches!(response, Ok(r) if r.status().is_success()))
    }

    async fn get_project(&self, id: &str) -> MigrationResult<TargetProject> {
        let response = self.client.get(self.url(&format!("projects/{id}"))).bearer_auth(&self.api_token).send().await.map_err(http_err)?;
        let response = response.error_for_status().map_err(http_err)?;
        response.json().await.map_err(http_err)
    }
}
