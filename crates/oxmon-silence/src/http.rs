//! HTTP client for the backend silence-window API.

use async_trait::async_trait;

use crate::api::{CreatedWindow, SilenceWindowApi};
use crate::error::{ApiError, ApiResult};
use crate::window::{SilenceWindow, WindowPayload};

/// Client for `{base_url}/api/silence-windows`.
pub struct HttpSilenceApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSilenceApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn windows_url(&self) -> String {
        format!("{}/api/silence-windows", self.base_url)
    }
}

async fn into_api_error(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SilenceWindowApi for HttpSilenceApi {
    async fn list(&self) -> ApiResult<Vec<SilenceWindow>> {
        let response = self.client.get(self.windows_url()).send().await?;
        let response = into_api_error(response).await?;
        response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn create(&self, payload: &WindowPayload) -> ApiResult<CreatedWindow> {
        let response = self
            .client
            .post(self.windows_url())
            .json(payload)
            .send()
            .await?;
        let response = into_api_error(response).await?;

        // Some deployments answer 201 with an empty body; treat that the
        // same as a body without an id.
        let body = response.text().await.unwrap_or_default();
        if body.trim().is_empty() {
            return Ok(CreatedWindow::default());
        }
        serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        let url = format!("{}/{id}", self.windows_url());
        let response = self.client.delete(url).send().await?;
        into_api_error(response).await?;
        Ok(())
    }
}
