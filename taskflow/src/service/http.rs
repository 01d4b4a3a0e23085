//! HTTP record service client.
//!
//! Posts JSON bodies to `{base}/api/records/{resource}/{operation}` and
//! decodes the JSON reply. Optional project id and public key are sent as
//! headers on every request.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use taskflow_proto::Resource;
use taskflow_proto::record::{
    DeleteParams, DeleteResponse, FetchParams, FetchResponse, MutationResponse,
    PROJECT_ID_HEADER, PUBLIC_KEY_HEADER, RecordsParams,
};
use url::Url;

use super::{RecordService, ServiceError};

/// Maximum number of body bytes kept in a [`ServiceError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Record service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpService {
    client: reqwest::Client,
    base: Url,
    project_id: Option<String>,
    public_key: Option<String>,
}

impl HttpService {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidUrl`] if the URL does not parse or is
    /// not `http`/`https`, and [`ServiceError::Unreachable`] if the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let mut base = Url::parse(base_url).map_err(|e| ServiceError::InvalidUrl(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ServiceError::InvalidUrl(format!(
                "unsupported scheme `{}`",
                base.scheme()
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            base,
            project_id: None,
            public_key: None,
        })
    }

    /// Sends the given credentials with every request.
    #[must_use]
    pub fn with_credentials(
        mut self,
        project_id: Option<String>,
        public_key: Option<String>,
    ) -> Self {
        self.project_id = project_id;
        self.public_key = public_key;
        self
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, resource: Resource, operation: &str) -> Result<Url, ServiceError> {
        self.base
            .join(&format!("api/records/{resource}/{operation}"))
            .map_err(|e| ServiceError::InvalidUrl(e.to_string()))
    }

    async fn call<B, R>(
        &self,
        resource: Resource,
        operation: &str,
        body: &B,
    ) -> Result<R, ServiceError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(resource, operation)?;
        let mut request = self.client.post(url).json(body);
        if let Some(project_id) = &self.project_id {
            request = request.header(PROJECT_ID_HEADER, project_id);
        }
        if let Some(public_key) = &self.public_key {
            request = request.header(PUBLIC_KEY_HEADER, public_key);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response.json::<R>().await.map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else if e.is_decode() {
        ServiceError::Decode(e.to_string())
    } else {
        ServiceError::Unreachable(e.to_string())
    }
}

impl RecordService for HttpService {
    async fn fetch(
        &self,
        resource: Resource,
        params: FetchParams,
    ) -> Result<FetchResponse, ServiceError> {
        self.call(resource, "fetch", &params).await
    }

    async fn create(
        &self,
        resource: Resource,
        params: RecordsParams,
    ) -> Result<MutationResponse, ServiceError> {
        self.call(resource, "create", &params).await
    }

    async fn update(
        &self,
        resource: Resource,
        params: RecordsParams,
    ) -> Result<MutationResponse, ServiceError> {
        self.call(resource, "update", &params).await
    }

    async fn delete(
        &self,
        resource: Resource,
        params: DeleteParams,
    ) -> Result<DeleteResponse, ServiceError> {
        self.call(resource, "delete", &params).await
    }
}
