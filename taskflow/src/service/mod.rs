//! Record service abstraction for `TaskFlow`.
//!
//! Defines the [`RecordService`] trait: the four generic calls of the hosted
//! record service. Concrete implementations:
//! - [`http::HttpService`]: JSON over HTTP to a remote service
//! - [`local::LocalService`]: in-process record tables, used for the demo
//!   mode and tests

pub mod http;
pub mod local;

use taskflow_proto::Resource;
use taskflow_proto::record::{
    DeleteParams, DeleteResponse, FetchParams, FetchResponse, MutationResponse, RecordsParams,
};

/// Transport-level failures of a record service call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service could not be reached.
    #[error("record service unreachable: {0}")]
    Unreachable(String),

    /// The call did not complete within the configured timeout.
    #[error("record service request timed out")]
    Timeout,

    /// The service answered with a non-success HTTP status.
    #[error("record service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("undecodable record service response: {0}")]
    Decode(String),

    /// The configured service URL is unusable.
    #[error("invalid record service url: {0}")]
    InvalidUrl(String),
}

/// Async interface to a record service.
///
/// Implementations carry raw record shapes only; turning them into domain
/// types is the job of [`crate::records::RecordClient`].
pub trait RecordService: Send + Sync {
    /// Fetches records of `resource` matching `params`.
    fn fetch(
        &self,
        resource: Resource,
        params: FetchParams,
    ) -> impl std::future::Future<Output = Result<FetchResponse, ServiceError>> + Send;

    /// Creates the given records.
    fn create(
        &self,
        resource: Resource,
        params: RecordsParams,
    ) -> impl std::future::Future<Output = Result<MutationResponse, ServiceError>> + Send;

    /// Updates the given records, merging fields by `Id`.
    fn update(
        &self,
        resource: Resource,
        params: RecordsParams,
    ) -> impl std::future::Future<Output = Result<MutationResponse, ServiceError>> + Send;

    /// Deletes the listed record ids.
    fn delete(
        &self,
        resource: Resource,
        params: DeleteParams,
    ) -> impl std::future::Future<Output = Result<DeleteResponse, ServiceError>> + Send;
}
