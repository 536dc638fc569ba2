//! Fee relayer HTTP API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{ApiClient, FeeRelayerApi};
pub use error::{ClientError, ClientErrorType, ErrorData, ErrorDetail, ErrorType, FeeRelayerError};
pub use models::*;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
