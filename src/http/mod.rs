//! HTTP layer
//!
//! - `transport`: the injectable request executor (`reqwest` by default)
//! - `interceptor`: before-send / response / error hooks
//! - `response`: body normalization and diagnostic rendering
//! - `params`: query/body parameters
//! - `url`: base address handling

pub mod interceptor;
pub mod params;
pub mod response;
pub mod transport;
pub mod url;

pub use interceptor::{HttpInterceptor, HttpRequestContext, LoggingInterceptor};
pub use params::Params;
pub use response::{ApiResponse, BodyKind, NormalizedBody, ResponseBody};
pub use transport::{
    HttpMethod, HttpTransport, HttpTransportRequest, HttpTransportResponse, ReqwestTransport,
};
