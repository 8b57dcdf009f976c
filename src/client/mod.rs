pub mod data_api;
pub mod endpoints;
pub mod http_client;
pub mod response;

pub use data_api::DataApi;
pub use http_client::{
    Credentials, HttpClient, HttpSettings, RequestBody, SessionInvalidated,
    SessionInvalidationHandler,
};
pub use response::ApiResponse;
