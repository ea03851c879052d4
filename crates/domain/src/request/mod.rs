//! HTTP request domain types

mod method;
mod query;
mod resolved;
mod template;

pub use method::HttpMethod;
pub use query::QueryParam;
pub use resolved::ResolvedRequest;
pub use template::RequestTemplate;
