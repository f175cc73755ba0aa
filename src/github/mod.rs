pub mod client;
pub mod comments;
pub mod error;
pub mod issues;
pub mod pagination;
pub mod rate_limit;
