pub mod error;
pub mod fetcher;
pub mod reshape;
pub mod response_cache;
pub mod retry;
pub mod session;
