pub mod fetcher;
pub mod http_client;
pub mod policy;
