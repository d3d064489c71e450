pub mod detail_cache;
pub mod ttl_cache;
