pub mod common;

mod detail_cache_flow;
