use std::future::Future;

use tracing::warn;

use crate::error::FetchResult;

/// Retry policy of authenticated GETs: only a 401 is retried, and each retry
/// is preceded by a credential refresh.
#[derive(Debug, Clone, Copy)]
pub struct RefreshRetry {
    pub max_retries: u32,
}

impl RefreshRetry {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Run `operation` with `token`, at most `max_retries + 1` times.
    ///
    /// Any failure other than 401 ends the loop after that attempt. A failed
    /// `refresh` ends it as well, with the refresh error.
    pub async fn run<T, Op, OpFut, Refresh, RefreshFut>(
        &self,
        mut token: String,
        mut operation: Op,
        mut refresh: Refresh,
    ) -> FetchResult<T>
    where
        Op: FnMut(String) -> OpFut,
        OpFut: Future<Output = FetchResult<T>>,
        Refresh: FnMut() -> RefreshFut,
        RefreshFut: Future<Output = FetchResult<String>>,
    {
        let mut remaining = self.max_retries;

        loop {
            match operation(token.clone()).await {
                Err(e) if e.is_unauthorized() && remaining > 0 => {
                    remaining -= 1;
                    warn!("Token rejected ({e}), refreshing; {remaining} retries left after this one");
                    token = refresh().await?;
                }
                other => return other,
            }
        }
    }
}
