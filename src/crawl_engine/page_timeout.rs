//! Timeout utilities for page operations
//!
//! Navigation, login submits and settle waits all go through
//! [`with_page_timeout`] so a hung page turns into an ordinary error.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Wrap an async page operation with an explicit timeout.
///
/// The error names `operation_name` and the limit, which is what ends up in
/// the per-page failure log line.
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout_secs: u64,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(Duration::from_secs(timeout_secs), operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {timeout_secs} seconds"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_operation_times_out_with_named_error() {
        let err = with_page_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(120)).await;
                Ok(())
            },
            60,
            "Page navigation",
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Page navigation timeout after 60 seconds");
    }

    #[tokio::test]
    async fn inner_errors_pass_through() {
        let err = with_page_timeout::<_, ()>(async { Err(anyhow::anyhow!("boom")) }, 5, "op")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
