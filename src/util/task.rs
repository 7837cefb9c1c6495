use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Run `future`, turning a panic into `Err` with the panic message.
///
/// Spawned loads use this so a panic surfaces as a failed load instead of a
/// task that silently vanishes.
pub(crate) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future).catch_unwind().await.map_err(|panic| {
        if let Some(s) = panic.downcast_ref::<&'static str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_value_through() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_captures_panic_message() {
        let result = catch_task_panic(async {
            panic!("feed exploded");
        })
        .await;
        assert_eq!(result, Err::<(), _>("feed exploded".to_string()));

        let id = 3;
        let result = catch_task_panic(async move {
            panic!("item {} exploded", id);
        })
        .await;
        assert_eq!(result, Err::<(), _>("item 3 exploded".to_string()));
    }
}
