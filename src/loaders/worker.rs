use futures::channel::oneshot;
use std::thread;

use super::error::LoadError;

/// Result of one asset load as delivered to the main thread
pub type LoadResult<T> = Result<T, LoadError>;

/// Pending load: resolves once the worker finishes decoding
pub type PendingLoad<T> = oneshot::Receiver<LoadResult<T>>;

/// Run `job` on a dedicated worker thread and return the future of its result.
///
/// If the thread cannot be spawned the sender is dropped with the closure,
/// and the receiver resolves as cancelled.
pub fn spawn_load<T, F>(label: &str, job: F) -> PendingLoad<T>
where
    T: Send + 'static,
    F: FnOnce() -> LoadResult<T> + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    let spawned = thread::Builder::new()
        .name(format!("load:{label}"))
        .spawn(move || {
            // receiver gone means the scene was torn down
            let _ = sender.send(job());
        });

    if let Err(e) = spawned {
        log::warn!("Could not start loader thread for {}: {}", label, e);
    }

    receiver
}

/// Like [`spawn_load`], but decodes once and delivers the result to
/// `fanout` independent receivers.
pub fn spawn_shared_load<T, F>(label: &str, fanout: usize, job: F) -> Vec<PendingLoad<T>>
where
    T: Clone + Send + 'static,
    F: FnOnce() -> LoadResult<T> + Send + 'static,
{
    let (senders, receivers): (Vec<_>, Vec<_>) = (0..fanout).map(|_| oneshot::channel()).unzip();

    let spawned = thread::Builder::new()
        .name(format!("load:{label}"))
        .spawn(move || {
            let result = job();
            for sender in senders {
                let _ = sender.send(result.clone());
            }
        });

    if let Err(e) = spawned {
        log::warn!("Could not start loader thread for {}: {}", label, e);
    }

    receivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_spawn_load_delivers_result() {
        let pending = spawn_load("answer", || Ok(42u32));
        assert_eq!(block_on(pending).unwrap(), Ok(42));
    }

    #[test]
    fn test_spawn_load_delivers_error() {
        let pending = spawn_load::<u32, _>("broken", || Err(LoadError::Abandoned("x".into())));
        assert!(block_on(pending).unwrap().is_err());
    }

    #[test]
    fn test_shared_load_fans_out() {
        let pending = spawn_shared_load("shared", 2, || Ok(String::from("model")));
        assert_eq!(pending.len(), 2);
        for receiver in pending {
            assert_eq!(block_on(receiver).unwrap(), Ok(String::from("model")));
        }
    }
}
