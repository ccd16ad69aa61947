use tokio::task::JoinHandle;

/// Spawn a panel task on the current runtime.
pub fn spawn_task<F>(future: F) -> JoinHandle<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::task::spawn(future)
}

/// Run blocking I/O (the HTTP agents) on the blocking pool.
pub fn spawn_blocking_task<F, R>(func: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(func)
}

/// Abort every handle in `tasks`, leaving the vector empty.
pub fn abort_all(tasks: &mut Vec<JoinHandle<()>>) {
    for task in tasks.drain(..) {
        task.abort();
    }
}
