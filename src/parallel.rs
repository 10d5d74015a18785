//! Scoped-thread fan-out.

use std::thread;

/// Runs `op` on every item in its own scoped thread and waits for all of them.
///
/// Results come back in input order. A panic in any worker is resumed on the
/// calling thread once all workers have finished.
pub fn fan_out<T, R, F>(items: &[T], op: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    match items {
        [] => Vec::new(),
        [only] => vec![op(only)],
        _ => thread::scope(|s| {
            let op = &op;
            let handles: Vec<_> = items
                .iter()
                .map(|item| s.spawn(move || op(item)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        }),
    }
}
