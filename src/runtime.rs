//! Background runtime for async completion hooks.
//!
//! The refresh control awaits its deactivation hook off the UI thread and
//! resumes on the next frame. A single shared worker thread is enough; the
//! runtime is created on first use and lives for the process.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::Runtime;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("refreshable-scroll-bg")
            .enable_time()
            .build()
            .expect("failed to build background runtime")
    })
}

/// Spawn a future onto the shared background runtime.
pub(crate) fn spawn<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime().spawn(future);
}
