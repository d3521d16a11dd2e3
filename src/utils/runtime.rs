use anyhow::Result;

/// The status monitor is a single logical thread of control. Hour queries are I/O bound, so a
/// current-thread runtime is enough to have all of them in flight at once.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
