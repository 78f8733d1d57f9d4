//! Stream session management and monitor loop for ndtail.

mod monitor;
mod observer;

pub use monitor::StreamMonitor;
pub use observer::StreamObserver;
