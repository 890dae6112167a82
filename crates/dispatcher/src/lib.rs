//! # Dispatcher
//!
//! 请求分发模块。
//!
//! 负责：
//! - 从入站队列消费 `WorkItem`
//! - 通过 `WorkerPool` 选择 worker 并处理
//! - 将 `WorkResult` 转发到出站队列
//! - 单条失败只丢弃该条目，不中断主循环

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;

pub use contracts::{WorkItem, WorkResult};
pub use dispatcher::{Dispatcher, DispatcherReport, DispatcherState};
pub use error::DispatchError;
pub use handle::{merged_latency, DispatcherGroup};
pub use metrics::{DispatcherMetrics, DispatcherMetricsSnapshot};
