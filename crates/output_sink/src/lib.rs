//! # Output Sink
//!
//! 结果落地模块。
//!
//! 负责：
//! - 从出站队列消费 `WorkResult`
//! - 提交到配置的 `ResultStore`
//! - 单条提交失败只记录，不中断消费

pub mod metrics;
pub mod sink;
pub mod stores;

pub use contracts::{ResultStore, StoreConfig, StoreType, WorkResult};
pub use metrics::{SinkMetrics, SinkMetricsSnapshot};
pub use sink::{OutputSink, SinkReport};
pub use stores::{
    build_store, BuiltinStore, FileStore, FileStoreConfig, LogStore, MemoryStore, MemoryStoreHandle,
};
