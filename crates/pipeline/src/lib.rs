//! # Pipeline
//!
//! 请求分发管道编排。
//!
//! ```text
//! Client ──submit──▶ [inbound] ──▶ Dispatcher × N ──▶ [outbound] ──▶ OutputSink ──▶ ResultStore
//!                                      │
//!                                  WorkerPool
//! ```
//!
//! ## 使用示例
//!
//! ```ignore
//! let pipeline = Pipeline::from_blueprint(&blueprint)?;
//! let handle = pipeline.start(LogStore::new("results"));
//!
//! handle.submit("request #1").await?;
//!
//! let report = handle.stop().await;
//! report.print_summary();
//! ```

mod client;
mod orchestrator;
mod stats;

pub use client::Client;
pub use orchestrator::{Pipeline, PipelineHandle, PipelineSettings, PipelineState};
pub use stats::PipelineReport;
