//! # Worker Pool
//!
//! 工作者注册表与选择策略。
//!
//! 负责：
//! - 启动时注册可互换的 worker（id 唯一）
//! - 按策略选择 worker：随机（可注入种子）/ 轮询
//! - 内置 worker 实现（Echo / Uppercase）
//!
//! Selection never tracks per-worker load. Load-aware balancing plugs in
//! through `SelectionStrategy` and `WorkerPool::with_strategy`.

mod pool;
mod strategy;
mod workers;

pub use contracts::{SelectionPolicy, Worker, WorkerConfig, WorkerId, WorkerKind};
pub use pool::WorkerPool;
pub use strategy::{strategy_for, RandomStrategy, RoundRobinStrategy, SelectionStrategy};
pub use workers::{build_worker, EchoWorker, UppercaseWorker};
