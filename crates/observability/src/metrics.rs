//! Pipeline 指标收集模块
//!
//! 通过 `metrics` facade 记录队列、分发与存储指标；未安装 recorder 时
//! 所有调用均为空操作。

use metrics::{counter, gauge, histogram};

/// 记录客户端提交成功
pub fn record_item_submitted(queue: &str) {
    counter!(
        "dispatch_pipeline_items_submitted_total",
        "queue" => queue.to_string()
    )
    .increment(1);
}

/// 记录客户端提交被拒绝 (`full` / `closed`)
pub fn record_submit_rejected(queue: &str, reason: &'static str) {
    counter!(
        "dispatch_pipeline_submits_rejected_total",
        "queue" => queue.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// 记录 WorkItem 被某个 worker 处理
pub fn record_item_dispatched(worker_id: &str) {
    counter!(
        "dispatch_pipeline_items_dispatched_total",
        "worker_id" => worker_id.to_string()
    )
    .increment(1);
}

/// 记录 WorkItem 在分发阶段被丢弃
///
/// `reason`: `no_worker` / `processing_failed` / `forward_rejected`
pub fn record_item_dropped(reason: &'static str) {
    counter!("dispatch_pipeline_items_dropped_total", "reason" => reason).increment(1);
}

/// 记录结果提交到存储
pub fn record_result_committed(store: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "dispatch_pipeline_results_committed_total",
        "store" => store.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 记录队列深度
pub fn record_queue_depth(queue: &str, depth: usize) {
    gauge!(
        "dispatch_pipeline_queue_depth",
        "queue" => queue.to_string()
    )
    .set(depth as f64);
}

/// 记录单次 worker 处理耗时
pub fn record_processing_latency_ms(worker_id: &str, latency_ms: f64) {
    histogram!(
        "dispatch_pipeline_processing_latency_ms",
        "worker_id" => worker_id.to_string()
    )
    .record(latency_ms);
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
///
/// 每个 dispatcher 任务持有一份，停止时通过 `merge` 汇总。
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 合并另一份统计 (Chan et al. 并行公式)
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        let mean = self.mean + delta * other.count as f64 / total as f64;
        let m2 = self.m2
            + other.m2
            + delta * delta * (self.count as f64 * other.count as f64) / total as f64;

        self.count = total;
        self.mean = mean;
        self.m2 = m2;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}
