//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 -> 管道 -> 存储 的 e2e 测试
//! - 并发提交下的序号唯一性与无丢失

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use bytes::Bytes;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{BackpressurePolicy, ContractError, QueueConfig, SelectionPolicy, WorkResult};
    use output_sink::{build_store, MemoryStore, MemoryStoreHandle};
    use pipeline::{Pipeline, PipelineReport, PipelineSettings, PipelineState};
    use worker_pool::{EchoWorker, UppercaseWorker, WorkerPool};

    fn echo_pool(policy: SelectionPolicy, seed: Option<u64>, ids: &[&str]) -> WorkerPool {
        let mut pool = WorkerPool::new(policy, seed);
        for id in ids {
            pool.register(Arc::new(EchoWorker::new(*id))).unwrap();
        }
        pool
    }

    fn settings(inbound: QueueConfig, dispatchers: usize) -> PipelineSettings {
        PipelineSettings {
            inbound,
            outbound: QueueConfig::bounded(10, BackpressurePolicy::Block),
            dispatchers,
        }
    }

    /// Results ordered by sequence number
    fn by_sequence(view: &MemoryStoreHandle) -> Vec<WorkResult> {
        let mut results = view.results();
        results.sort_by_key(|r| r.sequence);
        results
    }

    /// 100 个客户端各提交 100 个请求，经过容量为 10 的入站队列
    ///
    /// 验证：
    /// 1. 序号在所有客户端间唯一
    /// 2. stop 之后没有任何已接受的请求丢失
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_concurrent_clients() {
        let store = MemoryStore::new("memory");
        let view = store.handle();
        let pipeline = Pipeline::new(
            settings(QueueConfig::bounded(10, BackpressurePolicy::Block), 4),
            echo_pool(SelectionPolicy::Random, None, &["SVC1", "SVC2", "SVC3"]),
        );
        let handle = pipeline.start(store);

        let mut producers = Vec::new();
        for client_idx in 0..100 {
            let client = handle.client();
            producers.push(tokio::spawn(async move {
                let mut sequences = Vec::with_capacity(100);
                for i in 0..100 {
                    let seq = client
                        .submit(format!("client {client_idx} request #{i}"))
                        .await
                        .unwrap();
                    sequences.push(seq);
                }
                sequences
            }));
        }

        let mut accepted = HashSet::new();
        for producer in producers {
            for seq in producer.await.unwrap() {
                assert!(accepted.insert(seq), "sequence {seq} handed out twice");
            }
        }
        assert_eq!(accepted.len(), 10_000);

        let report = handle.stop().await;
        assert_eq!(report.state, PipelineState::Stopped);
        assert_eq!(report.submitted, 10_000);
        assert_eq!(report.committed, 10_000);
        assert_eq!(report.lost(), 0);
        assert!(report.is_balanced());
        assert!(report.inbound_high_water <= 10);
        assert_eq!(report.latency_ms.count, 10_000);

        let stored: HashSet<u64> = view.sequences().into_iter().collect();
        assert_eq!(stored, accepted);
    }

    /// 单个 dispatcher + round robin: 按注册顺序轮转
    #[tokio::test]
    async fn test_e2e_round_robin_order() {
        let store = MemoryStore::new("memory");
        let view = store.handle();
        let pipeline = Pipeline::new(
            settings(QueueConfig::unbounded(), 1),
            echo_pool(SelectionPolicy::RoundRobin, None, &["SVC1", "SVC2", "SVC3"]),
        );
        let handle = pipeline.start(store);

        for i in 1..=6 {
            handle.submit(format!("request #{i}")).await.unwrap();
        }
        handle.stop().await;

        let results = by_sequence(&view);
        let workers: Vec<&str> = results.iter().map(|r| r.worker_id.as_str()).collect();
        assert_eq!(workers, ["SVC1", "SVC2", "SVC3", "SVC1", "SVC2", "SVC3"]);
        assert_eq!(results[0].outcome, "SVC1 processed request: request #1");
    }

    /// 相同种子产生相同的分配序列
    #[tokio::test]
    async fn test_e2e_seeded_selection_is_reproducible() {
        async fn assignments(seed: u64) -> Vec<String> {
            let store = MemoryStore::new("memory");
            let view = store.handle();
            let pipeline = Pipeline::new(
                settings(QueueConfig::unbounded(), 1),
                echo_pool(SelectionPolicy::Random, Some(seed), &["SVC1", "SVC2", "SVC3"]),
            );
            let handle = pipeline.start(store);
            for i in 0..50 {
                handle.submit(format!("request #{i}")).await.unwrap();
            }
            handle.stop().await;
            by_sequence(&view)
                .into_iter()
                .map(|r| r.worker_id.to_string())
                .collect()
        }

        let first = assignments(42).await;
        assert_eq!(first.len(), 50);
        assert_eq!(first, assignments(42).await);
        // 50 次均匀选择不可能只落在一个 worker 上
        assert!(first.iter().collect::<HashSet<_>>().len() > 1);
    }

    /// Reject 策略：队列满时立即失败，已接受的请求照常完成
    #[tokio::test]
    async fn test_e2e_reject_policy() {
        let store = MemoryStore::new("memory");
        let view = store.handle();
        let pipeline = Pipeline::new(
            settings(QueueConfig::bounded(1, BackpressurePolicy::Reject), 1),
            echo_pool(SelectionPolicy::RoundRobin, None, &["SVC1"]),
        );
        let handle = pipeline.start(store);
        let client = handle.client();

        // current_thread runtime: dispatcher cannot run between these calls
        assert_eq!(client.try_submit("first").unwrap(), 0);
        assert!(matches!(
            client.submit("second").await,
            Err(ContractError::QueueFull { .. })
        ));
        assert_eq!(client.pending(), 1);

        let report = handle.stop().await;
        assert_eq!(report.submitted, 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.committed, 1);
        assert_eq!(view.sequences(), vec![0]);
    }

    /// N 个请求，其中 k 个处理失败 -> 存储中恰好 N - k 个结果
    #[tokio::test]
    async fn test_e2e_processing_failures_are_counted() {
        let store = MemoryStore::new("memory");
        let view = store.handle();
        let mut pool = WorkerPool::new(SelectionPolicy::RoundRobin, None);
        pool.register(Arc::new(UppercaseWorker::new("UP"))).unwrap();
        let handle = Pipeline::new(settings(QueueConfig::unbounded(), 2), pool).start(store);

        for i in 0..10 {
            let payload = if i % 4 == 0 {
                Bytes::from_static(&[0xff, 0xfe])
            } else {
                Bytes::from(format!("request #{i}"))
            };
            handle.submit(payload).await.unwrap();
        }
        let report: PipelineReport = handle.stop().await;

        assert_eq!(report.submitted, 10);
        assert_eq!(report.processing_failures, 3);
        assert_eq!(report.committed, 7);
        assert!(report.is_balanced());
        assert_eq!(view.len(), 7);
        assert!(view
            .results()
            .iter()
            .all(|r| r.outcome == r.payload_lossy().to_uppercase()));
    }

    /// 配置文件 -> Pipeline -> FileStore
    #[tokio::test]
    async fn test_e2e_config_to_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("results.jsonl");
        let config = format!(
            r#"
[inbound]
capacity = 4
backpressure = "block"

[dispatcher]
tasks = 2

[pool]
policy = "round_robin"

[[workers]]
id = "SVC1"

[[workers]]
id = "SVC2"
kind = "uppercase"

[store]
name = "audit"
store_type = "file"
params = {{ path = "{}", append = "false" }}
"#,
            output.display()
        );

        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();
        let store = build_store(&blueprint.store).unwrap();
        let handle = Pipeline::from_blueprint(&blueprint).unwrap().start(store);

        for i in 1..=8 {
            handle.submit(format!("request #{i}")).await.unwrap();
        }
        let report = handle.stop().await;
        assert_eq!(report.committed, 8);
        assert_eq!(report.dispatchers, 2);

        let content = std::fs::read_to_string(&output).unwrap();
        let records: Vec<serde_json::Value> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 8);

        let mut sequences: Vec<u64> = records
            .iter()
            .map(|r| r["sequence"].as_u64().unwrap())
            .collect();
        sequences.sort_unstable();
        assert_eq!(sequences, (0..8).collect::<Vec<_>>());

        for record in &records {
            let worker = record["worker_id"].as_str().unwrap();
            assert!(worker == "SVC1" || worker == "SVC2");
            assert!(record["committed_at"].as_str().unwrap().ends_with('Z'));
        }
    }

    /// 非法配置在启动前被拒绝
    #[test]
    fn test_invalid_configs_are_rejected() {
        let cases = [
            "[inbound]\ncapacity = 0\n",
            "[dispatcher]\ntasks = 0\n",
            "[[workers]]\nid = \"SVC1\"\n\n[[workers]]\nid = \"SVC1\"\n",
            "[[workers]]\nid = \"\"\n",
            "[store]\nname = \"\"\n",
        ];
        for case in cases {
            let err = ConfigLoader::load_from_str(case, ConfigFormat::Toml).unwrap_err();
            assert!(
                matches!(err, ContractError::ConfigValidation { .. }),
                "expected validation error for {case:?}, got {err}"
            );
        }

        let err = ConfigLoader::load_from_str("workers = 3", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    /// 空 worker 池：所有请求被计为 no_worker 丢弃
    #[tokio::test]
    async fn test_e2e_empty_pool() {
        let config = r#"{ "store": { "store_type": "memory" } }"#;
        let blueprint = ConfigLoader::load_from_str(config, ConfigFormat::Json).unwrap();
        let store = build_store(&blueprint.store).unwrap();
        let view = store.memory_handle().unwrap();
        let handle = Pipeline::from_blueprint(&blueprint).unwrap().start(store);

        for i in 0..3 {
            handle.submit(format!("request #{i}")).await.unwrap();
        }
        let report = handle.stop().await;
        assert_eq!(report.no_worker_drops, 3);
        assert_eq!(report.lost(), 3);
        assert!(report.is_balanced());
        assert!(view.is_empty());
    }
}
