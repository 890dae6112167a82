//! 配置校验模块
//!
//! 校验规则：
//! - worker id 非空且唯一
//! - 有界队列容量 > 0
//! - dispatcher 任务数 >= 1
//! - store 名称非空
//!
//! 空 worker 列表合法，但会产生警告。

use std::collections::HashSet;

use contracts::{ContractError, PipelineBlueprint, QueueConfig, SelectionPolicy, StoreType};

/// 校验 PipelineBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    validate_worker_ids(blueprint)?;
    validate_queue("inbound", &blueprint.inbound)?;
    validate_queue("outbound", &blueprint.outbound)?;
    validate_dispatcher(blueprint)?;
    validate_store(blueprint)?;
    Ok(())
}

/// 收集不影响运行的配置警告
pub fn warnings(blueprint: &PipelineBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.workers.is_empty() {
        warnings.push("no workers configured: every submitted item will be dropped".to_string());
    }
    if blueprint.pool.policy == SelectionPolicy::RoundRobin && blueprint.pool.seed.is_some() {
        warnings.push("pool.seed is ignored by the round_robin policy".to_string());
    }
    if blueprint.store.store_type == StoreType::File && !blueprint.store.params.contains_key("path")
    {
        warnings.push("file store has no 'path' param, using ./results.jsonl".to_string());
    }

    warnings
}

/// 校验 worker id 非空且唯一
fn validate_worker_ids(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, worker) in blueprint.workers.iter().enumerate() {
        if worker.id.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("workers[{idx}].id"),
                "worker id cannot be empty",
            ));
        }
        if !seen.insert(worker.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("workers[id={}]", worker.id),
                "duplicate worker id",
            ));
        }
    }
    Ok(())
}

/// 校验队列容量
fn validate_queue(name: &str, queue: &QueueConfig) -> Result<(), ContractError> {
    if queue.capacity == Some(0) {
        return Err(ContractError::config_validation(
            format!("{name}.capacity"),
            "capacity must be > 0 (omit it for an unbounded queue)",
        ));
    }
    Ok(())
}

/// 校验 dispatcher 任务数
fn validate_dispatcher(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    if blueprint.dispatcher.tasks == 0 {
        return Err(ContractError::config_validation(
            "dispatcher.tasks",
            "at least one dispatcher task is required",
        ));
    }
    Ok(())
}

/// 校验 store 配置
fn validate_store(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    if blueprint.store.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "store.name",
            "store name cannot be empty",
        ));
    }
    Ok(())
}
