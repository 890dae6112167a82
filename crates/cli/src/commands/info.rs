//! `info` command implementation.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use config_loader::{ConfigFormat, ConfigLoader};
use contracts::{PipelineBlueprint, QueueConfig};

use super::run::capacity_label;
use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    inbound: QueueInfo,
    outbound: QueueInfo,
    dispatchers: usize,
    pool: PoolInfo,
    workers: Vec<WorkerInfo>,
    store: StoreInfo,
}

#[derive(Serialize)]
struct QueueInfo {
    capacity: String,
    backpressure: String,
}

impl From<&QueueConfig> for QueueInfo {
    fn from(queue: &QueueConfig) -> Self {
        Self {
            capacity: capacity_label(queue.capacity),
            backpressure: format!("{:?}", queue.backpressure),
        }
    }
}

#[derive(Serialize)]
struct PoolInfo {
    policy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct WorkerInfo {
    id: String,
    kind: String,
}

#[derive(Serialize)]
struct StoreInfo {
    name: String,
    store_type: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let blueprint = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.resolved {
        let format = if args.json {
            ConfigFormat::Json
        } else {
            ConfigFormat::Toml
        };
        let rendered =
            ConfigLoader::render(&blueprint, format).context("Failed to render configuration")?;
        println!("{}", rendered);
    } else if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &PipelineBlueprint) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        inbound: QueueInfo::from(&blueprint.inbound),
        outbound: QueueInfo::from(&blueprint.outbound),
        dispatchers: blueprint.dispatcher.tasks,
        pool: PoolInfo {
            policy: format!("{:?}", blueprint.pool.policy),
            seed: blueprint.pool.seed,
        },
        workers: blueprint
            .workers
            .iter()
            .map(|w| WorkerInfo {
                id: w.id.to_string(),
                kind: format!("{:?}", w.kind),
            })
            .collect(),
        store: StoreInfo {
            name: blueprint.store.name.clone(),
            store_type: format!("{:?}", blueprint.store.store_type),
            params: blueprint.store.params.clone(),
        },
    }
}

fn print_config_info(blueprint: &PipelineBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Dispatch Pipeline Configuration                ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📥 Queues");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!(
        "   ├─ Inbound: {} ({:?})",
        capacity_label(blueprint.inbound.capacity),
        blueprint.inbound.backpressure
    );
    println!(
        "   └─ Outbound: {} ({:?})",
        capacity_label(blueprint.outbound.capacity),
        blueprint.outbound.backpressure
    );

    println!("\n⚙️  Dispatch");
    println!("   ├─ Dispatcher tasks: {}", blueprint.dispatcher.tasks);
    match blueprint.pool.seed {
        Some(seed) => println!("   └─ Selection: {:?} (seed {})", blueprint.pool.policy, seed),
        None => println!("   └─ Selection: {:?}", blueprint.pool.policy),
    }

    println!("\n👷 Workers ({})", blueprint.workers.len());
    for (i, worker) in blueprint.workers.iter().enumerate() {
        let is_last = i == blueprint.workers.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        println!("   {} {} ({:?})", prefix, worker.id, worker.kind);
    }

    let store = &blueprint.store;
    println!("\n📤 Store");
    if store.params.is_empty() {
        println!("   └─ {} ({:?})", store.name, store.store_type);
    } else {
        println!("   ├─ {} ({:?})", store.name, store.store_type);
        let mut params: Vec<_> = store.params.iter().collect();
        params.sort();
        for (i, (key, value)) in params.iter().enumerate() {
            let prefix = if i == params.len() - 1 { "└─" } else { "├─" };
            println!("   {} {} = {}", prefix, key, value);
        }
    }

    println!();
}
