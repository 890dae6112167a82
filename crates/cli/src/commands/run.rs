//! `run` command implementation.

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::{info, warn};

use config_loader::ConfigLoader;
use contracts::{ContractError, PipelineBlueprint};
use output_sink::build_store;
use pipeline::{Client, Pipeline};

use crate::cli::RunArgs;
use crate::error::CliError;

/// Outcome of feeding payloads into the pipeline
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct FeedSummary {
    accepted: u64,
    refused: u64,
}

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    // Load and parse configuration
    let mut blueprint = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args);
    ConfigLoader::validate(&blueprint).context("Invalid configuration after CLI overrides")?;
    for warning in ConfigLoader::warnings(&blueprint) {
        warn!(warning = %warning, "Configuration warning");
    }

    let payloads = load_payloads(args)?;

    info!(
        workers = blueprint.workers.len(),
        dispatchers = blueprint.dispatcher.tasks,
        policy = ?blueprint.pool.policy,
        store = %blueprint.store.name,
        payloads = payloads.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint, payloads.len());
        return Ok(());
    }

    // Initialize Metrics (optional)
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    let pipeline = Pipeline::from_blueprint(&blueprint).context("Failed to build worker pool")?;
    let store = build_store(&blueprint.store).context("Failed to create result store")?;
    let handle = pipeline.start(store);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!(producers = args.producers.max(1), "Submitting payloads...");

    tokio::select! {
        summary = feed(handle.client(), payloads, args.producers) => {
            info!(
                accepted = summary.accepted,
                refused = summary.refused,
                "All payloads submitted"
            );
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
            handle.close();
        }
    }

    let report = handle.stop().await;
    info!(
        submitted = report.submitted,
        committed = report.committed,
        lost = report.lost(),
        duration_secs = report.duration.as_secs_f64(),
        throughput = %format!("{:.2}", report.throughput()),
        "Pipeline completed"
    );

    // Print detailed statistics
    report.print_summary();

    info!("Dispatch pipeline finished");
    Ok(())
}

/// Apply CLI overrides on top of the loaded configuration
fn apply_overrides(blueprint: &mut PipelineBlueprint, args: &RunArgs) {
    if let Some(dispatchers) = args.dispatchers {
        info!(dispatchers, "Overriding dispatcher count from CLI");
        blueprint.dispatcher.tasks = dispatchers;
    }
    if let Some(seed) = args.seed {
        info!(seed, "Overriding selection seed from CLI");
        blueprint.pool.seed = Some(seed);
    }
}

/// Payloads from `--input`, or `--items` generated requests
fn load_payloads(args: &RunArgs) -> Result<Vec<String>> {
    match &args.input {
        Some(path) => {
            let content =
                std::fs::read_to_string(path).map_err(|e| CliError::input(path, e))?;
            Ok(content
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect())
        }
        None => Ok((1..=args.items).map(|i| format!("request #{i}")).collect()),
    }
}

/// Submit payloads from `producers` concurrent tasks
///
/// Payloads are dealt out round-robin, so each producer submits its share in
/// input order. A full queue under the reject policy refuses the payload and
/// the producer moves on; a closed queue ends the producer.
async fn feed(client: Client, payloads: Vec<String>, producers: usize) -> FeedSummary {
    let producers = producers.max(1);
    let mut shares: Vec<Vec<String>> = vec![Vec::new(); producers];
    for (i, payload) in payloads.into_iter().enumerate() {
        shares[i % producers].push(payload);
    }

    let mut tasks = JoinSet::new();
    for share in shares {
        let client = client.clone();
        tasks.spawn(async move {
            let mut summary = FeedSummary::default();
            for payload in share {
                match client.submit(payload).await {
                    Ok(_) => summary.accepted += 1,
                    Err(ContractError::QueueClosed { .. }) => break,
                    Err(e) => {
                        summary.refused += 1;
                        warn!(error = %e, "Payload refused");
                    }
                }
            }
            summary
        });
    }

    let mut total = FeedSummary::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(summary) => {
                total.accepted += summary.accepted;
                total.refused += summary.refused;
            }
            Err(e) => warn!(error = %e, "Producer task failed"),
        }
    }
    total
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &PipelineBlueprint, payloads: usize) {
    println!("\n=== Configuration Summary ===\n");
    println!("Queues:");
    println!(
        "  Inbound: {} ({:?})",
        capacity_label(blueprint.inbound.capacity),
        blueprint.inbound.backpressure
    );
    println!(
        "  Outbound: {} ({:?})",
        capacity_label(blueprint.outbound.capacity),
        blueprint.outbound.backpressure
    );
    println!("\nDispatchers: {}", blueprint.dispatcher.tasks);
    println!("Selection: {:?}", blueprint.pool.policy);
    println!("\nWorkers ({}):", blueprint.workers.len());
    for worker in &blueprint.workers {
        println!("  - {} ({:?})", worker.id, worker.kind);
    }
    println!(
        "\nStore: {} ({:?})",
        blueprint.store.name, blueprint.store.store_type
    );
    println!("Payloads: {payloads}");
    println!();
}

pub(crate) fn capacity_label(capacity: Option<usize>) -> String {
    capacity.map_or_else(|| "unbounded".to_string(), |cap| cap.to_string())
}
