//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        capacity = ?blueprint.queue.capacity,
        overflow = ?blueprint.queue.overflow,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_messages: if args.max_messages == 0 {
            None
        } else {
            Some(args.max_messages)
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);
    let stats = pipeline.run().await.context("Pipeline execution failed")?;

    info!(
        dispatched = stats.pipeline.dispatched,
        failures = stats.pipeline.total_failures(),
        duration_secs = stats.duration.as_secs_f64(),
        "Pipeline completed successfully"
    );
    stats.print_summary();

    info!("Logfan finished");
    Ok(())
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::PipelineBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Queue:");
    match blueprint.queue.capacity {
        Some(capacity) => println!(
            "  Capacity: {} ({:?} on overflow)",
            capacity, blueprint.queue.overflow
        ),
        None => println!("  Capacity: unbounded"),
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }
}
