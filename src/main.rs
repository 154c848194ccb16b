use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

mod config;
mod constants;
mod dedup;
mod domain;
mod error;
mod logging;
mod normalize;
mod pipeline;
mod retry;
mod sources;
mod storage;

use crate::config::Config;
use crate::pipeline::EventPipeline;
use crate::sources::{FixtureSource, SourceCollaborator, SourceDescriptor, SourceRegistry};
use crate::storage::{CorpusStore, JsonFileStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hkjf_aggregator")]
#[command(about = "Hong Kong job fair event aggregator")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize and deduplicate captured source batches
    Collect {
        /// Specific sources to run (comma-separated). Available: labour_dept, hktdc, jobsdb
        #[arg(long)]
        sources: Option<String>,
        /// Directory holding capture files named {source_id}.json
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
    /// List the supported sources
    Sources,
}

fn descriptor_for(source_name: &str) -> Option<SourceDescriptor> {
    match source_name {
        constants::LABOUR_DEPT_SOURCE => Some(SourceDescriptor::labour_dept()),
        constants::HKTDC_SOURCE => Some(SourceDescriptor::hktdc()),
        constants::JOBSDB_SOURCE => Some(SourceDescriptor::jobsdb()),
        _ => None,
    }
}

fn create_source(source_name: &str, fixtures_dir: &Path) -> Option<Box<dyn SourceCollaborator>> {
    let descriptor = descriptor_for(source_name)?;
    let path = fixtures_dir.join(format!("{}.json", descriptor.source_id));
    Some(Box::new(FixtureSource::new(descriptor, path)))
}

fn build_registry(source_names: &[String], fixtures_dir: &Path) -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    for source_name in source_names {
        match create_source(source_name, fixtures_dir) {
            Some(source) => registry.register(source),
            None => {
                warn!("Unknown source specified");
                println!("⚠️  Unknown source: {}", source_name);
            }
        }
    }
    registry
}

async fn run_registry(registry: &SourceRegistry, pipeline: &EventPipeline) -> anyhow::Result<()> {
    for source in registry.iter() {
        let source_id = source.descriptor().source_id.clone();
        let span = tracing::info_span!("Running source", source = %source_id);
        let _enter = span.enter();

        info!("Starting pipeline");
        match pipeline.run_for_source(source).await {
            Ok(summary) => {
                info!("Pipeline finished");
                println!("\n📊 Run results for {}:", source_id);
                println!("   Total records: {}", summary.total_records);
                println!("   Accepted: {}", summary.accepted);
                println!("   Duplicates: {}", summary.duplicates);
                println!("   Rejected: {}", summary.rejected);

                if !summary.errors.is_empty() {
                    warn!("{} errors encountered during run", summary.errors.len());
                    println!("\n⚠️  Errors encountered:");
                    for error in &summary.errors {
                        println!("   - {}", error);
                    }
                }
            }
            Err(e) => {
                error!("Pipeline failed: {}", e);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load_or_default();

    match cli.command {
        Commands::Collect { sources, fixtures } => {
            println!("🔄 Running aggregation pipeline...");

            let source_names: Vec<String> = if let Some(source_list) = sources {
                source_list
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect()
            } else {
                config.aggregator.sources.clone()
            };

            let fixtures_dir =
                fixtures.unwrap_or_else(|| config.aggregator.data_dir.join("fixtures"));
            let registry = build_registry(&source_names, &fixtures_dir);
            let store: Arc<dyn CorpusStore> =
                Arc::new(JsonFileStore::new(config.aggregator.data_dir.clone()));
            let pipeline = EventPipeline::new(store, &config);

            run_registry(&registry, &pipeline).await?;
        }
        Commands::Sources => {
            println!("Supported sources:");
            for source_name in constants::get_supported_sources() {
                if let Some(descriptor) = descriptor_for(source_name) {
                    println!(
                        "   {} -> {} ({})",
                        source_name, descriptor.source_id, descriptor.name
                    );
                }
            }
        }
    }
    Ok(())
}
