use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use flow_graph_editor::runner::EXPORT_FILE_NAME;
use flow_graph_editor::server::{self, ServerConfig};
use flow_graph_editor::{
    Editor, FlowSnapshot, GraphRunner, GraphStore, HttpFlowClient, LayeredLayout, NewFlow,
    RunOutcome, RunnerConfig, ValidatedStore, ValidationSeverity,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Flow graph editor core: persistence service and flow file tools
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the /flows persistence API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// JSON file to persist flows to
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Render the markdown and separator nodes of a flow file
    Export {
        flow: PathBuf,
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },
    /// Simulate a workflow run over a flow file
    Run {
        flow: PathBuf,
        /// Node id to start from
        #[arg(long)]
        start: Option<String>,
        /// Simulated processing time per node
        #[arg(long, default_value_t = 2000)]
        step_ms: u64,
    },
    /// Auto-layout a flow file
    Layout {
        flow: PathBuf,
        /// Write here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report structural problems in a flow file
    Check { flow: PathBuf },
    /// Download a flow from a running service
    Pull {
        id: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
    },
    /// Upload a flow file to a running service under a new name
    Push {
        flow: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flow_graph_editor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { host, port, store } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if store.is_some() {
                config.store_path = store;
            }

            tracing::info!("Starting flow service on {}", config.addr());
            server::serve(config).await
        }
        Command::Export { flow, output } => export(&flow, &output).await,
        Command::Run {
            flow,
            start,
            step_ms,
        } => run(&flow, start.as_deref(), Duration::from_millis(step_ms)).await,
        Command::Layout { flow, output } => layout(&flow, output.as_deref().unwrap_or(flow.as_path())).await,
        Command::Check { flow } => check(&flow),
        Command::Pull { id, output, server } => pull(&id, &output, &server).await,
        Command::Push {
            flow,
            name,
            description,
            server,
        } => push(&flow, name, description, &server).await,
    }
}

async fn export(flow: &Path, output: &Path) -> Result<()> {
    let store = FlowSnapshot::load(flow)?.into_store().shared();
    let report = GraphRunner::default().run(&store, None).await;

    match report.outcome {
        RunOutcome::Exported { document } => {
            fs::write(output, document)
                .with_context(|| format!("Failed to write export: {}", output.display()))?;
            println!("{}", report.log.join("\n"));
            Ok(())
        }
        RunOutcome::NoStartNode => bail!("No starting node found in the workflow"),
        _ => bail!("{} has no markdown or separator nodes", flow.display()),
    }
}

async fn run(flow: &Path, start: Option<&str>, step_delay: Duration) -> Result<()> {
    let store = FlowSnapshot::load(flow)?.into_store().shared();
    let runner = Arc::new(GraphRunner::new(RunnerConfig { step_delay }));

    let stopper = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                runner.stop();
            }
        })
    };

    let report = runner.run(&store, start).await;
    stopper.abort();

    for line in &report.log {
        println!("{line}");
    }

    match report.outcome {
        RunOutcome::Exported { document } => {
            fs::write(EXPORT_FILE_NAME, document)
                .with_context(|| format!("Failed to write export: {EXPORT_FILE_NAME}"))?;
            Ok(())
        }
        RunOutcome::NoStartNode => bail!("No starting node found in the workflow"),
        _ => Ok(()),
    }
}

async fn layout(flow: &Path, output: &Path) -> Result<()> {
    let store = FlowSnapshot::load(flow)?.into_store().shared();
    let editor = Editor::new(store, Arc::new(LayeredLayout::default()));

    editor.auto_layout().await?;
    editor.snapshot().save(output)?;

    println!("Laid out {} nodes into {}", editor.snapshot().nodes.len(), output.display());
    Ok(())
}

fn check(flow: &Path) -> Result<()> {
    let store = FlowSnapshot::load(flow)?.into_store();
    let result = store.validate();

    for issue in &result.issues {
        let level = match issue.severity {
            ValidationSeverity::Info => "info",
            ValidationSeverity::Warning => "warning",
            ValidationSeverity::Error => "error",
        };
        println!("{level}: {}", issue.message);
    }

    if !result.is_valid() {
        bail!("{} has {} error(s)", flow.display(), result.errors().len());
    }

    println!("{} is valid", flow.display());
    Ok(())
}

async fn pull(id: &str, output: &Path, server: &str) -> Result<()> {
    let client = HttpFlowClient::new(server)?;
    let editor = Editor::new(GraphStore::new().shared(), Arc::new(LayeredLayout::default()));

    let flow = editor.load_flow(id, &client).await?;
    editor.snapshot().save(output)?;

    println!("Saved flow '{}' to {}", flow.name, output.display());
    Ok(())
}

async fn push(flow: &Path, name: String, description: Option<String>, server: &str) -> Result<()> {
    let client = HttpFlowClient::new(server)?;
    let snapshot = FlowSnapshot::load(flow)?;

    let new_flow = NewFlow {
        description,
        ..NewFlow::named(name)
    }
    .with_graph(snapshot);
    let created = client.create(&new_flow).await?;

    println!("Created flow '{}' with id {}", created.name, created.id);
    Ok(())
}
