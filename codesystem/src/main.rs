use clap::Parser;
use codesystem::{cli::Args, run_workflow, WorkflowConfig};
use codesystem_sdk::{log_found, log_warning};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Worker credentials may live in a local .env
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config: WorkflowConfig = args.into();
    let summary = run_workflow(&config).await?;

    log_found!(summary.artifacts.len(), "reports written");
    for (source, error) in &summary.failed {
        log_warning!("{} failed: {}", source, error);
    }
    Ok(())
}
