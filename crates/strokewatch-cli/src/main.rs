mod display;
mod workbook;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use strokewatch_client::{OutcomePromptRequest, ServiceClient, Workbook};
use strokewatch_core::{AgentPatientResult, GroundTruthRow, OutcomeEnvironment};
use strokewatch_reconcile::{PatientOutcomeEntry, TruthLookup, reconcile};
use strokewatch_run::{MAX_BATCH, MergedResults, Orchestrator, RunEvent, select_batch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strokewatch", version, about = "Stroke prediction runs and outcome reconciliation")]
struct Cli {
    #[command(flatten)]
    service: ServiceArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ServiceArgs {
    /// Base URL of the agent service
    #[arg(
        long,
        global = true,
        env = "STROKEWATCH_SERVICE_URL",
        default_value = "http://localhost:8000"
    )]
    service_url: String,

    /// Outcome environment: clinical-trial or routine-care
    #[arg(
        long,
        global = true,
        env = "STROKEWATCH_ENVIRONMENT",
        default_value = "clinical-trial"
    )]
    environment: OutcomeEnvironment,

    /// Instructions passed to the agent with every request
    #[arg(long, global = true, env = "STROKEWATCH_INSTRUCTIONS", default_value = "")]
    instructions: String,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a batch of patients, then reconcile the results
    Run {
        #[command(flatten)]
        source: WorkbookSource,

        /// Index of the first patient to classify
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Patients to classify (at most 5)
        #[arg(long, default_value_t = MAX_BATCH)]
        count: usize,

        /// Save merged results for a later `reconcile`
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print the raw response log
        #[arg(long)]
        show_log: bool,

        #[command(flatten)]
        output: OutcomeArgs,
    },

    /// Reconcile saved agent results against ground truth
    Reconcile {
        /// Agent results JSON
        #[arg(long)]
        results: PathBuf,

        #[command(flatten)]
        source: WorkbookSource,

        #[command(flatten)]
        output: OutcomeArgs,
    },

    /// Check that the agent service is reachable
    Health,
}

/// Where the patients and ground truth come from. Exactly one is required.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct WorkbookSource {
    /// Workbook JSON with `patients` and `groundTruth`
    #[arg(long)]
    input: Option<PathBuf>,

    /// Use the service's built-in sample workbook
    #[arg(long)]
    sample: bool,

    /// Upload a CSV or XLSX file for the service to convert
    #[arg(long, value_name = "FILE")]
    upload: Option<PathBuf>,
}

impl WorkbookSource {
    async fn load(&self, client: &ServiceClient) -> anyhow::Result<Workbook> {
        let workbook = if let Some(path) = &self.input {
            workbook::load_workbook(path)?
        } else if let Some(path) = &self.upload {
            upload(client, path).await?
        } else {
            client
                .sample_data()
                .await
                .with_context(|| format!("fetching sample data from {}", client.base_url()))?
        };
        info!(
            patients = workbook.patients.len(),
            ground_truth = workbook.ground_truth.len(),
            "workbook loaded"
        );
        Ok(workbook)
    }
}

async fn upload(client: &ServiceClient, path: &Path) -> anyhow::Result<Workbook> {
    client
        .upload_workbook(path)
        .await
        .with_context(|| format!("uploading {}", path.display()))
}

#[derive(Args)]
struct OutcomeArgs {
    /// Print the rendered prompt for each patient
    #[arg(long)]
    show_prompts: bool,

    /// Send each rendered prompt to the outcome-prompt endpoint
    #[arg(long)]
    dispatch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    info!("strokewatch v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let client = ServiceClient::new(cli.service.service_url.clone());

    match cli.command {
        Command::Run {
            source,
            start,
            count,
            save,
            show_log,
            output,
        } => {
            let workbook = source.load(&client).await?;
            cmd_run(client, &cli.service, workbook, start, count, save, show_log, &output).await
        }
        Command::Reconcile {
            results,
            source,
            output,
        } => {
            let workbook = source.load(&client).await?;
            let results = workbook::load_results(&results)?;
            info!(results = results.len(), "loaded agent results");
            cmd_reconcile(
                &client,
                cli.service.environment,
                &results,
                &workbook.ground_truth,
                &output,
            )
            .await
        }
        Command::Health => cmd_health(&client).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn cmd_run(
    client: ServiceClient,
    service: &ServiceArgs,
    workbook: Workbook,
    start: usize,
    count: usize,
    save: Option<PathBuf>,
    show_log: bool,
    output: &OutcomeArgs,
) -> anyhow::Result<()> {
    let batch = select_batch(&workbook.patients, start, count)?;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            eprintln!("{}", display::format_event(&event));
            if matches!(event, RunEvent::Finished { .. }) {
                break;
            }
        }
    });

    let orchestrator = Orchestrator::new(client).with_events(tx);
    let mut merged = MergedResults::new();
    let report = orchestrator
        .run(
            &batch,
            &workbook.ground_truth,
            &service.instructions,
            &mut merged,
        )
        .await;
    printer.await.context("progress printer task")?;

    print!("{}", display::format_run_summary(&report));
    if show_log {
        println!();
        print!("{}", display::format_response_log(&report));
    }
    println!();

    let results = merged.ordered();
    if let Some(path) = &save {
        workbook::save_results(path, &results)?;
        eprintln!("  Saved {} result(s) to {}", results.len(), path.display());
    }

    cmd_reconcile(
        orchestrator.classifier(),
        service.environment,
        &results,
        &workbook.ground_truth,
        output,
    )
    .await
}

async fn cmd_reconcile(
    client: &ServiceClient,
    environment: OutcomeEnvironment,
    results: &[AgentPatientResult],
    ground_truth: &[GroundTruthRow],
    output: &OutcomeArgs,
) -> anyhow::Result<()> {
    let truth = TruthLookup::from_rows(ground_truth);
    let reconciliation = reconcile(results, &truth, environment);
    info!(
        entries = reconciliation.entries.len(),
        environment = %environment,
        "reconciliation complete"
    );

    display::print_reconciliation(
        &reconciliation,
        &truth.summary(),
        environment,
        output.show_prompts,
    );

    if output.dispatch {
        dispatch_prompts(client, environment, &reconciliation.entries).await;
    }
    Ok(())
}

/// Send prompts one at a time in entry order. Failures are logged and counted.
async fn dispatch_prompts(
    client: &ServiceClient,
    environment: OutcomeEnvironment,
    entries: &[PatientOutcomeEntry],
) {
    let mut sent = 0usize;
    let mut failed = 0usize;
    for entry in entries {
        let request = prompt_request(entry, environment);
        match client.send_outcome_prompt(&request).await {
            Ok(ack) => {
                info!(patient_id = %entry.patient_id, status = %ack.status, "prompt dispatched");
                sent += 1;
            }
            Err(e) => {
                warn!(patient_id = %entry.patient_id, error = %e, "prompt dispatch failed");
                failed += 1;
            }
        }
    }
    eprintln!("  Dispatched {sent} prompt(s), {failed} failed");
}

fn prompt_request(entry: &PatientOutcomeEntry, environment: OutcomeEnvironment) -> OutcomePromptRequest {
    OutcomePromptRequest {
        patient_id: entry.patient_id.clone(),
        prompt: entry.prompt.clone(),
        environment,
        scenario: entry.scenario,
        diagnosis: entry.diagnosis.clone(),
        predicted_stroke: entry.predicted_stroke,
        truth_stroke: entry.truth_stroke,
    }
}

async fn cmd_health(client: &ServiceClient) -> anyhow::Result<()> {
    let healthy = client
        .health()
        .await
        .with_context(|| format!("checking {}", client.base_url()))?;
    if healthy {
        println!("{} is healthy", client.base_url());
        Ok(())
    } else {
        anyhow::bail!("{} reported an unhealthy status", client.base_url())
    }
}
