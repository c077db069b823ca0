//! # fieldforce-collect
//!
//! Command-line front end for collection links.
//!
//! ```text
//! fieldforce-collect verify <token> [--pin 1234]
//! fieldforce-collect fill <token> <form-id> --answers answers.json [--resume-id ID]
//! fieldforce-collect sync
//! fieldforce-collect status
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use collect_runtime::telemetry::init_tracing;
use collect_runtime::{CollectContainer, RuntimeConfig};
use fc_01_connectivity::ConnectivityApi;
use fc_02_token_verifier::{TokenVerifierApi, VerificationState, VerifiedAccess};
use fc_03_session_paginator::SessionNavigation;
use fc_04_autosave::spawn_autosave;
use fc_05_submission_router::SubmissionApi;
use shared_types::{ResponseMap, SecurityMode};

/// FieldForce Collect: fill assigned forms through a collection link.
#[derive(Parser, Debug)]
#[command(name = "fieldforce-collect", version)]
#[command(about = "Verify collection links, fill forms and sync queued submissions")]
struct Cli {
    /// Backend base URL (overrides FC_BACKEND_URL)
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Data directory (overrides FC_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Behave as if the device had no connectivity
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify a collection link and list its forms
    Verify {
        /// Collection token
        token: String,
        /// PIN for PIN-protected links
        #[arg(long)]
        pin: Option<String>,
    },
    /// Fill one form from a JSON answers file and submit it
    Fill {
        /// Collection token
        token: String,
        /// Form to fill
        form_id: String,
        /// JSON object of field id to answer
        #[arg(long)]
        answers: PathBuf,
        /// PIN for PIN-protected links
        #[arg(long)]
        pin: Option<String>,
        /// Resume a saved session by id
        #[arg(long)]
        resume_id: Option<String>,
    },
    /// Deliver queued submissions now
    Sync,
    /// Show connectivity, queue and device status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RuntimeConfig::from_env();
    if let Some(backend) = cli.backend {
        config.backend_url = backend;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    config.start_offline |= cli.offline;

    init_tracing(&config.log_level, config.json_logs).context("Failed to initialize logging")?;

    let container = CollectContainer::open(config).context("Failed to start runtime")?;
    // Seed the pending count; a failed read only affects `status` output.
    if let Err(e) = container.monitor.refresh_pending_count().await {
        warn!(error = %e, "Could not read submission queue");
    }

    match cli.command {
        Command::Verify { token, pin } => {
            let access = authenticate(&container, &token, pin.as_deref()).await?;
            print_access(&access);
        }
        Command::Fill {
            token,
            form_id,
            answers,
            pin,
            resume_id,
        } => {
            authenticate(&container, &token, pin.as_deref()).await?;
            fill(&container, &token, &form_id, &answers, resume_id.as_deref()).await?;
        }
        Command::Sync => {
            let report = container
                .monitor
                .sync_now()
                .await
                .context("Sync failed")?;
            println!(
                "Delivered {}, failed {}, still queued {}",
                report.delivered, report.failed, report.remaining
            );
        }
        Command::Status => status(&container)?,
    }

    container.verifier.teardown();
    Ok(())
}

/// Run the handshake for `token`, answering a device-lock or PIN prompt.
async fn authenticate(
    container: &CollectContainer,
    token: &str,
    pin: Option<&str>,
) -> Result<VerifiedAccess> {
    let verifier = &container.verifier;
    let mut state = verifier.load(token).await?;

    if let VerificationState::NeedsVerification(pending) = &state {
        state = match (pending.mode, pin) {
            (SecurityMode::PinProtected, Some(pin)) => verifier.submit_pin(pin).await?,
            (SecurityMode::PinProtected, None) => {
                bail!("This link is PIN protected; pass --pin")
            }
            _ => verifier.register_device().await?,
        };
    }

    match state {
        VerificationState::Verified(access) => Ok(access),
        VerificationState::NeedsVerification(pending) => match pending.error {
            Some(err) => bail!("Verification failed: {}", err),
            None => bail!("Verification incomplete"),
        },
        VerificationState::Error(failure) => bail!("{}", failure.message()),
        VerificationState::Loading => bail!("Verification did not complete"),
    }
}

async fn fill(
    container: &CollectContainer,
    token: &str,
    form_id: &str,
    answers: &Path,
    resume_id: Option<&str>,
) -> Result<()> {
    let raw = std::fs::read_to_string(answers)
        .with_context(|| format!("Failed to read {}", answers.display()))?;
    let answers: ResponseMap =
        serde_json::from_str(&raw).context("Answers must be a JSON object")?;

    let form = container.verifier.open_form(form_id).await?;
    let session = container.form_session(token, form)?;

    if let Some(resumed) = session
        .persistor
        .restore_into(&session.paginator, resume_id)
        .await?
    {
        info!(source = ?resumed.source, page = resumed.current_page, "Resumed saved session");
    }
    let autosave = spawn_autosave(session.persistor.clone(), session.paginator.clone());

    {
        let mut paginator = session.paginator.lock();
        for (field_id, value) in answers {
            paginator
                .set_response(&field_id, value)
                .with_context(|| format!("Cannot answer '{}'", field_id))?;
        }
    }

    while !session.paginator.lock().is_last_page() {
        session
            .persistor
            .next_page(&session.paginator)
            .await
            .context("Page is incomplete")?;
    }

    let receipt = session.router.submit(&session.paginator).await;
    autosave.abort();
    let receipt = receipt.context("Submission failed")?;

    println!("{}", receipt.outcome.message());
    println!("{}", receipt.notice.thank_you_message);
    println!("Submission id: {}", receipt.submission_id);
    Ok(())
}

fn status(container: &CollectContainer) -> Result<()> {
    let device = container.verifier.devices().get()?;
    let verified = container.verifier.verification_cache().entries()?;

    println!(
        "Connectivity: {}",
        if container.monitor.is_online() {
            "online"
        } else {
            "offline"
        }
    );
    println!("Queued submissions: {}", container.monitor.pending_count());
    match device {
        Some(identity) => println!("Device: {}", identity.device_id),
        None => println!("Device: not registered yet"),
    }
    println!("Verified links: {}", verified.len());
    Ok(())
}

fn print_access(access: &VerifiedAccess) {
    println!("Enumerator: {}", access.enumerator_name);
    if access.is_offline() {
        println!("Offline mode: showing cached forms");
    }
    if let Some(remaining) = access.remaining_submissions {
        println!("Remaining submissions: {}", remaining);
    }
    for form in access.form_refs() {
        println!("  {}  {} ({} fields)", form.id, form.name, form.field_count);
    }
}
