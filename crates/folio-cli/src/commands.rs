use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use folio_actor::{ActorContext, FileSetActor, FolioConfig, NoOpHooks, Upload};
use folio_jobs::{InMemoryJobQueue, Job, JobQueue, JobRunner, SpoolConfig, SpoolJobQueue};
use folio_stage::WorkingDirectory;
use folio_store::{InMemoryBinaryStore, InMemoryRepository, Repository};
use folio_types::{Attributes, EntityId, FileSet, User, Visibility, Work};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let format = cli.format;
    match cli.command {
        Command::StagePath(args) => cmd_stage_path(&config, args, &format),
        Command::Ingest(args) => cmd_ingest(&config, args, &format),
        Command::Jobs(args) => cmd_jobs(&config, args, &format),
        Command::Config(_) => cmd_config(&config, &format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FolioConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Ok(FolioConfig::load(path)?)
        }
        None => Ok(FolioConfig::default()),
    }
}

fn cmd_stage_path(config: &FolioConfig, args: StagePathArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let id = EntityId::new(args.id)?;
    let path = WorkingDirectory::new(&config.working_path)?.path_for(&id, &args.name)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "id": id, "path": path })),
        OutputFormat::Text => println!("{}", path.display()),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct IngestSummary {
    work: Work,
    file_sets: Vec<FileSet>,
    jobs: Vec<Job>,
    jobs_run: usize,
}

fn cmd_ingest(config: &FolioConfig, args: IngestArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let summary = ingest(config, &args)?;
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let work_id = summary.work.id.as_ref().map(EntityId::as_str).unwrap_or("-");
    println!(
        "{} Created work {} {:?} ({})",
        "✓".green().bold(),
        work_id.yellow(),
        args.work_title,
        summary.work.visibility.to_string().cyan()
    );
    for fs in &summary.file_sets {
        let id = fs.id.as_ref().map(EntityId::as_str).unwrap_or("-");
        let marker = if summary.work.representative == fs.id { " (representative)" } else { "" };
        println!("  {} {} {}{}", "+".green(), id.yellow(), fs.label.as_deref().unwrap_or(""), marker.dimmed());
        if let Some(c) = &fs.characterization {
            println!(
                "      {} bytes, {}, blake3 {}",
                c.byte_size,
                c.mime_type.as_deref().unwrap_or("unknown type"),
                &c.digest[..12.min(c.digest.len())]
            );
        }
    }
    if summary.jobs_run > 0 {
        println!("{} Ran {} jobs.", "✓".green(), summary.jobs_run);
    } else {
        for job in &summary.jobs {
            println!("  {} {}", "queued:".blue(), job);
        }
    }
    Ok(())
}

fn ingest(config: &FolioConfig, args: &IngestArgs) -> anyhow::Result<IngestSummary> {
    let visibility: Visibility = args.visibility.parse()?;
    let repo = Arc::new(InMemoryRepository::new());
    let binaries = Arc::new(InMemoryBinaryStore::new());
    let memory = Arc::new(InMemoryJobQueue::new());
    let spool = match &config.jobs.spool_path {
        Some(path) => Some(Arc::new(SpoolJobQueue::open(path, SpoolConfig::default())?)),
        None => None,
    };
    if args.run_jobs && spool.is_some() {
        bail!("--run-jobs runs jobs in-process; unset jobs.spool_path to use it");
    }
    let queue: Arc<dyn JobQueue> = match &spool {
        Some(spool) => spool.clone(),
        None => memory.clone(),
    };

    let ctx = ActorContext::from_config(config, repo.clone(), binaries.clone(), queue, Arc::new(NoOpHooks))?;
    let user = User::new(args.user.as_str());
    let mut work = Work::new(args.work_title.as_str());
    work.visibility = visibility;
    work.depositor = Some(user.user_key().to_string());

    let mut ids = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let mut fs = FileSet::new();
        let mut actor = FileSetActor::new(&ctx, &mut fs, &user);
        actor
            .create_metadata(Some(&mut work), Attributes::new())
            .with_context(|| format!("attaching {}", path.display()))?;
        let saved = actor
            .create_content(&Upload::from_path(path))
            .with_context(|| format!("ingesting {}", path.display()))?;
        if !saved {
            bail!("{} failed validation: {:?}", path.display(), fs.errors);
        }
        info!(
            path = %path.display(),
            file_set = %fs.id.as_ref().map(EntityId::as_str).unwrap_or_default(),
            "file ingested"
        );
        ids.extend(fs.id);
    }

    let mut jobs_run = 0;
    let jobs = match &spool {
        Some(spool) => spool.recover()?,
        None if args.run_jobs => {
            let runner = JobRunner::new(repo.clone(), binaries.clone(), memory.clone());
            let mut executed = Vec::new();
            // Characterization enqueues derivative jobs; drain until quiet.
            loop {
                let batch = memory.drain();
                if batch.is_empty() {
                    break;
                }
                debug!(jobs = batch.len(), "draining job batch");
                for job in batch {
                    runner.run(&job).with_context(|| format!("running {job}"))?;
                    jobs_run += 1;
                    executed.push(job);
                }
            }
            info!(jobs_run, "job queue drained");
            executed
        }
        None => memory.jobs(),
    };

    let work_id = work.id.clone().context("work was not saved")?;
    let work = repo.find_work(&work_id)?.context("work disappeared")?;
    let file_sets = ids
        .iter()
        .filter_map(|id| repo.find_file_set(id).transpose())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IngestSummary {
        work,
        file_sets,
        jobs,
        jobs_run,
    })
}

fn cmd_jobs(config: &FolioConfig, args: JobsArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let Some(path) = args.spool.or_else(|| config.jobs.spool_path.clone()) else {
        bail!("no spool given; pass --spool or set jobs.spool_path");
    };
    if !path.exists() {
        bail!("spool {} does not exist", path.display());
    }
    let jobs = SpoolJobQueue::open(&path, SpoolConfig::default())?.recover()?;
    debug!(path = %path.display(), jobs = jobs.len(), "spool recovered");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&jobs)?),
        OutputFormat::Text => {
            if jobs.is_empty() {
                println!("No jobs in {}.", path.display());
            }
            for job in &jobs {
                println!(
                    "{} {} {} {}",
                    job.enqueued_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                    job.kind().to_string().cyan(),
                    job.entity_id.as_str().yellow(),
                    job.working_path().display()
                );
            }
        }
    }
    Ok(())
}

fn cmd_config(config: &FolioConfig, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}
