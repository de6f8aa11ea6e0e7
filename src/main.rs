use anyhow::{Context, Result};
use pursuit_core::{Trial, event_positions, press_onsets};
use pursuit_dataset::{load_master, save_master, split_by_participant};
use pursuit_ingest::{IngestError, discover_trajectories, load_trajectory};
use pursuit_pipeline::{Pipeline, PipelineConfig, load_trajectories};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build {
            ref trajectories,
            ref evaluations,
            ref output,
            ref summary,
            threads,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(dir) = trajectories {
                config.paths.trajectories_dir = dir.clone();
            }
            if let Some(file) = evaluations {
                config.paths.evaluations = file.clone();
            }
            if let Some(file) = output {
                config.paths.output = file.clone();
            }
            if let Some(file) = summary {
                config.paths.summary = Some(file.clone());
            }
            if let Some(threads) = threads {
                config.workers.threads = threads;
            }
            run_build(config, cli.json)
        }
        Commands::Validate { ref path } => run_validate(path, cli.json),
        Commands::Segment { ref file } => {
            let config = load_config(cli.config.as_deref())?;
            run_segment(config, file, cli.json)
        }
        Commands::Split {
            ref master,
            ref out_dir,
            test_fraction,
            seed,
        } => run_split(master, out_dir, test_fraction, seed, cli.json),
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::load(path),
        None => PipelineConfig::load_default(),
    }
    .context("a config with a [segmentation] vertex table is required")?;
    debug!(?config, "config loaded");
    Ok(config)
}

fn run_build(config: PipelineConfig, as_json: bool) -> Result<ExitCode> {
    let output = config.paths.output.clone();
    let pipeline = Pipeline::new(config)?;
    let run = pipeline.run()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&run.summary)?);
    } else {
        println!("{}", run.summary);
        println!("Master dataset written to {}", output.display());
        if run.summary.has_rejections() {
            println!("Some files were rejected; run `validate` on them for every bad row.");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(path: &Path, as_json: bool) -> Result<ExitCode> {
    let files: Vec<PathBuf> = if path.is_dir() {
        discover_trajectories(path)?
    } else {
        vec![path.to_path_buf()]
    };
    let results = load_trajectories(&files, 0)?;

    let mut rejected = 0;
    let mut report = Vec::with_capacity(results.len());
    for (file, result) in &results {
        let name = file.display().to_string();
        match result {
            Ok(loaded) => {
                if !as_json {
                    println!("OK       {name}: {} samples", loaded.trial.len());
                    for w in &loaded.warnings {
                        println!("  warning: {w}");
                    }
                }
                report.push(json!({
                    "file": name,
                    "status": "ok",
                    "samples": loaded.trial.len(),
                    "warnings": loaded.warnings,
                }));
            }
            Err(error) => {
                rejected += 1;
                let rows: Vec<String> = match error {
                    IngestError::Rows { errors, .. } => {
                        errors.iter().map(ToString::to_string).collect()
                    }
                    _ => Vec::new(),
                };
                if !as_json {
                    println!("REJECTED {error}");
                    for row in &rows {
                        println!("  {row}");
                    }
                }
                report.push(json!({
                    "file": name,
                    "status": "rejected",
                    "error": error.to_string(),
                    "rows": rows,
                }));
            }
        }
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} file(s) checked, {rejected} rejected", results.len());
    }
    Ok(if rejected > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_segment(config: PipelineConfig, file: &Path, as_json: bool) -> Result<ExitCode> {
    let pipeline = Pipeline::new(config)?;
    let loaded = load_trajectory(file)?;
    let trial: &Trial = &loaded.trial;
    let segmentation = pipeline.segmenter().segment(trial)?;
    info!(trial = %trial.key(), "segmented");

    let subtrials = segmentation.subtrials(trial);
    if as_json {
        let rows: Vec<_> = subtrials
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "start": s.range.start,
                    "end": s.range.end,
                    "samples": s.len(),
                    "press_onsets": press_onsets(s.samples)
                        .into_iter()
                        .map(|i| i + s.range.start)
                        .collect::<Vec<_>>(),
                    "event_positions": event_positions(s.samples),
                })
            })
            .collect();
        let value = json!({
            "trial": trial.key().to_string(),
            "samples": trial.len(),
            "boundaries": segmentation.boundaries(),
            "subtrials": rows,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "Trial {}: {} samples, {} with space bar down, boundaries {:?}",
            trial.key(),
            trial.len(),
            trial.event_positions().len(),
            segmentation.boundaries()
        );
        for s in &subtrials {
            println!(
                "  {}  rows {:>4}..{:<4} {:>4} samples, {} press(es)",
                s.id,
                s.range.start,
                s.range.end,
                s.len(),
                press_onsets(s.samples).len()
            );
            let markers: Vec<String> = event_positions(s.samples)
                .iter()
                .map(|(x, y)| format!("({x}, {y})"))
                .collect();
            if !markers.is_empty() {
                println!("    markers: {}", markers.join(" "));
            }
        }
        for w in segmentation.warnings() {
            println!("  warning: {w}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_split(
    master: &Path,
    out_dir: &Path,
    test_fraction: f64,
    seed: u64,
    as_json: bool,
) -> Result<ExitCode> {
    let records =
        load_master(master).with_context(|| format!("reading {}", master.display()))?;
    let split = split_by_participant(records, test_fraction, seed)?;

    save_master(&out_dir.join("train.csv"), &split.train)?;
    save_master(&out_dir.join("test.csv"), &split.test)?;

    if as_json {
        let value = json!({
            "train": split.train.len(),
            "test": split.test.len(),
            "test_participants": split.test_participants,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "train: {} records, test: {} records (participants {:?})",
            split.train.len(),
            split.test.len(),
            split.test_participants
        );
    }
    Ok(ExitCode::SUCCESS)
}
