use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use rosterlink_ingest::{ReadOptions, read_dataset};
use rosterlink_map::{
    Command as SessionCommand, MatchResolver, MatchThresholds, PreparedName, ReconcileSession,
    normalized_collisions, score_detailed,
};
use rosterlink_model::{ConfirmedMapping, Dataset};
use rosterlink_output::{
    JoinKind, MergeOptions, merge, read_mapping_json, write_csv, write_mapping_json,
};
use tracing::{info, info_span, trace, warn};

use crate::cli::{
    ExportArgs, InputArgs, JoinArg, MatchArgs, MergeArgs, PolicyArgs, PresetArg, ReviewArgs,
    ScoreArgs,
};
use rosterlink_cli::logging::redact_value;
use rosterlink_cli::review::{ReviewExit, review_session};
use rosterlink_cli::summary::{print_join_stats, print_score, print_summary};
use rosterlink_cli::types::MatchReport;

/// Loaded rosters: the primary and every secondary, in argument order.
struct Inputs {
    primary: Dataset,
    secondaries: Vec<Dataset>,
}

pub fn run_match(args: &MatchArgs) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let resolver = build_resolver(&args.policy)?;
    let mut reports = Vec::with_capacity(inputs.secondaries.len());
    let mut mappings = Vec::with_capacity(inputs.secondaries.len());
    for secondary in &inputs.secondaries {
        let mut session = new_session(&inputs.primary, secondary, &resolver);
        let applied = session.auto_match()?;
        reports.push(MatchReport::from_session(&session, applied.len())?);
        mappings.push(session.snapshot());
    }
    print_summary(&reports);
    if let Some(path) = &args.mapping_out {
        write_mapping_json(&mappings, path)
            .with_context(|| format!("write mappings to {}", path.display()))?;
    }
    Ok(())
}

pub fn run_review(args: &ReviewArgs) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let resolver = build_resolver(&args.policy)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let mut reports = Vec::with_capacity(inputs.secondaries.len());
    let mut mappings = Vec::with_capacity(inputs.secondaries.len());
    let mut quit = false;
    for secondary in &inputs.secondaries {
        let _span = info_span!("review", label = %secondary.label).entered();
        let mut session = new_session(&inputs.primary, secondary, &resolver);
        let auto = if args.no_auto {
            0
        } else {
            session.auto_match()?.len()
        };
        if !quit {
            let exit = review_session(&mut session, &mut input, &mut out)
                .context("interactive review failed")?;
            quit = exit == ReviewExit::Quit;
        }
        reports.push(MatchReport::from_session(&session, auto)?);
        mappings.push(session.snapshot());
    }
    print_summary(&reports);
    export(&inputs, &mappings, &args.export, args.output.as_deref())
}

pub fn run_merge(args: &MergeArgs) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let resolver = build_resolver(&args.policy)?;
    let saved = match &args.mapping {
        Some(path) => read_mapping_json(path)
            .with_context(|| format!("read mappings from {}", path.display()))?,
        None => Vec::new(),
    };

    let mut reports = Vec::with_capacity(inputs.secondaries.len());
    let mut mappings = Vec::with_capacity(inputs.secondaries.len());
    for secondary in &inputs.secondaries {
        let mut session = new_session(&inputs.primary, secondary, &resolver);
        if let Some(previous) = saved.iter().find(|m| m.source_label == secondary.label) {
            replay_mapping(&mut session, previous);
        }
        let applied = session.auto_match()?;
        let report = MatchReport::from_session(&session, applied.len())?;
        if report.pending() > 0 {
            warn!(
                label = %report.label,
                pending = report.pending(),
                "unresolved names are left out of the merge"
            );
        }
        reports.push(report);
        mappings.push(session.snapshot());
    }
    print_summary(&reports);
    export(&inputs, &mappings, &args.export, Some(args.output.as_path()))
}

pub fn run_score(args: &ScoreArgs) {
    let left = PreparedName::new(&args.left);
    let right = PreparedName::new(&args.right);
    let score = score_detailed(&args.left, &args.right);
    print_score(&left, &right, &score);
}

fn load_inputs(args: &InputArgs) -> Result<Inputs> {
    let options = ReadOptions::default().with_key_column(args.key_column.clone());
    let primary = read_dataset(&args.primary, None, &options)
        .with_context(|| format!("read primary roster {}", args.primary.display()))?;
    warn_collisions(&primary);

    let mut secondaries = Vec::with_capacity(args.secondary.len());
    for path in &args.secondary {
        let dataset = read_dataset(path, None, &options)
            .with_context(|| format!("read secondary roster {}", path.display()))?;
        if dataset.label == primary.label
            || secondaries.iter().any(|d: &Dataset| d.label == dataset.label)
        {
            anyhow::bail!(
                "dataset label '{}' is used twice; rename {}",
                dataset.label,
                path.display()
            );
        }
        warn_collisions(&dataset);
        secondaries.push(dataset);
    }
    info!(
        primary = %primary.label,
        primary_names = primary.player_names().len(),
        secondaries = secondaries.len(),
        "rosters loaded"
    );
    Ok(Inputs {
        primary,
        secondaries,
    })
}

fn warn_collisions(dataset: &Dataset) {
    let collisions = normalized_collisions(&dataset.player_names());
    if collisions.is_empty() {
        return;
    }
    warn!(
        label = %dataset.label,
        groups = collisions.len(),
        "distinct names normalize identically and may be confused"
    );
    for group in &collisions {
        let names: Vec<&str> = group.iter().map(|name| redact_value(name)).collect();
        trace!(label = %dataset.label, names = ?names, "normalized collision");
    }
}

fn build_resolver(args: &PolicyArgs) -> Result<MatchResolver> {
    let preset = match args.preset {
        PresetArg::Strict => MatchThresholds::strict(),
        PresetArg::Default => MatchThresholds::default(),
        PresetArg::Relaxed => MatchThresholds::relaxed(),
    };
    let thresholds = MatchThresholds::new(
        args.high.unwrap_or(preset.high),
        args.low.unwrap_or(preset.low),
    )
    .context("invalid match thresholds")?;
    info!(high = thresholds.high, low = thresholds.low, "match policy");
    Ok(MatchResolver::new(thresholds))
}

fn new_session(
    primary: &Dataset,
    secondary: &Dataset,
    resolver: &MatchResolver,
) -> ReconcileSession {
    ReconcileSession::new(
        secondary.label.clone(),
        secondary.player_names(),
        primary.label.clone(),
        primary.player_names(),
        resolver.clone(),
    )
}

/// Re-applies saved decisions; ones that no longer fit the data are skipped.
fn replay_mapping(session: &mut ReconcileSession, mapping: &ConfirmedMapping) {
    let mut skipped = 0usize;
    let commands = mapping
        .matches
        .iter()
        .map(|(source, target)| SessionCommand::Confirm {
            source: source.clone(),
            target: target.clone(),
        })
        .chain(mapping.rejected.iter().map(|source| SessionCommand::Reject {
            source: source.clone(),
        }));
    for command in commands {
        if let Err(error) = session.apply(command) {
            skipped += 1;
            trace!(%error, "saved decision not applied");
        }
    }
    info!(
        label = %session.source_label(),
        applied = session.summary().history,
        skipped,
        "replayed saved decisions"
    );
}

fn export(
    inputs: &Inputs,
    mappings: &[ConfirmedMapping],
    args: &ExportArgs,
    output: Option<&Path>,
) -> Result<()> {
    if let Some(path) = &args.mapping_out {
        write_mapping_json(mappings, path)
            .with_context(|| format!("write mappings to {}", path.display()))?;
    }
    let Some(output) = output else {
        return Ok(());
    };
    let options = MergeOptions {
        join: match args.join {
            JoinArg::Inner => JoinKind::Inner,
            JoinArg::Left => JoinKind::Left,
        },
        suffix_all: args.suffix_all,
    };
    let pairs: Vec<(&Dataset, &ConfirmedMapping)> =
        inputs.secondaries.iter().zip(mappings.iter()).collect();
    let table = merge(&inputs.primary, &pairs, &options);
    write_csv(&table, output).with_context(|| format!("write {}", output.display()))?;
    print_join_stats(&table.stats, table.height(), output);
    Ok(())
}
