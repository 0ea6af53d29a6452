use std::collections::HashSet;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tvshelf_catalog::types::MatchedShow;
use tvshelf_db::MetadataStore;
use tvshelf_lib::{
    discover_show_folders, extension_set, JobStatus, PipelineError, ScanEvent, ScanJob,
    ScanPipeline, Settings,
};
use tvshelf_scraper::TvMazeClient;

use crate::cli_types::ScanArgs;
use crate::spinner::Spinner;
use crate::CliError;

/// How often the event loop checks whether the worker is still alive.
const EVENT_POLL: Duration = Duration::from_millis(100);

/// Scan the given folders, then settle ambiguous matches.
pub(crate) fn run_scan(settings: &Settings, args: ScanArgs, quiet: bool) -> Result<(), CliError> {
    let mut settings = settings.clone();
    if args.exact {
        settings.require_exact_match = true;
    }
    if args.no_posters {
        settings.download_posters = false;
    }
    let options = settings.pipeline_options();
    let extensions = extension_set(&options.video_extensions);

    let folders = collect_folders(&args, &extensions)?;
    if folders.is_empty() {
        log::warn!("No folders to scan.");
        return Ok(());
    }

    let store = super::open_store(&settings)?;
    let client = TvMazeClient::new(settings.request_timeout())
        .map_err(|e| CliError::catalog(format!("Failed to create catalog client: {}", e)))?;
    let pipeline = ScanPipeline::new(client, store.clone(), options);

    for folder in folders {
        match pipeline.add_job(folder, args.silent) {
            Ok(_) => {}
            Err(PipelineError::DuplicateJob(path)) => {
                log::warn!("Ignoring duplicate folder {}", path.display());
            }
            Err(e) => return Err(CliError::scan(e.to_string())),
        }
    }

    let (subscription, events) = pipeline.events().subscribe_channel();
    let total = pipeline.stats().total;
    log::info!(
        "{} {} folder(s)",
        "Scanning".if_supports_color(Stdout, |t| t.bold()),
        total,
    );

    let spinner = Spinner::new(quiet, "Starting...");
    pipeline
        .start()
        .map_err(|e| CliError::scan(e.to_string()))?;
    follow_scan(&pipeline, &events, &spinner);
    pipeline.wait();
    spinner.finish();

    let uncertain = pipeline.uncertain_jobs();
    if !uncertain.is_empty() {
        if args.no_prompt || !io::stdin().is_terminal() {
            list_uncertain(&uncertain);
        } else {
            prompt_uncertain(&pipeline, &uncertain, &events, quiet)?;
        }
    }
    pipeline.events().unsubscribe(subscription);

    print_summary(&pipeline, &store);
    Ok(())
}

/// Expand the command-line folders into absolute job folders.
fn collect_folders(args: &ScanArgs, extensions: &HashSet<String>) -> Result<Vec<PathBuf>, CliError> {
    let mut folders = Vec::new();

    for root in &args.folders {
        let root = std::path::absolute(root)?;
        if !args.children {
            folders.push(root);
            continue;
        }

        let found = discover_show_folders(&root, extensions).map_err(|e| {
            CliError::other(format!("Failed to read {}: {}", root.display(), e))
        })?;
        if found.is_empty() {
            log::warn!("No show folders with videos under {}", root.display());
        }
        for show_folder in &found {
            log::debug!("Found {} ({} videos)", show_folder.name, show_folder.video_count);
        }
        folders.extend(found.into_iter().map(|f| f.path));
    }

    Ok(folders)
}

// ── Progress ────────────────────────────────────────────────────────────────

/// Render events until the worker exits.
fn follow_scan(pipeline: &ScanPipeline, events: &Receiver<ScanEvent>, spinner: &Spinner) {
    loop {
        match events.recv_timeout(EVENT_POLL) {
            Ok(ScanEvent::AllJobsComplete) => break,
            Ok(event) => render_event(&event, spinner),
            Err(RecvTimeoutError::Timeout) => {
                if !pipeline.is_running() {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    for event in events.try_iter() {
        render_event(&event, spinner);
    }
}

fn render_event(event: &ScanEvent, spinner: &Spinner) {
    match event {
        ScanEvent::JobStarted { folder } => {
            spinner.set_message(format!("{}: starting", display_name(folder)));
        }
        ScanEvent::JobProgress {
            folder,
            stage,
            details,
        } => {
            let msg = format!("{}: {} {}", display_name(folder), stage, details);
            spinner.set_message(msg.trim_end().to_string());
        }
        ScanEvent::JobCompleted {
            folder,
            show: Some(show),
        } => spinner.suspend(|| {
            log::info!(
                "  {} {} {} {} {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                display_name(folder),
                "->".if_supports_color(Stdout, |t| t.dimmed()),
                show.name.if_supports_color(Stdout, |t| t.bold()),
                format!("({:.0}%)", show.confidence).if_supports_color(Stdout, |t| t.dimmed()),
            );
        }),
        ScanEvent::JobCompleted { folder, show: None } => spinner.suspend(|| {
            log::info!(
                "  {} {} {}",
                "-".if_supports_color(Stdout, |t| t.dimmed()),
                display_name(folder),
                "(no match)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }),
        ScanEvent::JobUncertain { folder, candidates } => spinner.suspend(|| {
            log::info!(
                "  {} {} {}",
                "?".if_supports_color(Stdout, |t| t.yellow()),
                display_name(folder),
                format!("({} possible matches)", candidates.len())
                    .if_supports_color(Stdout, |t| t.dimmed()),
            );
        }),
        ScanEvent::JobError { folder, message } => spinner.suspend(|| {
            log::warn!(
                "  {} {}: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                display_name(folder),
                message,
            );
        }),
        ScanEvent::AllJobsComplete | ScanEvent::ScanStats(_) => {}
    }
}

fn display_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.display().to_string())
}

// ── Uncertain matches ───────────────────────────────────────────────────────

fn list_uncertain(jobs: &[ScanJob]) {
    crate::log_blank();
    log::info!(
        "{}",
        format!("{} folder(s) left undecided:", jobs.len())
            .if_supports_color(Stdout, |t| t.bold()),
    );
    for job in jobs {
        log::info!("  {}", job.folder_path.display());
        for candidate in &job.candidates {
            log::info!("      {}", describe_candidate(candidate));
        }
    }
    log::info!("Re-run without --no-prompt to choose a match.");
}

fn prompt_uncertain(
    pipeline: &ScanPipeline,
    jobs: &[ScanJob],
    events: &Receiver<ScanEvent>,
    quiet: bool,
) -> Result<(), CliError> {
    crate::log_blank();
    log::info!(
        "{}",
        format!("{} folder(s) need a decision", jobs.len())
            .if_supports_color(Stdout, |t| t.bold()),
    );

    for job in jobs {
        crate::log_blank();
        log::info!(
            "  {}",
            job.folder_path
                .display()
                .if_supports_color(Stdout, |t| t.cyan()),
        );
        for (i, candidate) in job.candidates.iter().enumerate() {
            log::info!("    {}) {}", i + 1, describe_candidate(candidate));
        }
        log::info!("    0) Skip this folder");

        match read_choice(job.candidates.len())? {
            Some(index) => resolve(pipeline, job, &job.candidates[index], events, quiet)?,
            None => {
                pipeline
                    .skip_uncertain(&job.folder_path)
                    .map_err(|e| CliError::scan(e.to_string()))?;
                log::info!("  {}", "Skipped".if_supports_color(Stdout, |t| t.dimmed()));
            }
        }
    }

    Ok(())
}

/// Ask for a candidate number. `None` means skip; so do an empty answer and EOF.
fn read_choice(count: usize) -> Result<Option<usize>, CliError> {
    loop {
        print!("  Choose [0-{}]: ", count);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        match input.parse::<usize>() {
            Ok(0) => return Ok(None),
            Ok(n) if n <= count => return Ok(Some(n - 1)),
            _ => log::warn!("  Enter a number between 0 and {}", count),
        }
    }
}

fn resolve(
    pipeline: &ScanPipeline,
    job: &ScanJob,
    show: &MatchedShow,
    events: &Receiver<ScanEvent>,
    quiet: bool,
) -> Result<(), CliError> {
    let spinner = Spinner::new(quiet, format!("Storing {}", show.name));
    let resolution = pipeline
        .resolve_uncertain(&job.folder_path, show.clone())
        .map_err(|e| CliError::scan(e.to_string()))?;

    while !resolution.is_finished() {
        if let Ok(ScanEvent::JobProgress { stage, details, .. }) = events.recv_timeout(EVENT_POLL) {
            let msg = format!("{} {}", stage, details);
            spinner.set_message(msg.trim_end().to_string());
        }
    }
    let result = resolution.wait();
    spinner.finish();
    // The completion events are reported from the result below.
    for _ in events.try_iter() {}

    match result {
        Ok(show) => log::info!(
            "  {} {} {} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            job.folder_name(),
            "->".if_supports_color(Stdout, |t| t.dimmed()),
            show.name.if_supports_color(Stdout, |t| t.bold()),
        ),
        Err(e) => log::warn!(
            "  {} {}: {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            job.folder_name(),
            e,
        ),
    }
    Ok(())
}

fn describe_candidate(candidate: &MatchedShow) -> String {
    let kind = candidate.kind.as_deref().unwrap_or("Unknown");
    format!(
        "{} {}",
        candidate.name,
        format!("[{}, id {}, {:.0}%]", kind, candidate.external_id, candidate.confidence)
            .if_supports_color(Stdout, |t| t.dimmed()),
    )
}

// ── Summary ─────────────────────────────────────────────────────────────────

fn print_summary(pipeline: &ScanPipeline, store: &MetadataStore) {
    let jobs = pipeline.jobs();
    let stats = pipeline.stats();
    let matched = jobs.iter().filter(|j| j.result.is_some()).count();
    let undecided = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Uncertain)
        .count();
    let unmatched = stats
        .completed
        .saturating_sub(matched + stats.errors + undecided);

    crate::log_blank();
    log::info!("{}", "Summary".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Folders:    {:>6}", stats.total);
    log::info!("  Matched:    {:>6}", matched);
    log::info!("  No match:   {:>6}", unmatched);
    if undecided > 0 {
        log::info!("  Undecided:  {:>6}", undecided);
    }
    if stats.errors > 0 {
        log::warn!("  Errors:     {:>6}", stats.errors);
    }

    match store.counts() {
        Ok(counts) => log::info!(
            "  Database:   {} shows, {} episodes, {}/{} videos linked",
            counts.shows,
            counts.episodes,
            counts.linked_videos,
            counts.videos,
        ),
        Err(e) => log::warn!("  Could not read database counts: {}", e),
    }
}
