use colored::*;
use dialoguer::Input;
use env_logger::{Builder, Env, Target};
use is_terminal::IsTerminal;
use log::{info, warn};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use supersearch::config::megabytes;
use supersearch::{
    open_selection, Cli, Config, OutputFormat, OutputFormatter, Parser, ProgressReporter, Result,
    SearchEngine, SearchRequest, Selection, SupersearchError, SystemOpener,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("Error: {e}").red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    setup_logging(&cli)?;
    let start_time = Instant::now();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Ignoring config file: {e:#}");
            Config::default()
        }),
    };

    let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
    let text_output = cli.format == OutputFormat::Text;
    let color = !cli.no_color && config.display.color && io::stdout().is_terminal();

    let directory = match &cli.directory {
        Some(directory) => directory.clone(),
        None if interactive => PathBuf::from(prompt("Directory to search")?),
        None => {
            return Err(SupersearchError::Other(
                "no directory given and no terminal to ask for one".to_string(),
            ))
        }
    };
    let keyword = match &cli.keyword {
        Some(keyword) => keyword.clone(),
        None if interactive => prompt("Keyword")?,
        None => {
            return Err(SupersearchError::Other(
                "no keyword given and no terminal to ask for one".to_string(),
            ))
        }
    };

    let extensions = cli
        .extensions
        .clone()
        .unwrap_or_else(|| config.search.extensions.clone());
    let request = SearchRequest::new(expand_home(directory), keyword)?
        .with_case_sensitive(cli.case_sensitive || config.search.case_sensitive)
        .with_extensions(extensions);

    if text_output {
        let mode = if request.case_sensitive() {
            "case-sensitive"
        } else {
            "case-insensitive"
        };
        let exts: Vec<String> = request.extensions().iter().map(|e| format!(".{e}")).collect();
        let summary = format!(
            "  Directory: {}\n  Keyword: {:?} [{mode}]\n  Extensions: {}\n",
            request.root().display(),
            request.keyword(),
            exts.join(", ")
        );
        println!("{}", if color { summary.dimmed().to_string() } else { summary });
    }

    let mut options = config.scan_options();
    if let Some(mb) = cli.max_size {
        options.max_file_size = Some(megabytes(mb));
    }
    let jobs = cli
        .jobs
        .or(config.search.jobs)
        .unwrap_or_else(num_cpus::get);

    let progress = Arc::new(if text_output && io::stderr().is_terminal() {
        ProgressReporter::new()
    } else {
        ProgressReporter::hidden()
    });
    let engine = SearchEngine::new(options)
        .with_jobs(jobs)
        .with_progress(Arc::clone(&progress));

    let searching = Arc::new(AtomicBool::new(true));
    {
        let token = engine.cancellation_token();
        let searching = Arc::clone(&searching);
        ctrlc::set_handler(move || {
            if searching.load(Ordering::SeqCst) && !token.is_cancelled() {
                token.cancel();
            } else {
                std::process::exit(130);
            }
        })
        .map_err(|e| SupersearchError::Other(format!("Failed to install Ctrl-C handler: {e}")))?;
    }

    let results = engine.run(&request)?;
    searching.store(false, Ordering::SeqCst);
    let progress_stats = progress.finish();
    info!(
        "Scanned {} file(s) ({} bytes, {} skipped) in {:.2?}",
        progress_stats.files_processed,
        progress_stats.bytes_processed,
        progress_stats.files_skipped,
        progress_stats.elapsed()
    );

    let formatter = OutputFormatter::new(cli.format)
        .with_color(color)
        .with_max_matches(config.display.max_matches_per_file);
    println!("{}", formatter.format_results(&results, &request)?);

    let selectable = results.groups().iter().any(|g| !g.is_skipped());
    if text_output && interactive && !cli.no_open && selectable {
        let answer = Input::<String>::new()
            .with_prompt("Enter numbers to open (comma-separated, 'a' for all, Enter to quit)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| SupersearchError::Other(e.to_string()))?;

        let (selection, parse_errors) = Selection::parse(&answer);
        for e in &parse_errors {
            eprintln!("{}", e.to_string().red());
        }

        let opener = SystemOpener::new(config.open.editor.clone());
        let (opened, open_errors) = open_selection(&results, &selection, &opener);
        for e in &open_errors {
            eprintln!("{}", e.to_string().red());
        }
        if opened > 0 {
            println!("{}", format!("Opened {opened} file(s).").green());
        }
    }

    info!(
        "Finished. Total elapsed time: {:.2?}",
        start_time.elapsed()
    );
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.trim().is_empty() {
                Err("please enter a value")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map(|s| s.trim().to_string())
        .map_err(|e| SupersearchError::Other(e.to_string()))
}

fn expand_home(path: PathBuf) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or(path),
        Err(_) => path,
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| SupersearchError::Other(e.to_string()))?;
    Ok(())
}
