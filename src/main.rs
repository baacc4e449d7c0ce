use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use optsvg::files::{self, FileJob};
use optsvg::{BUILTIN_PLUGINS, Config, OverrideRequest, datauri, optimize_str};
use owo_colors::OwoColorize;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "optsvg", version)]
#[command(about = "SVG optimizer with configurable plugins", long_about = None)]
struct Cli {
    /// Alias to --input
    inputs: Vec<PathBuf>,

    /// Input file, "-" for STDIN
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// Input SVG data string
    #[arg(short, long)]
    string: Option<String>,

    /// Input folder, optimize and rewrite all *.svg files
    #[arg(short, long)]
    folder: Option<PathBuf>,

    /// Output file or folder (by default the same as the input), "-" for STDOUT
    #[arg(short, long)]
    output: Vec<PathBuf>,

    /// Set number of digits in the fractional part, overrides plugins params
    #[arg(short, long, allow_negative_numbers = true)]
    precision: Option<i64>,

    /// Config file or JSON string to extend or replace default
    #[arg(long)]
    config: Option<String>,

    /// Disable plugin by name, "--disable=PLUGIN1,PLUGIN2" for multiple plugins
    #[arg(long)]
    disable: Vec<String>,

    /// Enable plugin by name, "--enable=PLUGIN3,PLUGIN4" for multiple plugins
    #[arg(long)]
    enable: Vec<String>,

    /// Output as Data URI string (base64, enc or unenc)
    #[arg(long)]
    datauri: Option<datauri::DataUriKind>,

    /// Pass over SVGs multiple times to ensure all optimizations are applied
    #[arg(long)]
    multipass: bool,

    /// Make SVG pretty printed
    #[arg(long)]
    pretty: bool,

    /// Indent number when pretty printing SVGs
    #[arg(long)]
    indent: Option<usize>,

    /// Use with '-f'. Optimizes *.svg files in folders recursively.
    #[arg(short, long)]
    recursive: bool,

    /// Only output error messages, not regular status messages
    #[arg(short, long)]
    quiet: bool,

    /// Show available plugins and exit
    #[arg(long)]
    show_plugins: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", format!("Error: {err:#}").red());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    if cli.show_plugins {
        show_available_plugins();
        return Ok(());
    }

    let mut inputs = cli.input.clone();
    inputs.extend(cli.inputs.iter().cloned());

    if inputs.first().is_none_or(|i| files::is_stdio(i))
        && cli.string.is_none()
        && cli.folder.is_none()
        && io::stdin().is_terminal()
    {
        Cli::command().print_help()?;
        return Ok(());
    }

    let config = build_config(&cli)?;
    let quiet = cli.quiet;

    if let Some(folder) = &cli.folder {
        let output = cli.output.first().unwrap_or(folder);
        return optimize_folder(&config, folder, output, cli.recursive, quiet);
    }

    if let Some(first) = inputs.first() {
        if files::is_stdio(first) {
            let mut data = String::new();
            io::stdin().read_to_string(&mut data)?;
            let output = stdout_or_first(&cli.output);
            return process_svg(&config, &data, None, &output, quiet);
        }

        let jobs = files::pair_outputs(&inputs, &cli.output);
        return jobs.par_iter().try_for_each(|job| {
            if job.input.is_dir() {
                optimize_folder(&config, &job.input, &job.output, cli.recursive, quiet)
            } else {
                optimize_file(&config, job, quiet)
            }
        });
    }

    if let Some(string) = &cli.string {
        let data = datauri::decode(string)?;
        let output = stdout_or_first(&cli.output);
        return process_svg(&config, &data, None, &output, quiet);
    }

    Ok(())
}

/// Config file first, then CLI flags on top.
fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(arg) => Config::load(arg)?,
        None => Config::default(),
    };

    if let Some(precision) = cli.precision {
        config.set_float_precision(precision);
    }

    let mut overrides = Vec::new();
    if !cli.disable.is_empty() {
        overrides.push(OverrideRequest::disable(cli.disable.iter().cloned()));
    }
    if !cli.enable.is_empty() {
        overrides.push(OverrideRequest::enable(cli.enable.iter().cloned()));
    }
    config.apply_overrides(&overrides);

    if cli.multipass {
        config.multipass = true;
    }
    if cli.pretty {
        config.js2svg.pretty = true;
        if let Some(indent) = cli.indent {
            config.js2svg.indent = indent;
        }
    }
    if cli.datauri.is_some() {
        config.datauri = cli.datauri;
    }

    Ok(config)
}

fn stdout_or_first(outputs: &[PathBuf]) -> PathBuf {
    outputs.first().cloned().unwrap_or_else(|| PathBuf::from("-"))
}

fn optimize_folder(
    config: &Config,
    dir: &Path,
    output: &Path,
    recursive: bool,
    quiet: bool,
) -> Result<()> {
    if !quiet {
        println!("Processing directory '{}':\n", dir.display());
    }

    let jobs = files::collect_folder(dir, output, recursive)?;
    jobs.par_iter().try_for_each(|job| optimize_file(config, job, quiet))
}

fn optimize_file(config: &Config, job: &FileJob, quiet: bool) -> Result<()> {
    let data = fs::read_to_string(&job.input)
        .with_context(|| format!("couldn't read '{}'", job.input.display()))?;
    process_svg(config, &data, Some(job.input.as_path()), &job.output, quiet)
}

fn process_svg(
    config: &Config,
    data: &str,
    input: Option<&Path>,
    output: &Path,
    quiet: bool,
) -> Result<()> {
    let start = Instant::now();

    let mut result = optimize_str(data, config).with_context(|| match input {
        Some(path) => format!("failed to optimize '{}'", path.display()),
        None => "failed to optimize input".to_string(),
    })?;
    if let Some(kind) = config.datauri {
        result = datauri::encode(&result, kind);
    }
    let elapsed = start.elapsed();

    if files::is_stdio(output) {
        println!("{result}");
        return Ok(());
    }

    files::write_output(input, output, &result)?;

    if !quiet {
        let mut report = String::new();
        if let Some(name) = input.and_then(Path::file_name) {
            report.push_str(&format!("\n{}:\n", name.to_string_lossy()));
        }
        report.push_str(&format!("Done in {} ms!\n", elapsed.as_millis()));
        report.push_str(&profit_info(data.len(), result.len()));
        println!("{report}");
    }

    Ok(())
}

fn profit_info(in_bytes: usize, out_bytes: usize) -> String {
    let profit = if in_bytes > 0 {
        100.0 - (out_bytes as f64 * 100.0) / in_bytes as f64
    } else {
        0.0
    };
    let kib = |bytes: usize| (bytes as f64 / 1024.0 * 1000.0).round() / 1000.0;
    let percent = format!("{}%", (profit.abs() * 10.0).round() / 10.0);

    format!(
        "{} KiB{}{} = {} KiB",
        kib(in_bytes),
        if profit < 0.0 { " + " } else { " - " },
        percent.green(),
        kib(out_bytes)
    )
}

fn show_available_plugins() {
    let mut plugins = BUILTIN_PLUGINS.to_vec();
    plugins.sort_by(|a, b| a.name.cmp(b.name));

    println!("Currently available plugins:");
    for plugin in plugins {
        println!(" [ {} ] {}", plugin.name.green(), plugin.description);
    }
}
