use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use riffcarve::cli::{self, Command, LengthModeArg};
use riffcarve::config;
use riffcarve::decode;
use riffcarve::logging;
use riffcarve::metadata::JsonlSink;
use riffcarve::pipeline;
use riffcarve::report::ReportWriter;

fn main() -> Result<()> {
    let opts = cli::parse();
    logging::init(opts.log_format);

    match opts.command {
        Command::Extract {
            input,
            output,
            config_path,
            length_mode,
            no_labels,
            workers,
        } => run_extract(input, output, config_path, length_mode, no_labels, workers),
        Command::Inspect { input } => run_inspect(&input),
    }
}

fn run_extract(
    inputs: Vec<PathBuf>,
    output: PathBuf,
    config_path: Option<PathBuf>,
    length_mode: Option<LengthModeArg>,
    no_labels: bool,
    workers: Option<usize>,
) -> Result<()> {
    let loaded = config::load_config(config_path.as_deref())?;
    let mut cfg = loaded.config;
    if let Some(mode) = length_mode {
        cfg.length_mode = mode.into();
    }
    if no_labels {
        cfg.scan_labels = false;
    }
    if let Some(workers) = workers {
        cfg.workers = workers;
    }

    let run_output_dir = output.join(&cfg.run_id);
    std::fs::create_dir_all(&run_output_dir)
        .with_context(|| format!("creating {}", run_output_dir.display()))?;

    info!(
        "starting run_id={} inputs={} output={} workers={} length_mode={:?}",
        cfg.run_id,
        inputs.len(),
        run_output_dir.display(),
        cfg.workers,
        cfg.length_mode
    );

    let tool_version = env!("CARGO_PKG_VERSION");
    let sink = JsonlSink::create(&run_output_dir, tool_version, &loaded.config_hash)?;

    let stats = pipeline::run_extract(&cfg, &inputs, &run_output_dir, &sink)?;

    info!("riffcarve run finished");
    if stats.files_failed > 0 {
        anyhow::bail!("{} input file(s) could not be processed", stats.files_failed);
    }
    Ok(())
}

fn run_inspect(input: &Path) -> Result<()> {
    let buf = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let decoded = decode::decode_stream(&buf, 0)
        .with_context(|| format!("{} is not a RIFF/RIFX stream", input.display()))?;

    let stdout = std::io::stdout().lock();
    let mut out = BufWriter::new(stdout);
    let mut report = ReportWriter::new(&mut out);
    report.file_header(&input.display().to_string(), buf.len())?;
    report.render_stream(&buf, &decoded)?;
    out.flush()?;
    Ok(())
}
