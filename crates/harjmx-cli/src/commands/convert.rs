use crate::OutputFormat;
use anyhow::Result;
use clap::Args;
use harjmx_core::config::{
    lenient_max_string_size, lenient_pause_ms, lenient_start_number, parse_header_list,
};
use harjmx_core::{ConversionConfig, ConversionOutcome, RecordingStatus};
use std::path::PathBuf;

/// Options of `harjmx convert`
///
/// Numeric options are taken as text and parsed leniently: a value that
/// does not parse is logged and replaced by its default.
#[derive(Args, Debug, Clone, Default)]
pub struct ConvertArgs {
    /// Path to the HAR file
    #[arg(value_name = "HAR")]
    pub file: PathBuf,

    /// JMX file to write [default: input with a .jmx extension]
    #[arg(short, long, value_name = "JMX")]
    pub output: Option<PathBuf>,

    /// Also write the recorded responses as a JMeter XML result file
    #[arg(long, value_name = "XML")]
    pub record: Option<PathBuf>,

    /// Gap in ms between two requests that starts a new page (0 disables)
    #[arg(long, value_name = "MS", env = "HARJMX_PAUSE_MS")]
    pub pause_ms: Option<String>,

    /// Do not insert a pause before each page
    #[arg(long)]
    pub no_pause: bool,

    /// Keep Cookie headers instead of adding a Cookie Manager
    #[arg(long)]
    pub keep_cookies: bool,

    /// Keep cache validation headers instead of adding a Cache Manager
    #[arg(long)]
    pub keep_cache_headers: bool,

    /// Only convert entries whose URL matches this regex
    #[arg(long, value_name = "REGEX")]
    pub include: Option<String>,

    /// Skip entries whose URL matches this regex
    #[arg(long, value_name = "REGEX")]
    pub exclude: Option<String>,

    /// Comma separated request/response headers to strip
    #[arg(long, value_name = "A,B")]
    pub remove_headers: Option<String>,

    /// Largest string accepted in the HAR, in characters
    #[arg(long, value_name = "N", env = "HARJMX_MAX_STRING_SIZE")]
    pub max_string_size: Option<String>,

    /// Number of the first page
    #[arg(long, value_name = "N")]
    pub page_start: Option<String>,

    /// Number of the first sampler
    #[arg(long, value_name = "N")]
    pub sampler_start: Option<String>,

    /// CSV or JSON file overriding page names and pauses
    #[arg(long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Do not add a View Results Tree listener
    #[arg(long)]
    pub no_result_tree: bool,

    /// Emit WebSocket samplers for WebSocket connections
    #[arg(long)]
    pub websocket: bool,

    /// Group by time gaps even when the HAR declares pages
    #[arg(long)]
    pub ignore_har_pages: bool,
}

impl ConvertArgs {
    pub fn to_config(&self) -> ConversionConfig {
        let mut builder = ConversionConfig::builder(&self.file)
            .recording_path(self.record.clone())
            .include_pattern(self.include.clone())
            .exclude_pattern(self.exclude.clone())
            .headers_to_remove(
                self.remove_headers
                    .as_deref()
                    .map(parse_header_list)
                    .unwrap_or_default(),
            )
            .pause_threshold_ms(lenient_pause_ms(self.pause_ms.as_deref()))
            .add_pause(!self.no_pause)
            .page_start(lenient_start_number("page start", self.page_start.as_deref()))
            .sampler_start(lenient_start_number(
                "sampler start",
                self.sampler_start.as_deref(),
            ))
            .max_string_size(lenient_max_string_size(self.max_string_size.as_deref()))
            .remove_cookie(!self.keep_cookies)
            .remove_cache_headers(!self.keep_cache_headers)
            .add_result_tree(!self.no_result_tree)
            .websocket_enabled(self.websocket)
            .use_har_pages(!self.ignore_har_pages)
            .metadata_path(self.metadata.clone());

        if let Some(output) = &self.output {
            builder = builder.jmx_path(output);
        }
        builder.build()
    }
}

/// Convert a HAR file and return the outcome without printing it
pub fn run(args: &ConvertArgs) -> Result<ConversionOutcome> {
    let config = args.to_config();
    harjmx_core::convert(&config).map_err(|e| {
        let context = if e.is_output_error() {
            format!("Failed to write output for {}", config.har_path.display())
        } else {
            format!("Failed to convert {}", config.har_path.display())
        };
        anyhow::Error::new(e).context(context)
    })
}

pub fn execute(args: &ConvertArgs, format: OutputFormat) -> Result<()> {
    tracing::info!("Converting HAR file: {}", args.file.display());

    let outcome = run(args)?;
    tracing::debug!("Rendering outcome as {}", format.as_str());

    match format {
        OutputFormat::Json => output_json(&outcome)?,
        OutputFormat::Pretty => output_pretty(&outcome),
    }

    Ok(())
}

fn output_json(outcome: &ConversionOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome)?;
    println!("{}", json);
    Ok(())
}

fn output_pretty(outcome: &ConversionOutcome) {
    use console::style;

    println!("\n{}", style("HAR Conversion").bold().cyan());
    println!("{}", style("==============").cyan());

    println!("  Test Plan:        {}", outcome.jmx_path.display());
    match &outcome.recording {
        RecordingStatus::NotRequested => {}
        RecordingStatus::Written(path) => {
            println!("  Recording:        {}", path.display());
        }
        RecordingStatus::Failed(reason) => {
            println!("  Recording:        {} {}", style("failed:").red(), reason);
        }
    }
    println!("  Entries Read:     {}", outcome.entries_read);
    if outcome.entries_filtered > 0 {
        println!("  Entries Filtered: {}", outcome.entries_filtered);
    }
    println!("  Pages:            {}", outcome.pages);
    println!("  Samplers:         {}", outcome.samplers);

    if !outcome.warnings.is_empty() {
        println!("\n{}", style("Warnings:").bold().yellow());
        for warning in &outcome.warnings {
            println!("  - {}", warning);
        }
    }
    println!();
}
