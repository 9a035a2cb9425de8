//! End-to-end conversion of a HAR file into a JMeter test plan.

use crate::config::ConversionConfig;
use crate::filter::{HeaderSanitizer, UrlFilter};
use crate::har::HarReader;
use crate::jmx::{JmxOptions, JmxWriter, RecordingWriter};
use crate::metadata::ExternalMetadata;
use crate::sampler::SamplerBuilder;
use crate::transaction::{Page, TransactionGrouper};
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;

/// What happened to the optional recording file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RecordingStatus {
    NotRequested,
    Written(PathBuf),
    Failed(String),
}

/// Summary of a successful conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub jmx_path: PathBuf,
    pub recording: RecordingStatus,
    pub pages: usize,
    pub samplers: usize,
    pub entries_read: usize,
    pub entries_filtered: usize,
    pub warnings: Vec<String>,
}

/// Run the whole pipeline for one configuration
///
/// Nothing is written unless reading, filtering, grouping and metadata
/// loading all succeed.
pub fn convert(config: &ConversionConfig) -> Result<ConversionOutcome> {
    tracing::debug!("Converting {}", config.har_path.display());

    let filter = UrlFilter::new(
        config.include_pattern.as_deref(),
        config.exclude_pattern.as_deref(),
    )?;
    let metadata = config
        .metadata_path
        .as_deref()
        .map(ExternalMetadata::from_file)
        .transpose()?;

    let har = HarReader::from_file(&config.har_path, config.max_string_size)?;
    let har_pages = har.log.pages;
    let entries = har.log.entries;
    let entries_read = entries.len();

    let entries = if filter.is_noop() {
        entries
    } else {
        filter.apply(entries)
    };
    let entries_filtered = entries_read - entries.len();
    if entries_filtered > 0 {
        tracing::debug!("Filtered out {} of {} entries", entries_filtered, entries_read);
    }

    let sanitizer = HeaderSanitizer::new(
        config.headers_to_remove.iter().map(String::as_str),
        config.remove_cookie,
        config.remove_cache_headers,
    );
    let entries: Vec<_> = entries.iter().map(|e| sanitizer.sanitize(e)).collect();

    let groups = TransactionGrouper::from_config(config).group(entries, &har_pages)?;

    let builder = SamplerBuilder::new(config.websocket_enabled);
    let mut warnings = Vec::new();
    let mut pages: Vec<Page> = groups
        .into_iter()
        .map(|mut group| {
            let samplers = std::mem::take(&mut group.entries)
                .into_iter()
                .map(|numbered| {
                    let built = builder.build(numbered);
                    warnings.extend(built.diagnostic);
                    built.sampler
                })
                .collect();
            Page::from_group(group, samplers)
        })
        .collect();

    if let Some(metadata) = &metadata {
        if metadata.is_empty()
            && let Some(path) = &config.metadata_path
        {
            let msg = format!("Metadata file {} has no records", path.display());
            tracing::warn!("{}", msg);
            warnings.push(msg);
        }
        for key in metadata.merge(&mut pages) {
            let msg = format!("Metadata key '{}' matches no page", key);
            tracing::warn!("{}", msg);
            warnings.push(msg);
        }
    }

    let samplers = pages.iter().map(|p| p.samplers.len()).sum();
    let options = JmxOptions {
        test_plan_name: test_plan_name(config),
        cookie_manager: config.remove_cookie,
        cache_manager: config.remove_cache_headers,
        result_tree: config.add_result_tree,
        recording_file: config
            .recording_path
            .as_ref()
            .map(|p| p.display().to_string()),
    };

    let jmx_result = JmxWriter::to_file(&pages, &options, &config.jmx_path);

    let recording = match &config.recording_path {
        None => RecordingStatus::NotRequested,
        Some(path) => match RecordingWriter::to_file(&pages, path) {
            Ok(()) => RecordingStatus::Written(path.clone()),
            Err(e) => {
                tracing::warn!("{}", e);
                RecordingStatus::Failed(e.to_string())
            }
        },
    };
    jmx_result?;

    tracing::info!(
        "Converted {} entries into {} pages and {} samplers",
        entries_read - entries_filtered,
        pages.len(),
        samplers
    );

    Ok(ConversionOutcome {
        jmx_path: config.jmx_path.clone(),
        recording,
        pages: pages.len(),
        samplers,
        entries_read,
        entries_filtered,
        warnings,
    })
}

fn test_plan_name(config: &ConversionConfig) -> String {
    config
        .har_path
        .file_name()
        .map(|n| format!("HAR Imported - {}", n.to_string_lossy()))
        .unwrap_or_else(|| JmxOptions::default().test_plan_name)
}
