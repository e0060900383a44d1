use super::defaults;
use super::models::{AppConfig, ConsolidationMode, LogLevel, OrderSource};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    paths: PathsConfig,
    #[serde(default)]
    extraction: ExtractionConfig,
    #[serde(default)]
    consolidation: ConsolidationConfig,
    #[serde(default)]
    segments: SegmentsConfig,
    #[serde(default)]
    report: ReportConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            log_level: tables.logging.log_level,
            input_dir: tables.paths.input_dir,
            output_root: tables.paths.output_root,
            order_file_name: tables.paths.order_file_name,
            order_source: tables.extraction.order_source,
            mode: tables.consolidation.mode,
            basic_markup_threshold: tables.consolidation.basic_markup_threshold,
            filtered_markup_threshold: tables.consolidation.filtered_markup_threshold,
            copyright_keywords: tables.consolidation.copyright_keywords,
            min_lines: tables.consolidation.min_lines,
            min_mean_line_chars: tables.consolidation.min_mean_line_chars,
            chapter_markers: tables.consolidation.chapter_markers,
            segment_base_name: tables.segments.base_name,
            segment_char_limit: tables.segments.char_limit,
            write_report: tables.report.write_json,
            report_file_name: tables.report.file_name,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            paths: PathsConfig {
                input_dir: config.input_dir.clone(),
                output_root: config.output_root.clone(),
                order_file_name: config.order_file_name.clone(),
            },
            extraction: ExtractionConfig {
                order_source: config.order_source,
            },
            consolidation: ConsolidationConfig {
                mode: config.mode,
                basic_markup_threshold: config.basic_markup_threshold,
                filtered_markup_threshold: config.filtered_markup_threshold,
                copyright_keywords: config.copyright_keywords.clone(),
                min_lines: config.min_lines,
                min_mean_line_chars: config.min_mean_line_chars,
                chapter_markers: config.chapter_markers,
            },
            segments: SegmentsConfig {
                base_name: config.segment_base_name.clone(),
                char_limit: config.segment_char_limit,
            },
            report: ReportConfig {
                write_json: config.write_report,
                file_name: config.report_file_name.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct PathsConfig {
    #[serde(default = "defaults::default_input_dir")]
    input_dir: String,
    #[serde(default = "defaults::default_output_root")]
    output_root: String,
    #[serde(default = "defaults::default_order_file_name")]
    order_file_name: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            input_dir: defaults::default_input_dir(),
            output_root: defaults::default_output_root(),
            order_file_name: defaults::default_order_file_name(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
struct ExtractionConfig {
    #[serde(default)]
    order_source: OrderSource,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ConsolidationConfig {
    #[serde(default)]
    mode: ConsolidationMode,
    #[serde(default = "defaults::default_basic_markup_threshold")]
    basic_markup_threshold: f64,
    #[serde(default = "defaults::default_filtered_markup_threshold")]
    filtered_markup_threshold: f64,
    #[serde(default = "defaults::default_copyright_keywords")]
    copyright_keywords: Vec<String>,
    #[serde(default = "defaults::default_min_lines")]
    min_lines: usize,
    #[serde(default = "defaults::default_min_mean_line_chars")]
    min_mean_line_chars: usize,
    #[serde(default = "defaults::default_chapter_markers")]
    chapter_markers: bool,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        ConsolidationConfig {
            mode: ConsolidationMode::default(),
            basic_markup_threshold: defaults::default_basic_markup_threshold(),
            filtered_markup_threshold: defaults::default_filtered_markup_threshold(),
            copyright_keywords: defaults::default_copyright_keywords(),
            min_lines: defaults::default_min_lines(),
            min_mean_line_chars: defaults::default_min_mean_line_chars(),
            chapter_markers: defaults::default_chapter_markers(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SegmentsConfig {
    #[serde(default = "defaults::default_segment_base_name")]
    base_name: String,
    #[serde(default = "defaults::default_segment_char_limit")]
    char_limit: usize,
}

impl Default for SegmentsConfig {
    fn default() -> Self {
        SegmentsConfig {
            base_name: defaults::default_segment_base_name(),
            char_limit: defaults::default_segment_char_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ReportConfig {
    #[serde(default = "defaults::default_write_report")]
    write_json: bool,
    #[serde(default = "defaults::default_report_file_name")]
    file_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            write_json: defaults::default_write_report(),
            file_name: defaults::default_report_file_name(),
        }
    }
}
