use serde::Deserialize;

/// Flat runtime configuration; the on-disk form is the sectioned layout in `tables`.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_input_dir")]
    pub input_dir: String,
    #[serde(default = "crate::config::defaults::default_output_root")]
    pub output_root: String,
    #[serde(default = "crate::config::defaults::default_order_file_name")]
    pub order_file_name: String,
    #[serde(default)]
    pub order_source: OrderSource,
    #[serde(default)]
    pub mode: ConsolidationMode,
    #[serde(default = "crate::config::defaults::default_basic_markup_threshold")]
    pub basic_markup_threshold: f64,
    #[serde(default = "crate::config::defaults::default_filtered_markup_threshold")]
    pub filtered_markup_threshold: f64,
    #[serde(default = "crate::config::defaults::default_copyright_keywords")]
    pub copyright_keywords: Vec<String>,
    #[serde(default = "crate::config::defaults::default_min_lines")]
    pub min_lines: usize,
    #[serde(default = "crate::config::defaults::default_min_mean_line_chars")]
    pub min_mean_line_chars: usize,
    #[serde(default = "crate::config::defaults::default_chapter_markers")]
    pub chapter_markers: bool,
    #[serde(default = "crate::config::defaults::default_segment_base_name")]
    pub segment_base_name: String,
    #[serde(default = "crate::config::defaults::default_segment_char_limit")]
    pub segment_char_limit: usize,
    #[serde(default = "crate::config::defaults::default_write_report")]
    pub write_report: bool,
    #[serde(default = "crate::config::defaults::default_report_file_name")]
    pub report_file_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: crate::config::defaults::default_log_level(),
            input_dir: crate::config::defaults::default_input_dir(),
            output_root: crate::config::defaults::default_output_root(),
            order_file_name: crate::config::defaults::default_order_file_name(),
            order_source: OrderSource::default(),
            mode: ConsolidationMode::default(),
            basic_markup_threshold: crate::config::defaults::default_basic_markup_threshold(),
            filtered_markup_threshold: crate::config::defaults::default_filtered_markup_threshold(),
            copyright_keywords: crate::config::defaults::default_copyright_keywords(),
            min_lines: crate::config::defaults::default_min_lines(),
            min_mean_line_chars: crate::config::defaults::default_min_mean_line_chars(),
            chapter_markers: crate::config::defaults::default_chapter_markers(),
            segment_base_name: crate::config::defaults::default_segment_base_name(),
            segment_char_limit: crate::config::defaults::default_segment_char_limit(),
            write_report: crate::config::defaults::default_write_report(),
            report_file_name: crate::config::defaults::default_report_file_name(),
        }
    }
}

impl AppConfig {
    /// Segment size limit in characters; `None` when configured as unbounded (`0`).
    pub fn segment_limit(&self) -> Option<usize> {
        (self.segment_char_limit > 0).then_some(self.segment_char_limit)
    }

    /// Markup-density cutoff for the active consolidation mode.
    pub fn markup_threshold(&self) -> f64 {
        match self.mode {
            ConsolidationMode::Basic => self.basic_markup_threshold,
            ConsolidationMode::Filtered => self.filtered_markup_threshold,
        }
    }
}

/// Which consolidation policy decides fragment inclusion.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConsolidationMode {
    /// Density filter plus plain tag removal and page-number dropping.
    Basic,
    /// Density filter, structural tag handling, copyright and index/footnote filters.
    #[default]
    Filtered,
}

impl std::fmt::Display for ConsolidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConsolidationMode::Basic => "basic",
            ConsolidationMode::Filtered => "filtered",
        };
        write!(f, "{}", label)
    }
}

/// Where the reading order of fragments comes from inside the package document.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderSource {
    #[default]
    Manifest,
    Spine,
}

impl std::fmt::Display for OrderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderSource::Manifest => "manifest",
            OrderSource::Spine => "spine",
        };
        write!(f, "{}", label)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
