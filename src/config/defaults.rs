pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}

pub(crate) fn default_input_dir() -> String {
    ".".to_string()
}

pub(crate) fn default_output_root() -> String {
    "books".to_string()
}

pub(crate) fn default_order_file_name() -> String {
    "files_order.txt".to_string()
}

pub(crate) fn default_basic_markup_threshold() -> f64 {
    0.5
}

pub(crate) fn default_filtered_markup_threshold() -> f64 {
    0.9
}

pub(crate) fn default_copyright_keywords() -> Vec<String> {
    vec![
        "copyright".to_string(),
        "all rights reserved".to_string(),
        "ISBN".to_string(),
        "Library of Congress".to_string(),
    ]
}

pub(crate) fn default_min_lines() -> usize {
    5
}

pub(crate) fn default_min_mean_line_chars() -> usize {
    40
}

pub(crate) fn default_chapter_markers() -> bool {
    true
}

pub(crate) fn default_segment_base_name() -> String {
    "book_segment".to_string()
}

pub(crate) fn default_segment_char_limit() -> usize {
    380_000
}

pub(crate) fn default_write_report() -> bool {
    false
}

pub(crate) fn default_report_file_name() -> String {
    "consolidation_report.json".to_string()
}
