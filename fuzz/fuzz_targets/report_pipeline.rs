#![no_main]

use libfuzzer_sys::fuzz_target;
use tracemap_core::Dataset;
use tracemap_core::config::ProjectConfig;
use tracemap_layout::TraceReport;

// Any dataset that parses must run through the whole pipeline without
// panicking and keep every bar inside its configured bounds.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(dataset) = Dataset::from_json_str(text) else {
        return;
    };
    let config = ProjectConfig::default();
    let report = TraceReport::build(&dataset, &config, 1000.0);
    for column in &report.coverage.columns {
        assert!(column.bar_height >= config.coverage.min_bar_height);
        assert!(column.bar_height <= config.coverage.max_bar_height);
    }
    let _ = report.to_json();
});
