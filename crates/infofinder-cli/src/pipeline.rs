//! 扫描管线：编译规则 → 并行扫描 → 报表落盘 → 可选主动验证
use std::path::Path;

use anyhow::{Context, Result};
use infofinder_core::{
    build_report_table, scan_folder, AppConfig, CompiledRuleSet, ScanOptions, URI_RULE_ID,
    URL_RULE_ID,
};
use tracing::info;

use crate::active;
use crate::sink;

pub fn run(target_folder: &Path, config: &AppConfig) -> Result<()> {
    let rule_set =
        CompiledRuleSet::compile(&config.regex_config).context("rule compilation failed")?;
    info!(rules = rule_set.len(), target = %target_folder.display(), "starting scan");

    let results = scan_folder(
        target_folder,
        &rule_set,
        &config.file_config,
        &ScanOptions::default(),
    );
    info!(hits = results.hit_count(), "scan finished");

    let table = build_report_table(&results, &rule_set.additional_ids());
    let report_path = sink::write_report(&table, &results, &config.file_config, target_folder)?;
    info!(report = %report_path.display(), "report written");

    if config.request_config.request_active {
        let urls = results.get(URL_RULE_ID).unwrap_or(&[]);
        let uris = results.get(URI_RULE_ID).unwrap_or(&[]);
        active::scan_active(urls, uris, &config.request_config);
    }

    Ok(())
}
