//! 报表落盘与命名（sink 自行决定物理格式，这里输出 CSV）
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use infofinder_core::{FileConfig, ReportTable, ScanResults, APP_NAME_RULE_ID};
use tracing::info;

/// 写出报表并返回落盘路径
/// 文件名 `<应用名>_<时间戳>.csv`；应用名无法解析时退化为纯时间戳
pub fn write_report(
    table: &ReportTable,
    results: &ScanResults,
    file_config: &FileConfig,
    target_folder: &Path,
) -> Result<PathBuf> {
    let folder = PathBuf::from(&file_config.excel_folder);
    if !folder.exists() {
        fs::create_dir_all(&folder)
            .with_context(|| format!("failed to create report folder {}", folder.display()))?;
        info!(folder = %folder.display(), "created report folder");
    }

    let timestamp = Local::now().format("%Y_%m_%d_%H_%M_%S");
    let app_name = extract_app_name(target_folder, results);
    let file_name = if app_name.is_empty() {
        format!("{timestamp}.csv")
    } else {
        format!("{app_name}_{timestamp}.csv")
    };
    let path = folder.join(file_name);

    fs::write(&path, render_csv(table))
        .with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(path)
}

/// 报表的 CSV 文本（RFC 4180 引号转义，\r\n 行尾）
fn render_csv(table: &ReportTable) -> String {
    let mut out = String::new();
    push_row(&mut out, table.columns.iter().map(|c| c.name.as_str()));
    for row in 0..table.row_count() {
        push_row(&mut out, table.columns.iter().map(|c| c.values[row].as_str()));
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&escape_cell(cell));
    }
    out.push_str("\r\n");
}

fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// 应用名解析顺序：app.json 导航标题 → App_Name_regex 首个命中 → 目录名
fn extract_app_name(target_folder: &Path, results: &ScanResults) -> String {
    if let Some(name) = app_name_from_app_json(target_folder) {
        return safe_name(&name);
    }
    if let Some(first) = results.get(APP_NAME_RULE_ID).and_then(|hits| hits.first()) {
        return safe_name(first);
    }
    target_folder
        .file_name()
        .map(|n| safe_name(&n.to_string_lossy()))
        .unwrap_or_default()
}

/// 读取目录下 app.json 的导航标题；任何一步失败都按“没有”处理
pub(crate) fn app_name_from_app_json(target_folder: &Path) -> Option<String> {
    let text = fs::read_to_string(target_folder.join("app.json")).ok()?;
    let data: serde_json::Value = serde_json::from_str(&text).ok()?;
    let window = data.get("window")?;
    let title = window
        .get("navigationBarTitleText")
        .or_else(|| window.get("defaultTitle"))?;
    title
        .as_str()
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
}

/// 去除文件名不合法字符
fn safe_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect::<String>()
        .trim()
        .to_string()
}
