//! 配置模型（config.yaml，一次性加载后全程不可变）
use std::fs;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::FinderError;

/// 后缀名单（黑 / 白名单共用结构）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuffixList {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub suffix_list: Vec<String>,
}

impl SuffixList {
    fn contains(&self, suffix: &str) -> bool {
        self.suffix_list.iter().any(|s| s.eq_ignore_ascii_case(suffix))
    }
}

/// 文件扫描配置：后缀策略、报表输出目录，以及解包 / 监控协作方的参数
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(rename = "Black_Suffix_list", default)]
    pub black_suffix_list: SuffixList,
    #[serde(rename = "White_Suffix_list", default)]
    pub white_suffix_list: SuffixList,
    /// 报表输出目录
    #[serde(rename = "Excel_Folder", default = "default_excel_folder")]
    pub excel_folder: String,
    /// 小程序包所在目录（monitor 模式轮询对象）
    #[serde(rename = "WX_Applet_Path", default)]
    pub wx_applet_path: String,
    /// 监控轮询间隔（秒），同时用作新包落盘的等待时间
    #[serde(rename = "Sleep_Time", default = "default_sleep_time")]
    pub sleep_time: u64,
    /// 解包输出根目录
    #[serde(rename = "Applet_Packet_Save_Path", default = "default_save_path")]
    pub applet_packet_save_path: String,
    /// 解包方式：wxapkg（默认）或 unveilr
    #[serde(rename = "Unpack_Method", default = "default_unpack_method")]
    pub unpack_method: String,
    #[serde(rename = "Unveilr_Path", default)]
    pub unveilr_path: String,
    #[serde(rename = "Unveilr_Program_Name", default)]
    pub unveilr_program_name: String,
    #[serde(rename = "Unveilr_Depth", default = "default_unveilr_depth")]
    pub unveilr_depth: u32,
    #[serde(rename = "Wxapkg_Path", default)]
    pub wxapkg_path: String,
    #[serde(rename = "Wxapkg_Program_Name", default)]
    pub wxapkg_program_name: String,
    #[serde(rename = "Wxapkg_Threads", default = "default_wxapkg_threads")]
    pub wxapkg_threads: u32,
    #[serde(rename = "Wxapkg_Disable_Beautify", default)]
    pub wxapkg_disable_beautify: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            black_suffix_list: SuffixList::default(),
            white_suffix_list: SuffixList::default(),
            excel_folder: default_excel_folder(),
            wx_applet_path: String::new(),
            sleep_time: default_sleep_time(),
            applet_packet_save_path: default_save_path(),
            unpack_method: default_unpack_method(),
            unveilr_path: String::new(),
            unveilr_program_name: String::new(),
            unveilr_depth: default_unveilr_depth(),
            wxapkg_path: String::new(),
            wxapkg_program_name: String::new(),
            wxapkg_threads: default_wxapkg_threads(),
            wxapkg_disable_beautify: false,
        }
    }
}

impl FileConfig {
    /// 后缀策略判定（黑名单模式优先）：
    /// - 黑名单：扩展名在名单内则拒绝，无扩展名放行
    /// - 白名单：仅放行扩展名在名单内的文件，无扩展名拒绝
    /// - 两者均未启用：全部放行
    pub fn allows_name(&self, filename: &str) -> bool {
        let suffix = suffix_of(filename);
        if self.black_suffix_list.active {
            match suffix {
                Some(s) => !self.black_suffix_list.contains(&s),
                None => true,
            }
        } else if self.white_suffix_list.active {
            match suffix {
                Some(s) => self.white_suffix_list.contains(&s),
                None => false,
            }
        } else {
            true
        }
    }
}

/// 取最后一个 `.` 之后的小写扩展名；文件名中没有 `.` 时返回 None
fn suffix_of(filename: &str) -> Option<String> {
    let mut parts = filename.split('.');
    let last = parts.next_back()?;
    parts.next_back()?;
    Some(last.to_ascii_lowercase())
}

/// 附加规则条目（内联列表与外部规则文件共用）
#[derive(Debug, Clone, Deserialize)]
pub struct AdditionalRule {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// 正则规则配置：保序的基础规则映射，外加两个保留键指向附加规则来源
#[derive(Debug, Clone, Default)]
pub struct RegexConfig {
    /// 基础规则（配置文件中的书写顺序即报表列顺序）
    pub base_rules: Vec<(String, String)>,
    /// 内联附加规则
    pub additional_rules: Vec<AdditionalRule>,
    /// 外部规则文件路径（YAML，顶层 `rules:` 序列）
    pub additional_rules_file: Option<String>,
}

/// 保留键不作为规则名参与扫描
const ADDITIONAL_RULES_KEY: &str = "Additional_Secret_Rules";
const ADDITIONAL_RULES_FILE_KEY: &str = "Additional_Secret_Rules_File";

impl<'de> Deserialize<'de> for RegexConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // 经由 Mapping 手工拆字段，保住 YAML 映射的插入顺序
        let mapping = serde_yaml::Mapping::deserialize(deserializer)?;
        let mut config = RegexConfig::default();
        for (key, value) in mapping {
            let key = key
                .as_str()
                .ok_or_else(|| D::Error::custom("Regex_Config keys must be strings"))?
                .to_string();
            match key.as_str() {
                ADDITIONAL_RULES_KEY => {
                    if !value.is_null() {
                        config.additional_rules =
                            serde_yaml::from_value(value).map_err(D::Error::custom)?;
                    }
                }
                ADDITIONAL_RULES_FILE_KEY => {
                    if !value.is_null() {
                        config.additional_rules_file =
                            serde_yaml::from_value(value).map_err(D::Error::custom)?;
                    }
                }
                _ => {
                    let pattern: String =
                        serde_yaml::from_value(value).map_err(D::Error::custom)?;
                    config.base_rules.push((key, pattern));
                }
            }
        }
        Ok(config)
    }
}

/// 主动验证协作方的配置
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    #[serde(default)]
    pub request_active: bool,
    /// 单次请求超时（秒）
    #[serde(rename = "Request_Timeout", default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            request_active: false,
            request_timeout: default_request_timeout(),
        }
    }
}

/// 顶层配置（对应 config.yaml）
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "File_Config")]
    pub file_config: FileConfig,
    #[serde(rename = "Regex_Config")]
    pub regex_config: RegexConfig,
    #[serde(rename = "Request_Config", default)]
    pub request_config: RequestConfig,
}

/// 读取并解析配置文件；任何失败都是致命的，调用方应在扫描前退出
pub fn load_config(path: &Path) -> Result<AppConfig, FinderError> {
    let text = fs::read_to_string(path).map_err(|source| FinderError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| FinderError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

fn default_excel_folder() -> String {
    "excel_output".to_string()
}

fn default_sleep_time() -> u64 {
    10
}

fn default_save_path() -> String {
    "applet_packet_output".to_string()
}

fn default_unpack_method() -> String {
    "wxapkg".to_string()
}

fn default_unveilr_depth() -> u32 {
    5
}

fn default_wxapkg_threads() -> u32 {
    30
}

fn default_enabled() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blacklist(suffixes: &[&str]) -> FileConfig {
        FileConfig {
            black_suffix_list: SuffixList {
                active: true,
                suffix_list: suffixes.iter().map(|s| s.to_string()).collect(),
            },
            ..FileConfig::default()
        }
    }

    fn whitelist(suffixes: &[&str]) -> FileConfig {
        FileConfig {
            white_suffix_list: SuffixList {
                active: true,
                suffix_list: suffixes.iter().map(|s| s.to_string()).collect(),
            },
            ..FileConfig::default()
        }
    }

    #[test]
    fn blacklist_rejects_listed_suffix_only() {
        let config = blacklist(&["txt", "png"]);
        assert!(!config.allows_name("notes.txt"));
        assert!(!config.allows_name("logo.png"));
        assert!(config.allows_name("app.js"));
        // 黑名单模式下无扩展名放行
        assert!(config.allows_name("Makefile"));
    }

    #[test]
    fn whitelist_accepts_listed_suffix_only() {
        let config = whitelist(&["js", "json"]);
        assert!(config.allows_name("app.js"));
        assert!(config.allows_name("app.json"));
        assert!(!config.allows_name("notes.txt"));
        // 白名单模式下无扩展名拒绝
        assert!(!config.allows_name("Makefile"));
    }

    #[test]
    fn inactive_policies_allow_everything() {
        let config = FileConfig::default();
        assert!(config.allows_name("anything.bin"));
        assert!(config.allows_name("no_suffix"));
    }

    #[test]
    fn suffix_comparison_is_case_insensitive() {
        let config = blacklist(&["txt"]);
        assert!(!config.allows_name("NOTES.TXT"));
    }

    #[test]
    fn suffix_is_taken_after_last_dot() {
        let config = blacklist(&["txt"]);
        assert!(!config.allows_name("archive.tar.txt"));
        assert!(config.allows_name("archive.txt.gz"));
    }

    #[test]
    fn regex_config_keeps_base_rule_order_and_reserved_keys() {
        let yaml = r#"
Url_regex: "https?://\\S+"
appid_regex: "wx[0-9a-f]{16}"
Additional_Secret_Rules:
  - id: aws_key
    pattern: "AKIA[0-9A-Z]{16}"
Additional_Secret_Rules_File: ./rules/extra.yaml
"#;
        let config: RegexConfig = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<&str> = config.base_rules.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(names, ["Url_regex", "appid_regex"]);
        assert_eq!(config.additional_rules.len(), 1);
        assert_eq!(config.additional_rules[0].id.as_deref(), Some("aws_key"));
        assert!(config.additional_rules[0].enabled);
        assert_eq!(
            config.additional_rules_file.as_deref(),
            Some("./rules/extra.yaml")
        );
    }

    #[test]
    fn null_additional_sources_mean_no_rules() {
        let yaml = "Url_regex: \"https?://\\\\S+\"\nAdditional_Secret_Rules:\n";
        let config: RegexConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.additional_rules.is_empty());
        assert!(config.additional_rules_file.is_none());
    }

    #[test]
    fn full_config_round_trip_from_yaml() {
        let yaml = r#"
File_Config:
  Black_Suffix_list:
    active: true
    suffix_list: [png, jpg]
  White_Suffix_list:
    active: false
    suffix_list: []
  Excel_Folder: reports
Regex_Config:
  Url_regex: "https?://\\S+"
Request_Config:
  request_active: true
  Request_Timeout: 5
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.file_config.black_suffix_list.active);
        assert_eq!(config.file_config.excel_folder, "reports");
        assert_eq!(config.regex_config.base_rules.len(), 1);
        assert!(config.request_config.request_active);
        assert_eq!(config.request_config.request_timeout, 5);
    }
}
