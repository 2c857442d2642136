//! infofinder 核心扫描库
//!
//! 反编译源码目录的敏感信息扫描引擎：
//! - 规则编译：基础规则映射与附加规则（内联列表 / 外部 YAML 规则文件）合并后统一编译，
//!   任一 pattern 非法即整体失败。
//! - 并行扫描：任务队列先整体填满，固定 20 线程工作池排空队列；命中经通道汇入
//!   单一聚合线程，结果表与进度计数不做跨线程共享写。
//! - 归一化：多捕获组命中解析为单一代表串（scheme 保留词置空、最长组胜出），
//!   保序去重，命中串按文件名复检后缀策略。
//! - 报表整形：控制字符净化 + 命名列 / 附加合并列划分；落盘由外部 sink 决定。

mod config;
mod error;
mod hits;
mod normalize;
mod report;
mod rules;
mod scan;
mod walk;

pub use config::{
    load_config, AdditionalRule, AppConfig, FileConfig, RegexConfig, RequestConfig, SuffixList,
};
pub use error::FinderError;
pub use hits::{HitCollection, RawHit, ScanResults};
pub use normalize::{dedupe_hits, normalize_collection, resolve_hit};
pub use report::{build_report_table, sanitize_value, ReportColumn, ReportTable, ADDITIONAL_COLUMN};
pub use rules::{
    CompiledRule, CompiledRuleSet, RuleDefinition, RuleOrigin, APP_NAME_RULE_ID, URI_RULE_ID,
    URL_RULE_ID,
};
pub use scan::{collect_hits, scan_folder, ScanOptions};
pub use walk::iter_target_files;
