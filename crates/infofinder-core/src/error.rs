//! 核心错误类型（致命类：配置 / 规则编译）
use std::path::PathBuf;

use thiserror::Error;

/// 扫描开始前即中止流程的错误；单文件读写类错误不走此类型（就地记录并跳过）
#[derive(Debug, Error)]
pub enum FinderError {
    /// 配置文件读取失败
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// 规则正则编译失败；规则集残缺时扫描无意义，整体中止
    #[error("rule `{id}` failed to compile: {source}")]
    RuleCompilation {
        id: String,
        #[source]
        source: regex::Error,
    },
}
