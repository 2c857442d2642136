//! 规则合并与编译
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::config::{AdditionalRule, RegexConfig};
use crate::error::FinderError;

/// 主动验证协作方约定消费的两条规则
pub const URL_RULE_ID: &str = "Url_regex";
pub const URI_RULE_ID: &str = "Uri_regex";
/// 报表命名时优先取用的规则
pub const APP_NAME_RULE_ID: &str = "App_Name_regex";

/// 规则来源：基础配置映射，或附加来源（内联列表 / 外部规则文件）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOrigin {
    Base,
    Additional,
}

/// 合并完成、尚未编译的规则
#[derive(Debug, Clone)]
pub struct RuleDefinition {
    pub id: String,
    pub pattern: String,
    pub origin: RuleOrigin,
}

/// 已编译的单条规则
#[derive(Debug)]
pub struct CompiledRule {
    pub id: String,
    pub regex: Regex,
    pub origin: RuleOrigin,
}

/// 编译完成的规则集：按配置顺序排列，标识唯一，一次扫描期间只读
#[derive(Debug)]
pub struct CompiledRuleSet {
    rules: Vec<CompiledRule>,
}

impl CompiledRuleSet {
    /// 合并基础与附加规则并全部编译；任一 pattern 非法即整体失败
    pub fn compile(regex_config: &RegexConfig) -> Result<Self, FinderError> {
        let mut rules = Vec::new();
        for def in merge_rule_definitions(regex_config) {
            let regex = Regex::new(&def.pattern).map_err(|source| {
                FinderError::RuleCompilation {
                    id: def.id.clone(),
                    source,
                }
            })?;
            rules.push(CompiledRule {
                id: def.id,
                regex,
                origin: def.origin,
            });
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 附加规则的标识集合，报表阶段据此并入合并列
    pub fn additional_ids(&self) -> HashSet<String> {
        self.rules
            .iter()
            .filter(|r| r.origin == RuleOrigin::Additional)
            .map(|r| r.id.clone())
            .collect()
    }
}

/// 外部规则文件的顶层结构（YAML）
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<AdditionalRule>,
}

/// 合并基础规则与两路附加规则
/// - enabled=false 或缺 pattern 的附加条目直接丢弃
/// - 附加条目缺 id 时按当前规则数生成 `rule_<n>`，与已有标识冲突则递增
/// - 显式 id 与已有规则重名时覆盖其 pattern，合并后标识保持唯一
fn merge_rule_definitions(regex_config: &RegexConfig) -> Vec<RuleDefinition> {
    let mut defs: Vec<RuleDefinition> = regex_config
        .base_rules
        .iter()
        .map(|(id, pattern)| RuleDefinition {
            id: id.clone(),
            pattern: pattern.clone(),
            origin: RuleOrigin::Base,
        })
        .collect();

    let mut additional = regex_config.additional_rules.clone();
    if let Some(path) = &regex_config.additional_rules_file {
        additional.extend(load_rule_file(Path::new(path)));
    }

    for rule in additional {
        if !rule.enabled {
            continue;
        }
        let pattern = match rule.pattern {
            Some(p) if !p.is_empty() => p,
            _ => continue,
        };
        let id = match rule.id {
            Some(id) if !id.is_empty() => id,
            _ => generate_rule_id(&defs),
        };
        match defs.iter_mut().find(|d| d.id == id) {
            Some(existing) => {
                existing.pattern = pattern;
                existing.origin = RuleOrigin::Additional;
            }
            None => defs.push(RuleDefinition {
                id,
                pattern,
                origin: RuleOrigin::Additional,
            }),
        }
    }
    defs
}

/// 生成当前唯一的回退标识
fn generate_rule_id(defs: &[RuleDefinition]) -> String {
    let mut n = defs.len();
    loop {
        let id = format!("rule_{n}");
        if !defs.iter().any(|d| d.id == id) {
            return id;
        }
        n += 1;
    }
}

/// 读取外部规则文件；缺失或解析失败都不致命，记录后按零条附加规则处理
fn load_rule_file(path: &Path) -> Vec<AdditionalRule> {
    if !path.exists() {
        return Vec::new();
    }
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to read additional rule file");
            return Vec::new();
        }
    };
    match serde_yaml::from_str::<RuleFile>(&text) {
        Ok(file) => file.rules,
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to parse additional rule file");
            Vec::new()
        }
    }
}
