//! 命中数据模型：原始命中聚合与归一化结果
use crate::rules::CompiledRuleSet;

/// 单条原始命中
/// 规则含 0/1 个捕获组时为单串；多组时保留全部组值（未参与的组为 ""）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawHit {
    Single(String),
    Grouped(Vec<String>),
}

/// 按规则聚合的原始命中；扫描期间由聚合线程独占写入，此后只读
#[derive(Debug)]
pub struct HitCollection {
    pub(crate) entries: Vec<(String, Vec<RawHit>)>,
}

impl HitCollection {
    /// 为规则集中每条规则建立一个空命中序列
    pub fn for_rule_set(rule_set: &CompiledRuleSet) -> Self {
        Self {
            entries: rule_set
                .rules()
                .iter()
                .map(|r| (r.id.clone(), Vec::new()))
                .collect(),
        }
    }

    pub(crate) fn extend_rule(&mut self, rule_index: usize, hits: Vec<RawHit>) {
        if let Some((_, entry)) = self.entries.get_mut(rule_index) {
            entry.extend(hits);
        }
    }

    pub fn get(&self, rule_id: &str) -> Option<&[RawHit]> {
        self.entries
            .iter()
            .find(|(id, _)| id == rule_id)
            .map(|(_, hits)| hits.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RawHit])> {
        self.entries
            .iter()
            .map(|(id, hits)| (id.as_str(), hits.as_slice()))
    }
}

/// 归一化结果：规则标识 → 保序去重后的命中串；派生一次后不再变更
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResults {
    pub(crate) entries: Vec<(String, Vec<String>)>,
}

impl ScanResults {
    pub fn get(&self, rule_id: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(id, _)| id == rule_id)
            .map(|(_, hits)| hits.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(id, hits)| (id.as_str(), hits.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 全部规则的命中总数
    pub fn hit_count(&self) -> usize {
        self.entries.iter().map(|(_, hits)| hits.len()).sum()
    }
}
