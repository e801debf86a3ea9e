//! 查询归一化
//!
//! 将查询中的候选词替换为规范词。

use std::sync::Arc;

use crate::synonyms::table::SynonymTable;

/// 归一化文本
///
/// 空表时原样返回输入。否则转小写、按空白切分（不剥离标点），
/// 逐词替换后以单个空格重新拼接；词序与词数保持不变。
pub fn normalize(text: &str, table: &SynonymTable) -> String {
    if table.is_empty() {
        return text.to_string();
    }

    text.to_lowercase()
        .split_whitespace()
        .map(|token| table.lookup(token).unwrap_or(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 持有共享同义词表的归一化器
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    table: Arc<SynonymTable>,
}

impl Normalizer {
    pub fn new(table: Arc<SynonymTable>) -> Self {
        Self { table }
    }

    pub fn normalize(&self, text: &str) -> String {
        normalize(text, &self.table)
    }

    pub fn table(&self) -> &SynonymTable {
        &self.table
    }
}
