//! 同义词表
//!
//! 规范词 → 候选词列表的有序映射。条目顺序即扫描顺序，先匹配者优先。

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// 同义词条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymEntry {
    /// 规范词
    pub canonical: String,
    /// 候选词
    pub alternatives: Vec<String>,
}

impl SynonymEntry {
    pub fn new(canonical: &str, alternatives: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            alternatives: alternatives.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// 同义词源文件错误
#[derive(thiserror::Error, Debug)]
pub enum SynonymSourceError {
    #[error("无法读取同义词文件: {0}")]
    Io(#[from] std::io::Error),

    #[error("同义词文件不是合法的 JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("同义词条目 `{0}` 的值必须是字符串数组")]
    InvalidEntry(String),
}

/// 同义词表
///
/// 加载后在进程内只读共享。查找结果在构建时按先匹配顺序解析，
/// 并沿规范词链追溯到不动点，保证归一化幂等。
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    entries: Vec<SynonymEntry>,
    lookup: HashMap<String, String>,
    ambiguous: Vec<String>,
}

impl SynonymTable {
    /// 空表
    pub fn empty() -> Self {
        Self::default()
    }

    /// 从有序条目构建
    pub fn from_entries(entries: Vec<SynonymEntry>) -> Self {
        let entries: Vec<SynonymEntry> = entries
            .into_iter()
            .filter_map(|entry| {
                let canonical = entry.canonical.to_lowercase();
                if canonical.is_empty() || canonical.chars().any(char::is_whitespace) {
                    warn!(
                        "Skipping synonym entry `{}`: canonical term must be a single word",
                        entry.canonical
                    );
                    return None;
                }
                Some(SynonymEntry {
                    canonical,
                    alternatives: entry
                        .alternatives
                        .iter()
                        .map(|a| a.to_lowercase())
                        .collect(),
                })
            })
            .collect();

        let mut first_match: HashMap<&str, usize> = HashMap::new();
        let mut ambiguous = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            let terms = std::iter::once(&entry.canonical).chain(entry.alternatives.iter());
            for term in terms {
                match first_match.get(term.as_str()) {
                    Some(&owner) if owner != index => {
                        if !ambiguous.contains(term) {
                            ambiguous.push(term.clone());
                        }
                    }
                    Some(_) => {}
                    None => {
                        first_match.insert(term.as_str(), index);
                    }
                }
            }
        }

        if !ambiguous.is_empty() {
            warn!(
                "Ambiguous synonym table, first entry wins for: {}",
                ambiguous.join(", ")
            );
        }

        let lookup = first_match
            .iter()
            .map(|(&term, &start)| {
                let mut index = start;
                // A canonical term is always registered, at its own entry or an earlier one.
                loop {
                    let next = first_match[entries[index].canonical.as_str()];
                    if next == index {
                        break;
                    }
                    index = next;
                }
                (term.to_string(), entries[index].canonical.clone())
            })
            .collect();

        Self {
            entries,
            lookup,
            ambiguous,
        }
    }

    /// 从 JSON 文本解析，保留键的书写顺序
    pub fn from_json_str(source: &str) -> Result<Self, SynonymSourceError> {
        let document: Map<String, Value> = serde_json::from_str(source)?;

        let mut entries = Vec::with_capacity(document.len());
        for (canonical, value) in document {
            let Value::Array(items) = value else {
                return Err(SynonymSourceError::InvalidEntry(canonical));
            };
            let alternatives = items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    _ => Err(SynonymSourceError::InvalidEntry(canonical.clone())),
                })
                .collect::<Result<Vec<_>, _>>()?;
            entries.push(SynonymEntry {
                canonical,
                alternatives,
            });
        }

        Ok(Self::from_entries(entries))
    }

    /// 从文件加载
    ///
    /// 文件缺失或格式错误时记录警告并返回空表，不中断启动。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(table) => {
                debug!(
                    "Loaded {} synonym entries from {}",
                    table.len(),
                    path.display()
                );
                table
            }
            Err(e) => {
                warn!("{} ({}), continuing with an empty synonym table", e, path.display());
                Self::empty()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, SynonymSourceError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    /// 查找词元对应的规范词
    pub fn lookup(&self, token: &str) -> Option<&str> {
        self.lookup.get(token).map(String::as_str)
    }

    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    /// 出现在多个条目下的词
    pub fn ambiguous_terms(&self) -> &[String] {
        &self.ambiguous
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_json_order_is_preserved() {
        let table =
            SynonymTable::from_json_str(r#"{"zeta": ["z"], "alfa": ["a"], "mu": ["m"]}"#).unwrap();
        let canonicals: Vec<&str> = table.entries().iter().map(|e| e.canonical.as_str()).collect();
        assert_eq!(canonicals, vec!["zeta", "alfa", "mu"]);
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let table = SynonymTable::from_entries(vec![
            SynonymEntry::new("precio", &["costo", "valor"]),
            SynonymEntry::new("importe", &["valor", "monto"]),
        ]);

        assert_eq!(table.lookup("valor"), Some("precio"));
        assert_eq!(table.lookup("monto"), Some("importe"));
        assert_eq!(table.ambiguous_terms(), &["valor".to_string()]);
    }

    #[test]
    fn test_chained_canonical_resolves_to_fixpoint() {
        let table = SynonymTable::from_entries(vec![
            SynonymEntry::new("a", &["b"]),
            SynonymEntry::new("b", &["c"]),
        ]);

        assert_eq!(table.lookup("c"), Some("a"));
        assert_eq!(table.lookup("b"), Some("a"));
        assert_eq!(table.lookup("a"), Some("a"));
    }

    #[test]
    fn test_terms_are_lowercased_and_multiword_canonicals_skipped() {
        let table = SynonymTable::from_entries(vec![
            SynonymEntry::new("Horario", &["Hora"]),
            SynonymEntry::new("buenos dias", &["hola"]),
        ]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("hora"), Some("horario"));
        assert_eq!(table.lookup("hola"), None);
    }

    #[test]
    fn test_invalid_entry_is_rejected() {
        let err = SynonymTable::from_json_str(r#"{"hola": "saludo"}"#).unwrap_err();
        assert!(matches!(err, SynonymSourceError::InvalidEntry(ref k) if k == "hola"));

        let err = SynonymTable::from_json_str(r#"{"hola": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, SynonymSourceError::InvalidEntry(_)));
    }

    #[test]
    fn test_load_missing_file_yields_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = SynonymTable::load(dir.path().join("filtros.json"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_malformed_file_yields_empty_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let table = SynonymTable::load(file.path());
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"matricula": ["inscripcion", "registro"]}}"#).unwrap();
        let table = SynonymTable::load(file.path());
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("registro"), Some("matricula"));
    }
}
