//! 知识库加载
//!
//! 读取源文档，按空行切分为片段并写入向量索引。

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use crate::index::embedding::EmbeddingModel;
use crate::index::vector::MemoryVectorIndex;

/// 片段分隔符
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// 按空行切分文本，去除首尾空白并丢弃空片段
pub fn split_chunks(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split(CHUNK_SEPARATOR)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect()
}

/// 知识库文档
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    source: PathBuf,
    chunks: Vec<String>,
}

impl KnowledgeBase {
    pub fn from_text(source: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            source: source.into(),
            chunks: split_chunks(text),
        }
    }

    /// 加载源文档；文件不存在时返回 `None`
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                "Knowledge source {} not found, answering is disabled",
                path.display()
            );
            return Ok(None);
        }

        let text = std::fs::read_to_string(path)?;
        let knowledge = Self::from_text(path, &text);
        info!(
            "Loaded {} knowledge chunks from {}",
            knowledge.chunks.len(),
            path.display()
        );
        Ok(Some(knowledge))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// 构建内存向量索引
    pub async fn build_index(
        &self,
        embedding_model: Box<dyn EmbeddingModel>,
    ) -> Result<MemoryVectorIndex> {
        let index = MemoryVectorIndex::new(embedding_model);
        index.add_chunks(&self.chunks).await?;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::embedding::HashingEmbeddingModel;
    use crate::index::vector::VectorIndex;
    use std::io::Write;

    #[test]
    fn test_split_chunks() {
        let text = "Primer párrafo.\nsigue aquí.\n\n\n  Segundo párrafo.  \r\n\r\nTercero\n\n";
        assert_eq!(
            split_chunks(text),
            vec![
                "Primer párrafo.\nsigue aquí.".to_string(),
                "Segundo párrafo.".to_string(),
                "Tercero".to_string(),
            ]
        );
        assert!(split_chunks("\n\n  \n\n").is_empty());
    }

    #[test]
    fn test_load_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let knowledge = KnowledgeBase::load(dir.path().join("conocimiento.txt")).unwrap();
        assert!(knowledge.is_none());
    }

    #[tokio::test]
    async fn test_load_and_build_index() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Horario: lunes a viernes.\n\nDirección: calle 10.").unwrap();

        let knowledge = KnowledgeBase::load(file.path()).unwrap().unwrap();
        assert_eq!(knowledge.chunks().len(), 2);
        assert_eq!(knowledge.source(), file.path());

        let index = knowledge
            .build_index(Box::new(HashingEmbeddingModel::new(64)))
            .await
            .unwrap();
        assert_eq!(
            index.partitions().await.unwrap(),
            knowledge.chunks().to_vec()
        );
    }
}
