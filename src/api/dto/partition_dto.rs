//! 知识片段 DTO

use serde::{Deserialize, Serialize};

/// 知识片段列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct PartitionListResponse {
    pub partitions: Vec<String>,
    pub total: usize,
}

impl From<Vec<String>> for PartitionListResponse {
    fn from(partitions: Vec<String>) -> Self {
        Self {
            total: partitions.len(),
            partitions,
        }
    }
}
