//! Parley - 检索增强的多轮问答服务
//!
//! 对问题做同义词归一化，从知识库检索相关片段并交给生成器回答，
//! 按会话 ID 持久化完整的问答历史。

pub mod api;
pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;
pub mod synonyms;
