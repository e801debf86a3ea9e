//! 同义词模块
//!
//! 加载同义词表并对查询进行词汇归一化。

pub mod normalizer;
pub mod table;

pub use normalizer::{Normalizer, normalize};
pub use table::{SynonymEntry, SynonymSourceError, SynonymTable};
