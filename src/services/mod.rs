//! 服务模块

pub mod pipeline;

pub use pipeline::{
    AnswerOutcome, AnswerService, DEFAULT_TOP_K, RetrievalPipeline, create_answer_service,
};
