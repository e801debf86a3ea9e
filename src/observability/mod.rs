//! 可观测性模块
//!
//! 提供简单指标、结构化日志和健康检查。

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::config::LoggingConfig;
use crate::storage::repository::ConversationStore;

// ===== Simple Metrics =====

/// 简单应用指标
#[derive(Debug, Default)]
pub struct AppMetrics {
    pub answers_total: AtomicU64,
    pub answer_errors_total: AtomicU64,
    pub answer_latency_ms_sum: AtomicU64,
    pub partition_requests_total: AtomicU64,
}

impl AppMetrics {
    /// 记录一次回答请求
    pub fn record_answer(&self, duration_ms: u64, success: bool) {
        self.answers_total.fetch_add(1, Ordering::Relaxed);
        self.answer_latency_ms_sum
            .fetch_add(duration_ms, Ordering::Relaxed);
        if !success {
            self.answer_errors_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// 记录分片查询
    pub fn record_partitions(&self) {
        self.partition_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// 生成 Prometheus 文本格式指标
    pub fn gather(&self) -> String {
        let answers = self.answers_total.load(Ordering::Relaxed);
        format!(
            r#"# HELP answers_total Total answer requests
# TYPE answers_total counter
answers_total {}
# HELP answer_errors_total Failed answer requests
# TYPE answer_errors_total counter
answer_errors_total {}
# HELP answer_latency_seconds Answer latency in seconds
# TYPE answer_latency_seconds summary
answer_latency_seconds_sum {}
answer_latency_seconds_count {}
# HELP partition_requests_total Total partition inspection requests
# TYPE partition_requests_total counter
partition_requests_total {}
"#,
            answers,
            self.answer_errors_total.load(Ordering::Relaxed),
            self.answer_latency_ms_sum.load(Ordering::Relaxed) as f64 / 1000.0,
            answers,
            self.partition_requests_total.load(Ordering::Relaxed),
        )
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub checks: Vec<HealthCheck>,
}

/// 单个健康检查项
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    pub message: Option<String>,
}

impl HealthCheck {
    fn new(name: &str, healthy: bool, message: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            message,
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// 可观测性状态
#[derive(Clone)]
pub struct ObservabilityState {
    pub metrics: Arc<AppMetrics>,
    pub store: Arc<dyn ConversationStore>,
    pub knowledge_loaded: bool,
    pub start_time: DateTime<Utc>,
    pub version: String,
}

impl ObservabilityState {
    pub fn new(
        version: String,
        metrics: Arc<AppMetrics>,
        store: Arc<dyn ConversationStore>,
        knowledge_loaded: bool,
    ) -> Self {
        Self {
            metrics,
            store,
            knowledge_loaded,
            start_time: Utc::now(),
            version,
        }
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_seconds() as f64
    }

    async fn run_checks(&self) -> Vec<HealthCheck> {
        let store = match self.store.health_check().await {
            Ok(()) => HealthCheck::new("conversation_store", true, None),
            Err(e) => HealthCheck::new("conversation_store", false, Some(e.to_string())),
        };
        let knowledge = HealthCheck::new(
            "knowledge_base",
            self.knowledge_loaded,
            (!self.knowledge_loaded).then(|| "knowledge base not loaded".to_string()),
        );
        vec![store, knowledge]
    }
}

// ===== Health Check Handlers =====

/// 获取完整健康状态
pub async fn health_check(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let checks = state.run_checks().await;
    let all_healthy = checks.iter().all(HealthCheck::is_healthy);

    let health_status = HealthStatus {
        status: if all_healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        checks,
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health_status))
}

/// 简单存活检查
pub async fn liveness() -> impl IntoResponse {
    "OK"
}

/// 就绪检查（检查依赖服务）
pub async fn readiness(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let checks = state.run_checks().await;
    if checks.iter().all(HealthCheck::is_healthy) {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not Ready")
    }
}

/// Prometheus 指标端点
pub async fn metrics(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    (StatusCode::OK, state.metrics.gather())
}

/// 版本信息端点
pub async fn version(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/metrics", get(metrics))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Structured Logging =====

/// 初始化日志
///
/// `RUST_LOG` 优先于配置中的级别。配置了 `log_dir` 时按天滚动写入文件，
/// 返回的 guard 需在进程生命周期内保持存活。
pub fn init_tracing(config: &LoggingConfig, service_name: &str) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{}={}", service_name, config.level)));

    let (writer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, format!("{}.log", service_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                fmt::writer::BoxMakeWriter::new(writer),
                Some(guard),
            )
        }
        None => (fmt::writer::BoxMakeWriter::new(std::io::stdout), None),
    };

    let builder = fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(true)
        .with_line_number(true);

    let result = if config.structured {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    guard
}
