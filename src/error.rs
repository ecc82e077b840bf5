//! 服务错误类型
//!
//! 与 HTTP 层配合：Validation → 400、UserNotFound → 404，其余 → 500（带 details 供排查）。

use thiserror::Error;

use crate::orchestrator::ExecutionRecord;

/// AI 医生服务错误
#[derive(Error, Debug)]
pub enum DoctorError {
    /// 请求字段缺失或为空
    #[error("{0}")]
    Validation(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    /// 编排服务的执行以 failed/cancelled 结束，携带执行记录供排查
    #[error("execution {} ended as {:?}", .record.id, .record.status)]
    ExecutionFailed { record: ExecutionRecord },

    /// 执行成功但输出中没有可用的回复文本
    #[error("execution succeeded but returned no reply text")]
    EmptyReply,

    /// 轮询超过最大次数仍未到达终态
    #[error("execution still not terminal after {attempts} polls")]
    PollTimeout { attempts: u32 },

    /// 条件保存失败：磁盘上的版本已被并发请求更新
    #[error("history document was modified concurrently")]
    ConcurrentModification,

    /// 编排服务返回非 2xx 或响应不符合预期
    #[error("orchestrator error: {0}")]
    Orchestrator(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type DoctorResult<T> = Result<T, DoctorError>;
