//! 执行器：提交转写并轮询到终态
//!
//! 状态机：submitted → polling → {succeeded, failed}。固定间隔轮询，
//! 次数有上限，超出报 PollTimeout（而非无限等待）。succeeded 时从输出
//! 抽取回复文本，缺失即 EmptyReply；failed/cancelled 携带执行记录报错。

use std::sync::Arc;
use std::time::Duration;

use crate::error::{DoctorError, DoctorResult};
use crate::orchestrator::client::Orchestrator;
use crate::orchestrator::types::ExecutionStatus;

/// 执行编排器
pub struct ExecutionRunner {
    orch: Arc<dyn Orchestrator>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl ExecutionRunner {
    pub fn new(orch: Arc<dyn Orchestrator>, poll_interval: Duration, max_attempts: u32) -> Self {
        Self {
            orch,
            poll_interval,
            max_attempts,
        }
    }

    /// 提交一次执行并等待回复文本
    pub async fn run(
        &self,
        task_id: &str,
        transcript: &str,
        external_user_id: &str,
    ) -> DoctorResult<String> {
        let execution_id = self
            .orch
            .create_execution(task_id, transcript, external_user_id)
            .await?;
        tracing::debug!(%execution_id, "execution submitted");

        for attempt in 1..=self.max_attempts {
            let record = self.orch.get_execution(&execution_id).await?;
            match record.status {
                ExecutionStatus::Succeeded => {
                    return record.reply_text().ok_or(DoctorError::EmptyReply);
                }
                ExecutionStatus::Failed | ExecutionStatus::Cancelled => {
                    tracing::error!(%execution_id, status = ?record.status, error = ?record.error, "execution failed");
                    return Err(DoctorError::ExecutionFailed { record });
                }
                _ => {
                    tracing::debug!(%execution_id, attempt, status = ?record.status, "execution pending");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        Err(DoctorError::PollTimeout {
            attempts: self.max_attempts,
        })
    }
}
