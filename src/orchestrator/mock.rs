//! Mock 编排客户端（用于测试，无需网络）
//!
//! 可编排每次轮询返回的状态序列与最终输出，并统计各操作的调用次数，
//! 便于断言「缓存命中后不再走网络」之类的行为。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{DoctorError, DoctorResult};
use crate::orchestrator::client::Orchestrator;
use crate::orchestrator::types::{AgentProfile, ExecutionRecord, ExecutionStatus, TaskDef};

/// Mock 客户端：状态序列逐次弹出，弹空后停在最后一个状态
#[derive(Default)]
pub struct MockOrchestrator {
    /// 每次 get_execution 弹出一个；空时视为立即 succeeded
    statuses: Mutex<Vec<ExecutionStatus>>,
    /// succeeded 时返回的回复文本；None 表示输出缺失（触发 EmptyReply）
    reply: Option<String>,
    /// agent 创建失败开关（测试缓存不残留半成品）
    fail_agent_create: bool,
    pub agent_creates: AtomicUsize,
    pub task_creates: AtomicUsize,
    pub user_creates: AtomicUsize,
    pub execution_creates: AtomicUsize,
    pub polls: AtomicUsize,
}

impl MockOrchestrator {
    /// 立即成功并返回指定文本
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            ..Self::default()
        }
    }

    /// 先返回 n 次非终态，再成功
    pub fn pending_then_replying(n: usize, text: impl Into<String>) -> Self {
        let mut statuses = vec![ExecutionStatus::Succeeded];
        statuses.extend(std::iter::repeat(ExecutionStatus::Running).take(n));
        Self {
            statuses: Mutex::new(statuses),
            reply: Some(text.into()),
            ..Self::default()
        }
    }

    /// 执行以 failed 结束
    pub fn failing() -> Self {
        Self {
            statuses: Mutex::new(vec![ExecutionStatus::Failed]),
            ..Self::default()
        }
    }

    /// 成功但输出为空（触发 EmptyReply）
    pub fn succeeding_empty() -> Self {
        Self::default()
    }

    /// 永远停在 running（触发 PollTimeout）
    pub fn never_finishing() -> Self {
        Self {
            statuses: Mutex::new(vec![ExecutionStatus::Running]),
            ..Self::default()
        }
    }

    /// agent 创建直接报错
    pub fn broken_agent_create() -> Self {
        Self {
            fail_agent_create: true,
            ..Self::default()
        }
    }

    fn next_status(&self) -> ExecutionStatus {
        let mut statuses = self.statuses.lock().unwrap();
        match statuses.len() {
            0 => ExecutionStatus::Succeeded,
            1 => statuses[0],
            _ => statuses.pop().unwrap(),
        }
    }
}

#[async_trait]
impl Orchestrator for MockOrchestrator {
    async fn create_agent(&self, _profile: &AgentProfile) -> DoctorResult<String> {
        self.agent_creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_agent_create {
            return Err(DoctorError::Orchestrator("agent create refused".to_string()));
        }
        Ok("agent-mock".to_string())
    }

    async fn create_task(&self, _agent_id: &str, _def: &TaskDef) -> DoctorResult<String> {
        self.task_creates.fetch_add(1, Ordering::SeqCst);
        Ok("task-mock".to_string())
    }

    async fn create_user(&self, _name: &str, internal_id: &str) -> DoctorResult<String> {
        self.user_creates.fetch_add(1, Ordering::SeqCst);
        Ok(format!("ext-{}", internal_id))
    }

    async fn create_execution(
        &self,
        _task_id: &str,
        _prompt: &str,
        _external_user_id: &str,
    ) -> DoctorResult<String> {
        self.execution_creates.fetch_add(1, Ordering::SeqCst);
        Ok("exec-mock".to_string())
    }

    async fn get_execution(&self, execution_id: &str) -> DoctorResult<ExecutionRecord> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let status = self.next_status();
        let output = match (&self.reply, status) {
            (Some(text), ExecutionStatus::Succeeded) => json!({
                "choices": [{"message": {"content": text}}]
            }),
            _ => json!({}),
        };
        Ok(ExecutionRecord {
            id: execution_id.to_string(),
            status,
            output,
            error: matches!(status, ExecutionStatus::Failed)
                .then(|| "simulated failure".to_string()),
        })
    }
}
