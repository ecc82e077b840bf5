//! 问诊协调器：单条线性流水线
//!
//! 步骤：解析用户 → 加载/轮换历史 → 追加提问 → 编译转写 → 确保
//! agent/task/外部身份 → 执行并取回复 → 追加回复 → 条件保存 → 返回。
//! 任一步失败即中止，持久化只在最后一步发生，中途失败不会把半个交互
//! 写进存储。条件保存冲突时重载文档、重放两条消息后重试（不重跑执行）。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{DoctorError, DoctorResult};
use crate::history::{compile_transcript, today_label, FileHistoryStore, Message};
use crate::identity::ensure_external_identity;
use crate::orchestrator::{
    AgentProfile, AgentRegistry, ExecutionRunner, Orchestrator, TaskDef,
};
use crate::users::FileUserStore;

/// 保存冲突时的最大重试次数
const SAVE_RETRIES: usize = 3;

/// AI 医生服务：聚合各组件，handle 一次问诊请求
pub struct DoctorService {
    users: FileUserStore,
    history: FileHistoryStore,
    registry: AgentRegistry,
    runner: ExecutionRunner,
    orch: Arc<dyn Orchestrator>,
    max_days: usize,
    max_transcript_messages: usize,
}

impl DoctorService {
    pub fn new(cfg: &AppConfig, orch: Arc<dyn Orchestrator>) -> Self {
        let registry = AgentRegistry::new(
            orch.clone(),
            AgentProfile::from(&cfg.agent),
            TaskDef::from_config(&cfg.agent),
        );
        let runner = ExecutionRunner::new(
            orch.clone(),
            std::time::Duration::from_millis(cfg.orchestrator.poll_interval_ms),
            cfg.orchestrator.max_poll_attempts,
        );
        Self {
            users: FileUserStore::new(&cfg.storage.data_dir),
            history: FileHistoryStore::new(&cfg.storage.data_dir),
            registry,
            runner,
            orch,
            max_days: cfg.history.max_days,
            max_transcript_messages: cfg.history.max_transcript_messages,
        }
    }

    pub fn users(&self) -> &FileUserStore {
        &self.users
    }

    /// 处理一次问诊，返回 AI 回复
    pub async fn ask(&self, user_id: &str, question: &str) -> DoctorResult<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DoctorError::Validation("question is required".to_string()));
        }

        let mut user = self
            .users
            .find(user_id)?
            .ok_or_else(|| DoctorError::UserNotFound(user_id.to_string()))?;

        let label = today_label();
        let mut doc = self.history.load_or_create(user_id)?;
        doc.bucket_for(&label, self.max_days)
            .messages
            .push(Message::user(question));

        let transcript = compile_transcript(&doc, self.max_transcript_messages);
        tracing::debug!(user_id, chars = transcript.len(), "transcript compiled");

        let ids = self.registry.agent_ids().await?;
        let external_id =
            ensure_external_identity(self.orch.as_ref(), &self.users, &mut user).await?;

        let reply = self
            .runner
            .run(&ids.task_id, &transcript, &external_id)
            .await?;

        doc.bucket_for(&label, self.max_days)
            .messages
            .push(Message::ai(&reply));

        // 条件保存；冲突时重载并重放本次交互的两条消息
        for attempt in 0..SAVE_RETRIES {
            match self.history.save_if_version(user_id, &mut doc) {
                Ok(()) => {
                    tracing::info!(user_id, day = %label, "exchange persisted");
                    return Ok(reply);
                }
                Err(DoctorError::ConcurrentModification) if attempt + 1 < SAVE_RETRIES => {
                    tracing::warn!(user_id, attempt, "history save conflict, reloading");
                    doc = self.history.load_or_create(user_id)?;
                    let bucket = doc.bucket_for(&label, self.max_days);
                    bucket.messages.push(Message::user(question));
                    bucket.messages.push(Message::ai(&reply));
                }
                Err(e) => return Err(e),
            }
        }
        Err(DoctorError::ConcurrentModification)
    }
}
