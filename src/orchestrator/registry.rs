//! Agent 注册表：agent/task id 的惰性缓存
//!
//! 首次调用时在编排服务创建 agent 与任务模板并缓存两个 id，之后所有请求
//! （所有用户共用）直接返回缓存，不再发起网络调用。创建失败不落缓存，
//! 下次调用重试。invalidate 可显式清空缓存（如服务端资源被删除后恢复）。

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::DoctorResult;
use crate::orchestrator::client::Orchestrator;
use crate::orchestrator::types::{AgentProfile, TaskDef};

/// 缓存的两个服务端 id
#[derive(Clone, Debug)]
pub struct AgentIds {
    pub agent_id: String,
    pub task_id: String,
}

/// 注册表：持锁创建，避免并发首请求重复创建
pub struct AgentRegistry {
    orch: Arc<dyn Orchestrator>,
    profile: AgentProfile,
    task_def: TaskDef,
    cache: Mutex<Option<AgentIds>>,
}

impl AgentRegistry {
    pub fn new(orch: Arc<dyn Orchestrator>, profile: AgentProfile, task_def: TaskDef) -> Self {
        Self {
            orch,
            profile,
            task_def,
            cache: Mutex::new(None),
        }
    }

    /// 取缓存的 agent/task id，缺失时创建
    ///
    /// agent 创建成功而 task 创建失败时同样不落缓存，下次整体重建
    /// （服务端可能留下一个孤儿 agent，属可接受的副作用）。
    pub async fn agent_ids(&self) -> DoctorResult<AgentIds> {
        let mut cache = self.cache.lock().await;
        if let Some(ids) = cache.as_ref() {
            return Ok(ids.clone());
        }

        let agent_id = self.orch.create_agent(&self.profile).await?;
        let task_id = self.orch.create_task(&agent_id, &self.task_def).await?;
        let ids = AgentIds { agent_id, task_id };
        *cache = Some(ids.clone());
        Ok(ids)
    }

    /// 清空缓存，下次调用重新创建
    pub async fn invalidate(&self) {
        let mut cache = self.cache.lock().await;
        *cache = None;
    }
}
