//! 编排服务客户端抽象与 HTTP 实现
//!
//! 所有实现（HTTP / Mock）走 Orchestrator trait，上层（注册表、执行器、
//! 身份桥）只依赖 trait，测试时可整体替换。

use async_trait::async_trait;
use serde_json::json;

use crate::config::OrchestratorSection;
use crate::error::{DoctorError, DoctorResult};
use crate::orchestrator::types::{AgentProfile, CreatedResource, ExecutionRecord, TaskDef};

/// 编排服务客户端 trait：核心消费的五个操作
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// 创建 agent，返回服务端分配的 id
    async fn create_agent(&self, profile: &AgentProfile) -> DoctorResult<String>;

    /// 在 agent 下创建任务定义
    async fn create_task(&self, agent_id: &str, def: &TaskDef) -> DoctorResult<String>;

    /// 创建外部用户身份，internal_id 作为 metadata 回链
    async fn create_user(&self, name: &str, internal_id: &str) -> DoctorResult<String>;

    /// 提交一次执行（prompt 即编译好的转写）
    async fn create_execution(
        &self,
        task_id: &str,
        prompt: &str,
        external_user_id: &str,
    ) -> DoctorResult<String>;

    /// 按 id 查询执行状态与输出
    async fn get_execution(&self, execution_id: &str) -> DoctorResult<ExecutionRecord>;
}

/// reqwest 实现：Bearer 鉴权，非 2xx 统一转 Orchestrator 错误
pub struct HttpOrchestrator {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpOrchestrator {
    /// 从配置构建；API Key 从 cfg.api_key_env 指定的环境变量读取，缺失时
    /// 不带鉴权头（便于对接本地 mock 服务）
    pub fn from_config(cfg: &OrchestratorSection) -> DoctorResult<Self> {
        let api_key = std::env::var(&cfg.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(env = %cfg.api_key_env, "orchestrator api key not set");
        }
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> DoctorResult<T> {
        let resp = self
            .authorize(self.http.post(self.url(path)).json(body))
            .send()
            .await?;
        Self::decode(path, resp).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> DoctorResult<T> {
        let resp = self.authorize(self.http.get(self.url(path))).send().await?;
        Self::decode(path, resp).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        path: &str,
        resp: reqwest::Response,
    ) -> DoctorResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DoctorError::Orchestrator(format!(
                "{} -> {}: {}",
                path, status, body
            )));
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl Orchestrator for HttpOrchestrator {
    async fn create_agent(&self, profile: &AgentProfile) -> DoctorResult<String> {
        let body = serde_json::to_value(profile)?;
        let created: CreatedResource = self.post_json("/agents", &body).await?;
        tracing::info!(agent_id = %created.id, "orchestrator agent created");
        Ok(created.id)
    }

    async fn create_task(&self, agent_id: &str, def: &TaskDef) -> DoctorResult<String> {
        let body = serde_json::to_value(def)?;
        let created: CreatedResource = self
            .post_json(&format!("/agents/{}/tasks", agent_id), &body)
            .await?;
        tracing::info!(task_id = %created.id, "orchestrator task created");
        Ok(created.id)
    }

    async fn create_user(&self, name: &str, internal_id: &str) -> DoctorResult<String> {
        let body = json!({
            "name": name,
            "about": "A patient seeking medical advice",
            "metadata": { "userId": internal_id },
        });
        let created: CreatedResource = self.post_json("/users", &body).await?;
        Ok(created.id)
    }

    async fn create_execution(
        &self,
        task_id: &str,
        prompt: &str,
        external_user_id: &str,
    ) -> DoctorResult<String> {
        let body = json!({
            "input": { "prompt": prompt },
            "user_id": external_user_id,
        });
        let created: CreatedResource = self
            .post_json(&format!("/tasks/{}/executions", task_id), &body)
            .await?;
        Ok(created.id)
    }

    async fn get_execution(&self, execution_id: &str) -> DoctorResult<ExecutionRecord> {
        self.get_json(&format!("/executions/{}", execution_id))
            .await
    }
}
