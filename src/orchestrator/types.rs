//! 编排服务的线上类型
//!
//! 与服务端约定的 JSON 结构：创建 agent 的人设、声明式任务模板（单个
//! prompt 步骤，user 槽位在执行时填入转写）、执行记录与状态。

use serde::{Deserialize, Serialize};

use crate::config::AgentSection;

/// 创建 agent 的人设配置
#[derive(Clone, Debug, Serialize)]
pub struct AgentProfile {
    pub name: String,
    pub model: String,
    pub about: String,
    pub instructions: String,
    pub tone: String,
    pub personality: String,
    pub style: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&AgentSection> for AgentProfile {
    fn from(cfg: &AgentSection) -> Self {
        Self {
            name: cfg.name.clone(),
            model: cfg.model.clone(),
            about: cfg.about.clone(),
            instructions: cfg.instructions.clone(),
            tone: cfg.tone.clone(),
            personality: cfg.personality.clone(),
            style: cfg.style.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        }
    }
}

/// prompt 步骤内的单条消息
#[derive(Clone, Debug, Serialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

/// 任务主流程的一步（目前仅 prompt 步骤）
#[derive(Clone, Debug, Serialize)]
pub struct TaskStep {
    pub prompt: Vec<PromptMessage>,
}

/// 声明式任务模板
#[derive(Clone, Debug, Serialize)]
pub struct TaskDef {
    pub name: String,
    pub description: String,
    pub main: Vec<TaskStep>,
}

impl TaskDef {
    /// 从配置构建固定模板：system 文本 + 执行时填入的 user 槽位
    pub fn from_config(cfg: &AgentSection) -> Self {
        Self {
            name: cfg.task_name.clone(),
            description: cfg.task_description.clone(),
            main: vec![TaskStep {
                prompt: vec![
                    PromptMessage {
                        role: "system".to_string(),
                        content: cfg.system_prompt.clone(),
                    },
                    PromptMessage {
                        role: "user".to_string(),
                        content: "{{ steps[0].input.prompt }}".to_string(),
                    },
                ],
            }],
        }
    }
}

/// 服务端创建资源的通用响应（只关心 id）
#[derive(Clone, Debug, Deserialize)]
pub struct CreatedResource {
    pub id: String,
}

/// 执行状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Queued,
    Starting,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// 服务端新增的未知状态按非终态处理，继续轮询
    #[serde(other)]
    Unknown,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// 一次执行的快照
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub output: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionRecord {
    /// 从输出的 choices[0].message.content 抽取回复文本（去除首尾空白）
    ///
    /// 字段缺失或 trim 后为空时返回 None，由调用方报 EmptyReply。
    pub fn reply_text(&self) -> Option<String> {
        let text = self
            .output
            .get("choices")?
            .get(0)?
            .get("message")?
            .get("content")?
            .as_str()?
            .trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_with_output(output: serde_json::Value) -> ExecutionRecord {
        ExecutionRecord {
            id: "exec-1".to_string(),
            status: ExecutionStatus::Succeeded,
            output,
            error: None,
        }
    }

    #[test]
    fn reply_text_extracts_and_trims() {
        let rec = record_with_output(json!({
            "choices": [{"message": {"content": "  drink more water  "}}]
        }));
        assert_eq!(rec.reply_text().as_deref(), Some("drink more water"));
    }

    #[test]
    fn missing_or_blank_reply_is_none() {
        assert!(record_with_output(json!({})).reply_text().is_none());
        assert!(record_with_output(json!({"choices": []})).reply_text().is_none());
        let blank = record_with_output(json!({
            "choices": [{"message": {"content": "   "}}]
        }));
        assert!(blank.reply_text().is_none());
    }

    #[test]
    fn unknown_status_deserializes_as_nonterminal() {
        let rec: ExecutionRecord = serde_json::from_str(
            r#"{"id":"e","status":"awaiting_input","output":{}}"#,
        )
        .unwrap();
        assert_eq!(rec.status, ExecutionStatus::Unknown);
        assert!(!rec.status.is_terminal());
    }

    #[test]
    fn task_def_has_system_and_user_slot() {
        let def = TaskDef::from_config(&crate::config::AgentSection::default());
        assert_eq!(def.main.len(), 1);
        let prompt = &def.main[0].prompt;
        assert_eq!(prompt[0].role, "system");
        assert_eq!(prompt[1].role, "user");
        assert!(prompt[1].content.contains("input.prompt"));
    }
}
