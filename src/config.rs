//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `AIDOC__*` 覆盖（双下划线表示嵌套，
//! 如 `AIDOC__SERVER__PORT=8080`、`AIDOC__ORCHESTRATOR__BASE_URL=...`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub storage: StorageSection,
    pub history: HistorySection,
    pub orchestrator: OrchestratorSection,
    pub agent: AgentSection,
}

/// [server] 段：监听端口
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

/// [storage] 段：文档存储根目录（用户记录与各用户的历史文档）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub data_dir: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

/// [history] 段：滚动窗口与转写上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    /// 保留的日桶数量，超出时淘汰最旧一桶
    pub max_days: usize,
    /// 转写时最多取最近多少条消息，0 表示不限
    pub max_transcript_messages: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            max_days: 7,
            max_transcript_messages: 200,
        }
    }
}

/// [orchestrator] 段：外部编排服务的地址、鉴权与轮询参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorSection {
    pub base_url: String,
    /// 存放 API Key 的环境变量名
    pub api_key_env: String,
    /// 单次 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 执行状态轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 轮询最大次数，超出报 PollTimeout
    pub max_poll_attempts: u32,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.julep.ai/api".to_string(),
            api_key_env: "AIDOC_ORCH_API_KEY".to_string(),
            request_timeout_secs: 30,
            poll_interval_ms: 500,
            max_poll_attempts: 120,
        }
    }
}

/// [agent] 段：AI 医生的人设与任务模板文案
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    pub name: String,
    pub model: String,
    pub about: String,
    pub instructions: String,
    pub tone: String,
    pub personality: String,
    pub style: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub task_name: String,
    pub task_description: String,
    /// 任务 prompt 步骤中的 system 文本，user 槽位在执行时填入转写
    pub system_prompt: String,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            name: "AI Doctor".to_string(),
            model: "gpt-4o".to_string(),
            about: "A virtual doctor providing health and wellness advice.".to_string(),
            instructions:
                "Maintain conversation history and give daily guidance based on previous input."
                    .to_string(),
            tone: "professional".to_string(),
            personality: "friendly".to_string(),
            style: "concise".to_string(),
            temperature: 0.5,
            max_tokens: 1500,
            task_name: "Health Assistant".to_string(),
            task_description:
                "Answer health-related questions and provide advice based on symptoms or wellness inquiries."
                    .to_string(),
            system_prompt:
                "You are an AI doctor. Use the conversation history to provide personalized daily guidance."
                    .to_string(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 AIDOC__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 AIDOC__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("AIDOC")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.history.max_days, 7);
        assert_eq!(cfg.orchestrator.poll_interval_ms, 500);
        assert_eq!(cfg.agent.model, "gpt-4o");
        assert_eq!(cfg.agent.temperature, 0.5);
        assert_eq!(cfg.server.port, 5000);
    }
}
