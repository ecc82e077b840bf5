//! 外部编排服务：客户端抽象、注册表与执行轮询
//!
//! - **types**: 线上资源的请求/响应类型（agent 人设、任务模板、执行记录）
//! - **client**: Orchestrator trait 与 reqwest HTTP 实现
//! - **registry**: agent/task id 的惰性缓存（进程内一次创建，可显式失效）
//! - **runner**: 提交执行并轮询到终态，抽取回复文本
//! - **mock**: 测试用内存实现，可编排状态序列

pub mod client;
pub mod mock;
pub mod registry;
pub mod runner;
pub mod types;

pub use client::{HttpOrchestrator, Orchestrator};
pub use mock::MockOrchestrator;
pub use registry::{AgentIds, AgentRegistry};
pub use runner::ExecutionRunner;
pub use types::{AgentProfile, ExecutionRecord, ExecutionStatus, TaskDef};
