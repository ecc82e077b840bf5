//! aidoc - AI 医生对话服务
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **error**: 服务错误类型与 HTTP 状态映射
//! - **history**: 按日分桶的滚动对话历史（文档、转写、条件保存）
//! - **users**: 用户记录存储（含外部身份映射）
//! - **orchestrator**: 外部编排服务客户端、注册表、执行轮询、Mock
//! - **identity**: 内部用户 id 到编排服务身份的桥接
//! - **doctor**: 问诊协调器（一次请求的线性流水线）

pub mod config;
pub mod doctor;
pub mod error;
pub mod history;
pub mod identity;
pub mod orchestrator;
pub mod users;

pub use doctor::DoctorService;
pub use error::{DoctorError, DoctorResult};
