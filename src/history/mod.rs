//! 按日分桶的滚动对话历史
//!
//! - **document**: 历史文档与日桶的数据结构（7 桶上限、FIFO 轮换）
//! - **transcript**: 将分桶历史线性化为单段 prompt 文本
//! - **store**: 每用户一份 JSON 文档的存取，带版本号条件保存

pub mod document;
pub mod store;
pub mod transcript;

pub use document::{today_label, DayBucket, HistoryDocument, Message, Role};
pub use store::FileHistoryStore;
pub use transcript::compile_transcript;
