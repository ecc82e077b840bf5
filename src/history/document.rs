//! 历史文档：日桶序列与轮换规则
//!
//! 一个用户对应一份 HistoryDocument，按日期分桶、最旧在前。桶数达到上限时
//! 在插入新桶前淘汰最旧一桶（插入后恰好保留上限数量，而非上限减一）。

use serde::{Deserialize, Serialize};

/// 消息角色（序列化为 "user" / "ai"）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

/// 单条消息，追加后不再修改
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }
}

/// 日桶：一个日历日内按插入顺序排列的消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DayBucket {
    /// YYYY-MM-DD，进程本地日历日
    pub label: String,
    pub messages: Vec<Message>,
}

impl DayBucket {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            messages: Vec::new(),
        }
    }
}

/// 历史文档：版本号用于条件保存，days 最旧在前
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HistoryDocument {
    /// 每次成功保存后递增；加载时的值即条件保存的期望值
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub days: Vec<DayBucket>,
}

impl HistoryDocument {
    /// 取出（或创建）指定日期的桶，按需先做 FIFO 轮换
    ///
    /// 已存在同 label 的桶时直接复用；否则若桶数已达 max_days 先淘汰
    /// 最旧一桶（索引 0），再追加新空桶。
    pub fn bucket_for(&mut self, label: &str, max_days: usize) -> &mut DayBucket {
        if let Some(idx) = self.days.iter().position(|d| d.label == label) {
            return &mut self.days[idx];
        }
        if max_days > 0 && self.days.len() >= max_days {
            self.days.remove(0);
        }
        self.days.push(DayBucket::new(label));
        let last = self.days.len() - 1;
        &mut self.days[last]
    }

    /// 所有桶的消息总数
    pub fn message_count(&self) -> usize {
        self.days.iter().map(|d| d.messages.len()).sum()
    }
}

/// 今天的桶 label：进程本地日历日，YYYY-MM-DD
pub fn today_label() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
