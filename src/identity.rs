//! 患者身份桥：内部用户 id → 编排服务侧身份
//!
//! 先查用户记录上持久化的映射，命中直接复用；未命中才在编排服务创建
//! （显示名 Patient {id}，内部 id 写入 metadata），并把映射写回用户记录。
//! 每用户至多创建一次，不会在服务端堆积重复身份。

use crate::error::DoctorResult;
use crate::orchestrator::Orchestrator;
use crate::users::{FileUserStore, UserRecord};

/// 确保用户在编排服务侧有身份，返回外部 id
///
/// 创建成功后立即持久化映射；写回失败会向上传播，下次请求重新创建
/// （服务端多出一个未被引用的身份，无碍正确性）。
pub async fn ensure_external_identity(
    orch: &dyn Orchestrator,
    users: &FileUserStore,
    user: &mut UserRecord,
) -> DoctorResult<String> {
    if let Some(id) = &user.external_patient_id {
        return Ok(id.clone());
    }

    let external_id = orch
        .create_user(&format!("Patient {}", user.id), &user.id)
        .await?;
    user.external_patient_id = Some(external_id.clone());
    users.save(user)?;
    tracing::info!(user_id = %user.id, %external_id, "external patient identity created");
    Ok(external_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::MockOrchestrator;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn creates_once_then_reuses_mapping() {
        let tmp = tempfile::tempdir().unwrap();
        let users = FileUserStore::new(tmp.path());
        let orch = MockOrchestrator::replying("ok");

        let mut user = users.create("Wang Wu").unwrap();
        let first = ensure_external_identity(&orch, &users, &mut user).await.unwrap();
        assert_eq!(orch.user_creates.load(Ordering::SeqCst), 1);

        // 从磁盘重新加载也能命中映射
        let mut reloaded = users.find(&user.id).unwrap().unwrap();
        let second = ensure_external_identity(&orch, &users, &mut reloaded).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(orch.user_creates.load(Ordering::SeqCst), 1);
    }
}
