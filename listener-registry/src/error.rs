//! 监听器故障定义
//!
//! 分发过程中唯一的“错误”来源是监听器自身：回调返回 `Err` 或发生 panic。
//! 这些故障按监听器粒度捕获，只会出现在 `DispatchReport` 与诊断输出中，
//! 不会传播给推送方。未匹配、无效 ID 等情况以计数 0 表示，不属于错误。
//!
use crate::listener::{ListenerId, Owner};
use thiserror::Error;

/// 故障类型
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultKind {
    #[error("listener returned error: {0}")]
    Failed(String),

    #[error("listener panicked: {0}")]
    Panicked(String),

    #[error("shape mismatch: expected={expected}, found={found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// 单个监听器在一次推送中的故障记录
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("listener fault: id={id}, event={event}, owner={owner}: {kind}")]
pub struct ListenerFault {
    pub id: ListenerId,
    pub event: String,
    /// 出错监听器注册时的作用域
    pub owner: Owner,
    pub kind: FaultKind,
}
