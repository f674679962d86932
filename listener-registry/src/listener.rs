//! 监听器模型
//!
//! 定义监听器对外暴露的句柄与值类型：
//! - `ListenerId`：注册时按序分配的唯一标识，删除后不复用；
//! - `Owner`：监听器所属作用域，仅做相等比较，不解引用；
//! - `EventContext`：每次调用回调时构造、按值传入的事件上下文；
//! - `ListenerInfo`：注册表内监听器的只读快照，用于排查与审计。
//!
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// 监听器回调的返回值：`Err` 视为一次故障，由分发例程记录并吞掉
pub type ListenerResult = anyhow::Result<()>;

/// 监听器 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for ListenerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// 监听器所属作用域（Owner）
///
/// - `Global`：无归属的全局哨兵值，也是未指定作用域的推送在上下文中使用的值；
/// - `Scoped`：调用方持有的不透明令牌，生命周期由调用方管理。
///
/// 注册表看不到令牌背后对象的生命周期：对象销毁前需调用方自行
/// `remove_by_owner`，否则这些监听器只是永远不再匹配。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    #[default]
    Global,
    Scoped(Uuid),
}

impl Owner {
    /// 生成一个新的、与其它令牌都不相等的作用域
    pub fn unique() -> Self {
        Owner::Scoped(Uuid::new_v4())
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Owner::Global)
    }
}

impl From<Uuid> for Owner {
    fn from(token: Uuid) -> Self {
        Owner::Scoped(token)
    }
}

impl Display for Owner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Owner::Global => write!(f, "global"),
            Owner::Scoped(token) => write!(f, "owner-{token}"),
        }
    }
}

/// 事件上下文：每个被调用的监听器各得一份
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventContext {
    /// 被匹配的监听器 ID（可用于在回调内注销自身）
    id: ListenerId,
    /// 本次推送使用的作用域；未指定作用域时为 `Owner::Global`
    owner: Owner,
    /// 推送时给出的事件名
    name: String,
    /// 推送时间（同一次推送内的所有监听器共享）
    occurred_at: DateTime<Utc>,
}

impl EventContext {
    pub(crate) fn new(
        id: ListenerId,
        owner: Owner,
        name: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            name: name.into(),
            occurred_at,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn occurred_at(&self) -> &DateTime<Utc> {
        &self.occurred_at
    }
}

/// 已注册监听器的只读视图
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerInfo {
    pub id: ListenerId,
    pub owner: Owner,
    pub name: String,
    /// 注册时绑定的参数类型名（`std::any::type_name`）
    pub shape: &'static str,
}
