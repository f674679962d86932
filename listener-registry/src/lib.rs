//! 进程内监听器注册表（listener-registry）
//!
//! 提供同步的发布/订阅分发：调用方注册具名回调（监听器），可选地挂在某个
//! 作用域（`Owner`）下，之后按事件名推送带类型参数的事件，匹配的监听器
//! 在调用方线程上被依次同步调用。
//!
//! - `registry`：入口对象 `Registry`，注册、注销、推送；
//! - `listener`：`ListenerId`、`Owner`、`EventContext` 等值类型；
//! - `dispatch`：推送结果 `DispatchReport` 与故障隔离；
//! - `error`：监听器故障 `ListenerFault` / `FaultKind`；
//! - `guard`：析构即注销的 `ListenerGuard`；
//! - `config`：`RegistryConfig`。
//!
//! 不包含网络、持久化、调度或异步队列；所有操作在调用线程上阻塞执行至完成。
//! 匹配是对全部监听器的线性扫描，适合监听器数量较少的场景。
//!
pub mod config;
pub mod dispatch;
pub mod error;
pub mod guard;
pub mod listener;
pub mod registry;

mod diagnostics;
mod store;

pub use config::RegistryConfig;
pub use dispatch::DispatchReport;
pub use error::{FaultKind, ListenerFault};
pub use guard::ListenerGuard;
pub use listener::{EventContext, ListenerId, ListenerInfo, ListenerResult, Owner};
pub use registry::Registry;
