//! 诊断通道
//!
//! 面向运维的日志输出，基于 `tracing`：
//! - `debug`：注册、注销、清空等生命周期事件；
//! - `trace`：每次推送的汇总、因参数类型不符而跳过的监听器；
//! - `warn`：被吞掉的监听器故障。
//!
//! 两级开关：编译期 `tracing` feature 与运行期 `RegistryConfig::diagnostics`，
//! 任一关闭时诊断调用均为空操作。
//!
use crate::config::RegistryConfig;
use crate::dispatch::DispatchReport;
use crate::error::ListenerFault;
use crate::listener::{ListenerId, Owner};
use std::fmt::Display;

#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) struct Diagnostics {
    enabled: bool,
    label: String,
}

impl Diagnostics {
    pub(crate) fn new(config: &RegistryConfig) -> Self {
        Self {
            enabled: config.diagnostics,
            label: config.label.clone(),
        }
    }

    pub(crate) fn registered(&self, id: ListenerId, owner: Owner, name: &str, shape: &str) {
        #[cfg(feature = "tracing")]
        {
            if self.enabled {
                tracing::debug!(
                    registry = %self.label,
                    listener_id = %id,
                    %owner,
                    event = name,
                    shape,
                    "registered listener"
                );
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (id, owner, name, shape);
    }

    pub(crate) fn removed(&self, by: &'static str, key: &dyn Display, removed: usize) {
        #[cfg(feature = "tracing")]
        {
            if self.enabled {
                tracing::debug!(
                    registry = %self.label,
                    by,
                    key = %key,
                    removed,
                    "removed listeners"
                );
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (by, key, removed);
    }

    pub(crate) fn shape_skipped(&self, name: &str, skipped: usize, pushed: &'static str) {
        #[cfg(feature = "tracing")]
        {
            if self.enabled {
                tracing::trace!(
                    registry = %self.label,
                    event = name,
                    skipped,
                    pushed,
                    "skipped listeners bound to a different argument shape"
                );
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (name, skipped, pushed);
    }

    pub(crate) fn pushed(&self, scope: Option<Owner>, name: &str, report: &DispatchReport) {
        #[cfg(feature = "tracing")]
        {
            if self.enabled {
                let scope = scope.map_or_else(|| "any".to_string(), |o| o.to_string());
                tracing::trace!(
                    registry = %self.label,
                    event = name,
                    scope = %scope,
                    invoked = report.invoked,
                    faults = report.faults.len(),
                    "pushed event"
                );
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (scope, name, report);
    }

    pub(crate) fn listener_faulted(&self, fault: &ListenerFault) {
        #[cfg(feature = "tracing")]
        {
            if self.enabled {
                tracing::warn!(
                    registry = %self.label,
                    listener_id = %fault.id,
                    owner = %fault.owner,
                    event = %fault.event,
                    error = %fault.kind,
                    "listener faulted; fault suppressed"
                );
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = fault;
    }
}
