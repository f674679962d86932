//! 分发例程（Dispatch）
//!
//! 对 `ListenerStore::select` 取得的快照逐个调用回调：
//! - 调用时不持有注册表锁，回调内可再次注册、注销或推送；
//! - 每个监听器单独隔离故障（`Err` 或 panic），记录后继续下一个；
//! - 出故障的监听器同样计入调用次数。
//!
use crate::diagnostics::Diagnostics;
use crate::error::{FaultKind, ListenerFault};
use crate::listener::{EventContext, Owner};
use crate::store::Target;
use chrono::Utc;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// 一次推送的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// 被调用的监听器数量（含出故障的）
    pub invoked: usize,
    /// 按调用顺序记录的故障
    pub faults: Vec<ListenerFault>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

pub(crate) fn invoke<A: Any>(
    targets: Vec<Target>,
    scope: Owner,
    name: &str,
    args: &A,
    diagnostics: &Diagnostics,
) -> DispatchReport {
    let occurred_at = Utc::now();
    let mut report = DispatchReport::default();

    for target in targets {
        let ctx = EventContext::new(target.id, scope, name, occurred_at);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            (target.callback)(ctx, args as &dyn Any)
        }));
        report.invoked += 1;

        let kind = match outcome {
            Ok(Ok(())) => continue,
            Ok(Err(kind)) => kind,
            Err(payload) => FaultKind::Panicked(panic_message(payload.as_ref())),
        };

        let fault = ListenerFault {
            id: target.id,
            event: name.to_string(),
            owner: target.owner,
            kind,
        };
        diagnostics.listener_faulted(&fault);
        report.faults.push(fault);
    }

    report
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
