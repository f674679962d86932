use crate::listener::ListenerId;
use crate::registry::Registry;

/// 监听器守卫：析构时注销对应的监听器
///
/// 由 [`Registry::register_guarded`] 返回，适合与作用域对象同生命周期的监听器。
#[must_use = "dropping the guard immediately removes the listener"]
pub struct ListenerGuard {
    registry: Registry,
    id: ListenerId,
    armed: bool,
}

impl ListenerGuard {
    pub(crate) fn new(registry: Registry, id: ListenerId) -> Self {
        Self {
            registry,
            id,
            armed: true,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// 解除守卫，监听器保留在注册表中，返回其 ID
    pub fn forget(mut self) -> ListenerId {
        self.armed = false;
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if self.armed {
            self.registry.remove_by_id(self.id);
        }
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("id", &self.id)
            .field("armed", &self.armed)
            .finish()
    }
}
