//! 监听器注册表（Registry）
//!
//! 进程内发布/订阅的入口对象：
//! - 显式构造、可廉价克隆，多个克隆共享同一份存储；
//! - 所有对存储的访问经由同一把互斥锁串行化；
//! - 推送时先在锁内取匹配快照，释放锁后再同步调用回调。
//!
//! 典型用法：
//! ```rust
//! use listener_registry::{Owner, Registry};
//!
//! let registry = Registry::new();
//! let button = Owner::unique();
//!
//! let id = registry.register(button, "click", |ctx, (x, y): &(i32, i32)| {
//!     println!("{} clicked at ({x}, {y})", ctx.owner());
//!     Ok(())
//! });
//!
//! assert_eq!(registry.push_scoped(button, "click", &(3, 4)), 1);
//! assert_eq!(registry.push("click", &(0, 0)), 1);
//! assert_eq!(registry.remove_by_id(id), 1);
//! assert_eq!(registry.push("click", &(0, 0)), 0);
//! ```
//!
use crate::config::RegistryConfig;
use crate::diagnostics::Diagnostics;
use crate::dispatch::{self, DispatchReport};
use crate::guard::ListenerGuard;
use crate::listener::{EventContext, ListenerId, ListenerInfo, ListenerResult, Owner};
use crate::store::{self, ListenerRecord, ListenerStore};
use std::any::{Any, TypeId, type_name};
use std::fmt::{Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

struct Inner {
    config: RegistryConfig,
    diagnostics: Diagnostics,
    store: Mutex<ListenerStore>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let diagnostics = Diagnostics::new(&config);
        Self {
            inner: Arc::new(Inner {
                config,
                diagnostics,
                store: Mutex::new(ListenerStore::default()),
            }),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    // 回调从不在锁内执行，锁中毒时存储仍保持一致，直接取回
    fn store(&self) -> MutexGuard<'_, ListenerStore> {
        self.inner
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// 注册监听器，返回分配的 ID
    ///
    /// 回调在注册时绑定参数类型 `A`，只有以同一类型推送的事件才会调用它。
    pub fn register<A, F>(&self, owner: Owner, name: impl Into<String>, callback: F) -> ListenerId
    where
        A: Any,
        F: Fn(EventContext, &A) -> ListenerResult + Send + Sync + 'static,
    {
        let name = name.into();
        let callback = store::erase::<A, F>(callback);
        let id = self.store().insert(
            owner,
            name.clone(),
            TypeId::of::<A>(),
            type_name::<A>(),
            callback,
        );
        self.inner
            .diagnostics
            .registered(id, owner, &name, type_name::<A>());
        id
    }

    /// 注册无归属的全局监听器
    pub fn register_global<A, F>(&self, name: impl Into<String>, callback: F) -> ListenerId
    where
        A: Any,
        F: Fn(EventContext, &A) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(Owner::Global, name, callback)
    }

    /// 注册监听器并返回守卫，守卫析构时自动注销
    ///
    /// 守卫持有注册表的一个克隆；若把守卫移入同一注册表的回调中会形成引用环。
    pub fn register_guarded<A, F>(
        &self,
        owner: Owner,
        name: impl Into<String>,
        callback: F,
    ) -> ListenerGuard
    where
        A: Any,
        F: Fn(EventContext, &A) -> ListenerResult + Send + Sync + 'static,
    {
        let id = self.register(owner, name, callback);
        ListenerGuard::new(self.clone(), id)
    }

    pub fn remove_by_id(&self, id: ListenerId) -> usize {
        let taken = self.store().take_by_id(id);
        self.release(taken, "id", &id)
    }

    /// 删除该作用域下的全部监听器；`Owner::Global` 只在显式传入时才会被删除
    pub fn remove_by_owner(&self, owner: Owner) -> usize {
        let taken = self.store().take_by_owner(owner);
        self.release(taken, "owner", &owner)
    }

    /// 删除该事件名下的全部监听器，不区分作用域
    pub fn remove_by_name(&self, name: &str) -> usize {
        let taken = self.store().take_by_name(name);
        self.release(taken, "name", &name)
    }

    pub fn clear(&self) -> usize {
        let taken = self.store().take_all();
        self.release(taken, "all", &"*")
    }

    // 调用方须先释放锁再传入：记录析构会连带析构回调捕获的值，后者可能重新进入注册表
    fn release(&self, taken: Vec<ListenerRecord>, by: &'static str, key: &dyn Display) -> usize {
        let removed = taken.len();
        drop(taken);
        self.inner.diagnostics.removed(by, key, removed);
        removed
    }

    /// 向所有同名监听器推送事件（不区分作用域），返回被调用的监听器数量
    pub fn push<A: Any>(&self, name: &str, args: &A) -> usize {
        self.dispatch(None, name, args).invoked
    }

    /// 向指定作用域下的同名监听器推送事件，返回被调用的监听器数量
    pub fn push_scoped<A: Any>(&self, owner: Owner, name: &str, args: &A) -> usize {
        self.dispatch(Some(owner), name, args).invoked
    }

    /// 同 [`push`](Self::push)，额外返回每个监听器的故障记录
    pub fn push_with_report<A: Any>(&self, name: &str, args: &A) -> DispatchReport {
        self.dispatch(None, name, args)
    }

    /// 同 [`push_scoped`](Self::push_scoped)，额外返回每个监听器的故障记录
    pub fn push_scoped_with_report<A: Any>(
        &self,
        owner: Owner,
        name: &str,
        args: &A,
    ) -> DispatchReport {
        self.dispatch(Some(owner), name, args)
    }

    fn dispatch<A: Any>(&self, scope: Option<Owner>, name: &str, args: &A) -> DispatchReport {
        // 临时 guard 在语句结束时释放，回调执行期间不持锁
        let selection = self.store().select(scope, name, TypeId::of::<A>());

        let diagnostics = &self.inner.diagnostics;
        if selection.skipped > 0 {
            diagnostics.shape_skipped(name, selection.skipped, type_name::<A>());
        }

        let report = dispatch::invoke(
            selection.targets,
            scope.unwrap_or_default(),
            name,
            args,
            diagnostics,
        );
        diagnostics.pushed(scope, name, &report);
        report
    }

    pub fn len(&self) -> usize {
        self.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.store().contains(id)
    }

    /// 按存储顺序列出当前所有监听器
    pub fn listeners(&self) -> Vec<ListenerInfo> {
        self.store().infos()
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("label", &self.inner.config.label)
            .field("listeners", &self.len())
            .finish_non_exhaustive()
    }
}
