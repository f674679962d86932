//! 监听器存储（Listener Store）
//!
//! 有序保存全部监听器记录，按插入顺序线性扫描：
//! - 注册时分配严格递增的 ID，删除后不复用；
//! - 不同参数类型的监听器共存于同一个 `Vec`，通过 `TypeId` 区分；
//! - 不按事件名或作用域建立索引，适用于监听器数量较少的场景。
//!
//! 本模块不加锁，由 `Registry` 持有唯一的互斥锁进行串行化。
//!
use crate::error::FaultKind;
use crate::listener::{EventContext, ListenerId, ListenerInfo, ListenerResult, Owner};
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

/// 类型擦除后的回调：参数以 `&dyn Any` 传入，在闭包内还原
pub(crate) type ErasedCallback =
    dyn Fn(EventContext, &dyn Any) -> Result<(), FaultKind> + Send + Sync;

/// 将固定参数类型 `A` 的回调包装为 `ErasedCallback`
pub(crate) fn erase<A, F>(callback: F) -> Arc<ErasedCallback>
where
    A: Any,
    F: Fn(EventContext, &A) -> ListenerResult + Send + Sync + 'static,
{
    Arc::new(move |ctx: EventContext, args: &dyn Any| {
        // 分发前已按 TypeId 过滤，正常情况下这里的 downcast 不会失败
        match args.downcast_ref::<A>() {
            Some(args) => callback(ctx, args).map_err(|e| FaultKind::Failed(format!("{e:#}"))),
            None => Err(FaultKind::ShapeMismatch {
                expected: type_name::<A>(),
                found: "unknown",
            }),
        }
    })
}

pub(crate) struct ListenerRecord {
    id: ListenerId,
    owner: Owner,
    name: String,
    shape: TypeId,
    shape_name: &'static str,
    callback: Arc<ErasedCallback>,
}

impl ListenerRecord {
    fn info(&self) -> ListenerInfo {
        ListenerInfo {
            id: self.id,
            owner: self.owner,
            name: self.name.clone(),
            shape: self.shape_name,
        }
    }
}

/// 一次推送选中的监听器
pub(crate) struct Target {
    pub(crate) id: ListenerId,
    pub(crate) owner: Owner,
    pub(crate) callback: Arc<ErasedCallback>,
}

/// 匹配结果：`targets` 按存储顺序排列；`skipped` 为名称/作用域匹配但参数类型不同的数量
pub(crate) struct Selection {
    pub(crate) targets: Vec<Target>,
    pub(crate) skipped: usize,
}

#[derive(Default)]
pub(crate) struct ListenerStore {
    next_id: u64,
    records: Vec<ListenerRecord>,
}

impl ListenerStore {
    pub(crate) fn insert(
        &mut self,
        owner: Owner,
        name: String,
        shape: TypeId,
        shape_name: &'static str,
        callback: Arc<ErasedCallback>,
    ) -> ListenerId {
        let id = ListenerId::new(self.next_id);
        self.next_id += 1;
        self.records.push(ListenerRecord {
            id,
            owner,
            name,
            shape,
            shape_name,
            callback,
        });
        id
    }

    /// 单次扫描取出所有满足条件的记录，剩余记录保持原有顺序
    ///
    /// 被取出的记录交还调用方，在释放注册表锁之后再析构：
    /// 回调捕获的值（例如 `ListenerGuard`）析构时可能重新进入注册表。
    fn take_where(&mut self, mut pred: impl FnMut(&ListenerRecord) -> bool) -> Vec<ListenerRecord> {
        let (removed, kept) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| pred(r));
        self.records = kept;
        removed
    }

    pub(crate) fn take_by_id(&mut self, id: ListenerId) -> Vec<ListenerRecord> {
        self.take_where(|r| r.id == id)
    }

    pub(crate) fn take_by_owner(&mut self, owner: Owner) -> Vec<ListenerRecord> {
        self.take_where(|r| r.owner == owner)
    }

    pub(crate) fn take_by_name(&mut self, name: &str) -> Vec<ListenerRecord> {
        self.take_where(|r| r.name == name)
    }

    pub(crate) fn take_all(&mut self) -> Vec<ListenerRecord> {
        std::mem::take(&mut self.records)
    }

    /// `scope` 为 `None` 时忽略作用域，仅按事件名匹配
    pub(crate) fn select(&self, scope: Option<Owner>, name: &str, shape: TypeId) -> Selection {
        let mut targets = Vec::new();
        let mut skipped = 0;

        for r in &self.records {
            if r.name != name || scope.is_some_and(|owner| owner != r.owner) {
                continue;
            }
            if r.shape != shape {
                skipped += 1;
                continue;
            }
            targets.push(Target {
                id: r.id,
                owner: r.owner,
                callback: r.callback.clone(),
            });
        }

        Selection { targets, skipped }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    pub(crate) fn infos(&self) -> Vec<ListenerInfo> {
        self.records.iter().map(ListenerRecord::info).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn noop<A: Any>() -> Arc<ErasedCallback> {
        erase::<A, _>(|_ctx, _args: &A| Ok(()))
    }

    fn add<A: Any>(store: &mut ListenerStore, owner: Owner, name: &str) -> ListenerId {
        store.insert(
            owner,
            name.to_string(),
            TypeId::of::<A>(),
            type_name::<A>(),
            noop::<A>(),
        )
    }

    fn ids(sel: &Selection) -> Vec<u64> {
        sel.targets.iter().map(|t| t.id.value()).collect()
    }

    #[test]
    fn ids_are_sequential_and_not_reused() {
        let mut store = ListenerStore::default();
        let a = add::<()>(&mut store, Owner::Global, "x");
        let b = add::<()>(&mut store, Owner::Global, "x");
        assert_eq!((a.value(), b.value()), (0, 1));

        assert_eq!(store.take_by_id(b).len(), 1);
        let c = add::<()>(&mut store, Owner::Global, "x");
        assert_eq!(c.value(), 2);
    }

    #[test]
    fn select_keeps_insertion_order() {
        let mut store = ListenerStore::default();
        let p = Owner::unique();
        add::<()>(&mut store, Owner::Global, "x");
        add::<()>(&mut store, Owner::Global, "y");
        add::<()>(&mut store, p, "x");
        add::<()>(&mut store, Owner::Global, "x");

        let sel = store.select(None, "x", TypeId::of::<()>());
        assert_eq!(ids(&sel), vec![0, 2, 3]);

        let sel = store.select(Some(p), "x", TypeId::of::<()>());
        assert_eq!(ids(&sel), vec![2]);

        // 作用域为 Global 时只匹配全局监听器
        let sel = store.select(Some(Owner::Global), "x", TypeId::of::<()>());
        assert_eq!(ids(&sel), vec![0, 3]);
    }

    #[test]
    fn select_skips_other_shapes() {
        let mut store = ListenerStore::default();
        add::<(i32, String)>(&mut store, Owner::Global, "x");
        add::<()>(&mut store, Owner::Global, "x");

        let sel = store.select(None, "x", TypeId::of::<()>());
        assert_eq!(ids(&sel), vec![1]);
        assert_eq!(sel.skipped, 1);
    }

    #[test]
    fn remove_by_owner_and_name_report_exact_counts() {
        let mut store = ListenerStore::default();
        let p = Owner::unique();
        add::<()>(&mut store, p, "x");
        add::<()>(&mut store, p, "y");
        add::<()>(&mut store, Owner::Global, "x");
        add::<()>(&mut store, Owner::Global, "z");

        assert_eq!(store.take_by_owner(p).len(), 2);
        assert!(store.take_by_owner(p).is_empty());
        assert_eq!(store.take_by_name("x").len(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.take_by_owner(Owner::Global).len(), 1);
        assert!(store.take_all().is_empty());
    }

    #[test]
    fn take_keeps_remaining_order() {
        let mut store = ListenerStore::default();
        for name in ["a", "b", "a", "c", "a"] {
            add::<()>(&mut store, Owner::Global, name);
        }

        let taken: Vec<u64> = store.take_by_name("a").iter().map(|r| r.id.value()).collect();
        assert_eq!(taken, vec![0, 2, 4]);
        let left: Vec<u64> = store.infos().iter().map(|i| i.id.value()).collect();
        assert_eq!(left, vec![1, 3]);
    }

    #[test]
    fn erased_callback_reports_shape_mismatch() {
        let cb = noop::<i32>();
        let ctx = EventContext::new(ListenerId::new(0), Owner::Global, "x", Utc::now());
        let err = cb(ctx, &"not an i32").unwrap_err();
        match err {
            FaultKind::ShapeMismatch { expected, .. } => assert_eq!(expected, "i32"),
            other => panic!("unexpected fault: {other:?}"),
        }
    }

    #[test]
    fn erased_callback_maps_error_to_failed() {
        let cb = erase::<u8, _>(|_ctx, v: &u8| {
            anyhow::ensure!(*v < 10, "too big: {v}");
            Ok(())
        });
        let ctx = || EventContext::new(ListenerId::new(0), Owner::Global, "x", Utc::now());
        assert!(cb(ctx(), &3u8).is_ok());
        assert_eq!(
            cb(ctx(), &42u8).unwrap_err(),
            FaultKind::Failed("too big: 42".into())
        );
    }
}
