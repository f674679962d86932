use anyhow::Context;
use listener_registry::{Owner, Registry, RegistryConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_ENV: &str = "LISTENER_DEMO_CONFIG";

fn load_config() -> anyhow::Result<RegistryConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(raw) => serde_json::from_str(&raw).with_context(|| format!("invalid {CONFIG_ENV}")),
        Err(_) => Ok(RegistryConfig::builder().label("demo").build()),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let registry = Registry::with_config(load_config()?);

    // 全局监听器：(int, string) 参数
    let rounds = Arc::new(AtomicUsize::new(0));
    let r = rounds.clone();
    registry.register_global("Example", move |_ctx, (a, b): &(i32, String)| {
        let round = r.fetch_add(1, Ordering::SeqCst) + 1;
        println!("Round {round} {a} {b}");
        Ok(())
    });

    // 不指定作用域推送
    let invoked = registry.push("Example", &(50, "Test 1".to_string()));
    info!(invoked, "pushed Example without owner");

    // 以 Global 作用域推送
    let invoked = registry.push_scoped(Owner::Global, "Example", &(51, "Test 2".to_string()));
    info!(invoked, "pushed Example with global owner");

    // 作用域监听器：对象销毁时随守卫一并注销
    let window = Owner::unique();
    {
        let _guard = registry.register_guarded(window, "resize", |ctx, (w, h): &(u32, u32)| {
            println!("{} resized to {w}x{h}", ctx.owner());
            Ok(())
        });
        registry.push_scoped(window, "resize", &(800u32, 600u32));
    }
    info!(
        invoked = registry.push_scoped(window, "resize", &(1u32, 1u32)),
        "pushed resize after window was dropped"
    );

    // 出故障的监听器不会中断其它监听器
    registry.register_global("save", |_ctx, path: &String| {
        anyhow::bail!("refusing to write {path}")
    });
    registry.register_global("save", |_ctx, path: &String| {
        println!("saved {path}");
        Ok(())
    });
    let report = registry.push_with_report("save", &"notes.txt".to_string());
    for fault in &report.faults {
        println!("suppressed: {fault}");
    }
    info!(invoked = report.invoked, faults = report.faults.len(), "pushed save");

    for listener in registry.listeners() {
        println!(
            "{} owner={} name={} shape={}",
            listener.id, listener.owner, listener.name, listener.shape
        );
    }

    let removed = registry.remove_by_name("save") + registry.remove_by_owner(Owner::Global);
    info!(removed, remaining = registry.len(), "cleaned up");

    Ok(())
}
