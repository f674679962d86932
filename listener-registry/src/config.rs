use bon::Builder;
use serde::Deserialize;

/// 注册表配置
#[derive(Builder, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// 诊断输出中标识该注册表的名称
    #[builder(into, default = default_label())]
    pub label: String,
    /// 运行期诊断开关；关闭后诊断调用为空操作
    #[builder(default = true)]
    pub diagnostics: bool,
}

fn default_label() -> String {
    "default".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            diagnostics: true,
        }
    }
}
