//! # Anim Host
//!
//! 动画核心的 headless 宿主：加载配置与资源，构建场景，按固定步长驱动
//! [`anim_runtime::AnimatorManager`]。
//!
//! ## 模块结构
//!
//! - [`config`]：运行配置（配置文件 + 命令行覆盖）
//! - [`driver`]：模拟循环

pub mod config;
pub mod driver;

pub use config::{ConfigError, ConfigOverrides, HostConfig, PlayRequest, ScheduledAction};
pub use driver::{HostError, RunReport, Simulation, load_resources};
