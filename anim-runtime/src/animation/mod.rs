//! # Animation 模块
//!
//! 动画执行的四层结构，自底向上：
//!
//! - [`performer`]：单个效果按固定间隔执行
//! - [`animator`]：一个 entry 中的所有效果同时推进
//! - [`script_animator`]：在一个节点上按顺序执行脚本中的 entry
//! - [`manager`]：所有活跃脚本的注册表，每个 tick 推进一次

pub mod animator;
pub mod manager;
pub mod performer;
pub mod script_animator;

pub use animator::{Animator, AnimatorStatus};
pub use manager::AnimatorManager;
pub use performer::{Effect, Performer, StepOutcome};
pub use script_animator::{ScriptAnimator, ScriptState};
