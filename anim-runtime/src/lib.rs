//! # Anim Runtime
//!
//! 2D 游戏引擎的动画脚本核心。
//!
//! ## 架构概述
//!
//! `anim-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 宿主每帧调用一次 [`AnimatorManager::progress`]，动画系统直接修改场景节点：
//!
//! ```text
//! Host                              Runtime
//!   │                                  │
//!   │──── play / stop / apply ────────►│
//!   │──── progress(elapsed, scene) ───►│ ScriptAnimator
//!   │                                  │   └─ Animator
//!   │                                  │        └─ Performer ──► SceneNode
//!   │◄─── drain_events() ──────────────│
//! ```
//!
//! ## 核心类型
//!
//! - [`AnimatorManager`]：活跃脚本的注册表
//! - [`AnimationScript`] / [`AnimationEntry`]：脚本配置
//! - [`Scene`] / [`ResourceCatalogue`]：宿主提供的场景与资源接口
//! - [`AnimationEvent`]：脚本生命周期事件
//!
//! ## 使用示例
//!
//! ```ignore
//! use anim_runtime::{AnimatorManager, ResourceLibrary, SceneGraph};
//!
//! let library = ResourceLibrary::from_json(resource_text)?;
//! let mut manager = AnimatorManager::new(Rc::new(library));
//! manager.play("walk", "hero", &mut scene)?;
//!
//! loop {
//!     manager.progress(16, &mut scene);
//!     for event in manager.drain_events() {
//!         host.dispatch(event);
//!     }
//! }
//! ```

pub mod action;
pub mod animation;
pub mod diagnostic;
pub mod error;
pub mod event;
pub mod geometry;
pub mod resources;
pub mod scene;
pub mod script;

// 重导出核心类型
pub use action::AnimationAction;
pub use animation::{
    Animator, AnimatorManager, AnimatorStatus, Effect, Performer, ScriptAnimator, ScriptState,
    StepOutcome,
};
pub use diagnostic::{Diagnostic, DiagnosticLevel, DiagnosticResult, analyze_script};
pub use error::{AnimError, AnimResult, ResourceError};
pub use event::AnimationEvent;
pub use geometry::{Size, Vector};
pub use resources::{ResourceCatalogue, ResourceFile, ResourceLibrary, Sprite};
pub use scene::{Scene, SceneGraph, SceneNode};
pub use script::{
    AnimationEntry, AnimationScript, FlashAnimation, FrameListAnimation, FrameRangeAnimation,
    GotoAnimation, HorizontalAlign, Termination, TimerAnimation, VectorAnimation, VerticalAlign,
};
