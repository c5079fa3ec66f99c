//! # Script 模块
//!
//! 动画配置数据模型。
//!
//! ## 层级
//!
//! ```text
//! AnimationScript          有序的 entry 列表 + 脚本级 repeat
//!   └─ AnimationEntry      一组同时生效的效果（最多每种一个）
//!        └─ *Animation     单个效果的参数（delay / repeat / ...）
//! ```
//!
//! 所有类型在运行期都是只读的，可以直接从 JSON 反序列化。
//!
//! ## repeat 约定
//!
//! - 效果级 `repeat`：默认 0（无限），N 表示执行 N 次后 performer 报告完成
//! - entry 级 `repeat`：默认 1，Animator 在完成这么多个周期后结束
//! - 脚本级 `repeat`：默认 1，整个序列执行的次数
//!
//! 三个层级中 0 都表示无限。

use serde::{Deserialize, Serialize};

use crate::geometry::Vector;

fn default_repeat_once() -> u32 {
    1
}

/// 位移 / 旋转 / 缩放动画参数
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorAnimation {
    /// 每一步累加的向量
    #[serde(default)]
    pub vec: Vector,
    /// 每一步间隔（毫秒）
    #[serde(default)]
    pub delay: u32,
    /// 步数，0 表示无限
    #[serde(default)]
    pub repeat: u32,
}

impl VectorAnimation {
    pub fn new(vec: Vector, delay: u32, repeat: u32) -> Self {
        Self { vec, delay, repeat }
    }
}

/// 垂直对齐方式
///
/// 帧尺寸变化时保持哪条边（或中心）不动。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlign {
    #[default]
    Top,
    #[serde(alias = "vcentre")]
    VCentre,
    Bottom,
}

/// 水平对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlign {
    #[default]
    Left,
    #[serde(alias = "hcentre")]
    HCentre,
    Right,
}

/// 帧区间动画参数
///
/// 帧按半开区间 `[start_frame, end_frame)` 播放；
/// `start_frame > end_frame` 时倒序播放。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameRangeAnimation {
    #[serde(default)]
    pub start_frame: i32,
    #[serde(default)]
    pub end_frame: i32,
    #[serde(default)]
    pub delay: u32,
    /// 完整播放区间的次数，0 表示无限
    #[serde(default)]
    pub repeat: u32,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    #[serde(default)]
    pub horizontal_align: HorizontalAlign,
}

impl FrameRangeAnimation {
    pub fn new(start_frame: i32, end_frame: i32, delay: u32, repeat: u32) -> Self {
        Self {
            start_frame,
            end_frame,
            delay,
            repeat,
            ..Default::default()
        }
    }
}

/// 帧列表动画参数
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameListAnimation {
    #[serde(default, alias = "frame")]
    pub frames: Vec<i32>,
    #[serde(default)]
    pub delay: u32,
    /// 完整播放列表的次数，0 表示无限
    #[serde(default)]
    pub repeat: u32,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
    #[serde(default)]
    pub horizontal_align: HorizontalAlign,
}

impl FrameListAnimation {
    pub fn new(frames: Vec<i32>, delay: u32, repeat: u32) -> Self {
        Self {
            frames,
            delay,
            repeat,
            ..Default::default()
        }
    }
}

/// 移动到目标点
///
/// 到达即结束，没有 repeat。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GotoAnimation {
    pub destination: Vector,
    /// 每一步移动的距离
    pub step: f64,
    #[serde(default)]
    pub delay: u32,
}

/// 闪烁（切换可见性）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlashAnimation {
    #[serde(default)]
    pub delay: u32,
    #[serde(default)]
    pub repeat: u32,
}

/// 计时器：不修改节点，只占用 `delay` 毫秒
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimerAnimation {
    #[serde(default)]
    pub delay: u32,
}

/// Animator 的结束判定方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// 任一效果完成即完成一个周期
    #[default]
    Any,
    /// 所有效果都完成才算完成一个周期
    All,
}

/// 动画 entry
///
/// 一组同时作用于节点的效果，每种效果最多一个。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationEntry {
    /// 可选 ID，非空时完成会发出 `PartDone` 事件
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub termination: Termination,
    /// entry 周期数，0 表示无限
    #[serde(default = "default_repeat_once")]
    pub repeat: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<VectorAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<VectorAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<VectorAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_range: Option<FrameRangeAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_list: Option<FrameListAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_to: Option<GotoAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<FlashAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerAnimation>,
}

impl Default for AnimationEntry {
    fn default() -> Self {
        Self {
            id: String::new(),
            termination: Termination::Any,
            repeat: 1,
            translation: None,
            rotation: None,
            scaling: None,
            frame_range: None,
            frame_list: None,
            go_to: None,
            flash: None,
            timer: None,
        }
    }
}

impl AnimationEntry {
    /// 只包含位移效果的 entry
    pub fn translation(animation: VectorAnimation) -> Self {
        Self {
            translation: Some(animation),
            ..Default::default()
        }
    }

    /// 只包含帧区间效果的 entry
    pub fn frame_range(animation: FrameRangeAnimation) -> Self {
        Self {
            frame_range: Some(animation),
            ..Default::default()
        }
    }

    /// 只包含帧列表效果的 entry
    pub fn frame_list(animation: FrameListAnimation) -> Self {
        Self {
            frame_list: Some(animation),
            ..Default::default()
        }
    }

    /// 只包含闪烁效果的 entry
    pub fn flash(animation: FlashAnimation) -> Self {
        Self {
            flash: Some(animation),
            ..Default::default()
        }
    }

    /// 只包含计时器的 entry
    pub fn timer(delay: u32) -> Self {
        Self {
            timer: Some(TimerAnimation { delay }),
            ..Default::default()
        }
    }

    /// 设置 entry ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// 设置结束判定方式
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// 是否不包含任何效果
    pub fn is_empty(&self) -> bool {
        self.translation.is_none()
            && self.rotation.is_none()
            && self.scaling.is_none()
            && self.frame_range.is_none()
            && self.frame_list.is_none()
            && self.go_to.is_none()
            && self.flash.is_none()
            && self.timer.is_none()
    }
}

/// 动画脚本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationScript {
    pub id: String,
    /// 整个序列的执行次数，0 表示无限
    #[serde(default = "default_repeat_once")]
    pub repeat: u32,
    #[serde(default, alias = "animations")]
    pub animation: Vec<AnimationEntry>,
}

impl AnimationScript {
    /// 创建只执行一次的脚本
    pub fn new(id: impl Into<String>, animation: Vec<AnimationEntry>) -> Self {
        Self {
            id: id.into(),
            repeat: 1,
            animation,
        }
    }

    /// 设置脚本级 repeat
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    /// entry 数量
    pub fn len(&self) -> usize {
        self.animation.len()
    }

    /// 是否为空脚本
    pub fn is_empty(&self) -> bool {
        self.animation.is_empty()
    }

    /// 获取指定 entry
    pub fn entry(&self, index: usize) -> Option<&AnimationEntry> {
        self.animation.get(index)
    }
}
