//! # Performer 模块
//!
//! 单个效果的执行者。
//!
//! ## 时间模型
//!
//! Performer 累积经过的时间，每攒够一个 `delay` 就执行一步。
//! 一次 `progress` 调用可以执行多步（追帧），直到剩余时间不足一个 `delay`
//! 或效果报告完成为止。`delay == 0` 时每次调用恰好执行一步。
//!
//! ## 完成判定
//!
//! - 可重复效果（位移 / 旋转 / 缩放 / 帧区间 / 帧列表 / 闪烁）：
//!   一步报告"到达边界"时计数，计数达到 `repeat` 即完成；`repeat == 0` 永不完成
//! - 一次性效果（移动到目标点 / 计时器）：一步报告结束即完成

use tracing::warn;

use crate::geometry::Vector;
use crate::resources::ResourceCatalogue;
use crate::scene::SceneNode;
use crate::script::{
    AnimationEntry, FlashAnimation, FrameListAnimation, FrameRangeAnimation, GotoAnimation,
    HorizontalAlign, TimerAnimation, VectorAnimation, VerticalAlign,
};

/// 一次推进的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// 尚未完成
    Pending,
    /// 本次调用中完成，`leftover` 为完成后未消耗的时间（毫秒）
    Completed { leftover: u32 },
}

impl StepOutcome {
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// 效果种类及其游标状态
#[derive(Debug, Clone)]
pub enum Effect {
    Translation(VectorAnimation),
    Rotation(VectorAnimation),
    Scaling(VectorAnimation),
    FrameRange {
        animation: FrameRangeAnimation,
        current_frame: i32,
        step: i32,
    },
    FrameList {
        animation: FrameListAnimation,
        next_index: usize,
    },
    Goto(GotoAnimation),
    Flash {
        animation: FlashAnimation,
        visible: bool,
    },
    Timer(TimerAnimation),
}

impl Effect {
    fn delay(&self) -> u32 {
        match self {
            Self::Translation(a) | Self::Rotation(a) | Self::Scaling(a) => a.delay,
            Self::FrameRange { animation, .. } => animation.delay,
            Self::FrameList { animation, .. } => animation.delay,
            Self::Goto(a) => a.delay,
            Self::Flash { animation, .. } => animation.delay,
            Self::Timer(a) => a.delay,
        }
    }

    /// 可重复效果的 repeat；一次性效果返回 `None`
    fn repeat(&self) -> Option<u32> {
        match self {
            Self::Translation(a) | Self::Rotation(a) | Self::Scaling(a) => Some(a.repeat),
            Self::FrameRange { animation, .. } => Some(animation.repeat),
            Self::FrameList { animation, .. } => Some(animation.repeat),
            Self::Flash { animation, .. } => Some(animation.repeat),
            Self::Goto(_) | Self::Timer(_) => None,
        }
    }

    /// 效果名称（日志用）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Translation(_) => "translation",
            Self::Rotation(_) => "rotation",
            Self::Scaling(_) => "scaling",
            Self::FrameRange { .. } => "frame_range",
            Self::FrameList { .. } => "frame_list",
            Self::Goto(_) => "go_to",
            Self::Flash { .. } => "flash",
            Self::Timer(_) => "timer",
        }
    }
}

/// 单个效果的执行者
#[derive(Debug, Clone)]
pub struct Performer {
    effect: Effect,
    wait_time: u32,
    run_number: u32,
}

impl Performer {
    pub fn new(effect: Effect) -> Self {
        Self {
            effect,
            wait_time: 0,
            run_number: 0,
        }
    }

    pub fn translation(animation: VectorAnimation) -> Self {
        Self::new(Effect::Translation(animation))
    }

    pub fn rotation(animation: VectorAnimation) -> Self {
        Self::new(Effect::Rotation(animation))
    }

    pub fn scaling(animation: VectorAnimation) -> Self {
        Self::new(Effect::Scaling(animation))
    }

    pub fn frame_range(animation: FrameRangeAnimation) -> Self {
        let current_frame = animation.start_frame;
        Self::new(Effect::FrameRange {
            animation,
            current_frame,
            step: 0,
        })
    }

    pub fn frame_list(animation: FrameListAnimation) -> Self {
        Self::new(Effect::FrameList {
            animation,
            next_index: 0,
        })
    }

    pub fn go_to(animation: GotoAnimation) -> Self {
        Self::new(Effect::Goto(animation))
    }

    pub fn flash(animation: FlashAnimation) -> Self {
        Self::new(Effect::Flash {
            animation,
            visible: true,
        })
    }

    pub fn timer(animation: TimerAnimation) -> Self {
        Self::new(Effect::Timer(animation))
    }

    /// 为 entry 中出现的每种效果创建一个 performer
    pub fn for_entry(entry: &AnimationEntry) -> Vec<Self> {
        let mut performers = Vec::new();
        if let Some(a) = &entry.translation {
            performers.push(Self::translation(a.clone()));
        }
        if let Some(a) = &entry.rotation {
            performers.push(Self::rotation(a.clone()));
        }
        if let Some(a) = &entry.scaling {
            performers.push(Self::scaling(a.clone()));
        }
        if let Some(a) = &entry.frame_range {
            performers.push(Self::frame_range(a.clone()));
        }
        if let Some(a) = &entry.frame_list {
            performers.push(Self::frame_list(a.clone()));
        }
        if let Some(a) = &entry.go_to {
            performers.push(Self::go_to(a.clone()));
        }
        if let Some(a) = &entry.flash {
            performers.push(Self::flash(a.clone()));
        }
        if let Some(a) = &entry.timer {
            performers.push(Self::timer(a.clone()));
        }
        performers
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    /// 初始化：帧动画立即应用第一帧，闪烁记录节点当前可见性
    pub fn start(&mut self, node: &mut SceneNode, resources: &dyn ResourceCatalogue) {
        match &mut self.effect {
            Effect::FrameRange {
                animation,
                current_frame,
                step,
            } => {
                *step = (animation.end_frame - animation.start_frame).signum();
                *current_frame = animation.start_frame;
                set_frame(
                    node,
                    *current_frame,
                    animation.vertical_align,
                    animation.horizontal_align,
                    resources,
                );
                *current_frame += *step;
            }
            Effect::FrameList {
                animation,
                next_index,
            } => {
                *next_index = 0;
                match animation.frames.first() {
                    Some(&frame) => {
                        set_frame(
                            node,
                            frame,
                            animation.vertical_align,
                            animation.horizontal_align,
                            resources,
                        );
                        *next_index = 1;
                    }
                    None => warn!(node = %node.id, "帧列表为空，frame_list 不会修改节点"),
                }
            }
            Effect::Flash { visible, .. } => *visible = node.visible,
            _ => {}
        }
    }

    /// 开始新的 entry 周期：清零重复计数，游标与计时保留
    pub fn rewind(&mut self) {
        self.run_number = 0;
    }

    /// 是否为即时效果（`delay == 0`）
    pub fn is_instant(&self) -> bool {
        self.effect.delay() == 0
    }

    /// 距离下一步还需的时间，即时效果返回 `None`
    pub fn until_next_step(&self) -> Option<u32> {
        match self.effect.delay() {
            0 => None,
            delay => Some(delay.saturating_sub(self.wait_time).max(1)),
        }
    }

    /// 推进 `elapsed` 毫秒
    pub fn progress(
        &mut self,
        elapsed: u32,
        node: &mut SceneNode,
        resources: &dyn ResourceCatalogue,
    ) -> StepOutcome {
        let delay = self.effect.delay();
        if delay == 0 {
            // 即时效果每次调用只执行一步，并占用本次调用剩余的全部时间
            return if self.step(node, resources) {
                StepOutcome::Completed { leftover: 0 }
            } else {
                StepOutcome::Pending
            };
        }

        self.wait_time = self.wait_time.saturating_add(elapsed);
        while self.wait_time >= delay {
            self.wait_time -= delay;
            if self.step(node, resources) {
                return StepOutcome::Completed {
                    leftover: self.wait_time,
                };
            }
        }
        StepOutcome::Pending
    }

    /// 执行一步，返回效果是否完成
    fn step(&mut self, node: &mut SceneNode, resources: &dyn ResourceCatalogue) -> bool {
        let boundary = self.execute(node, resources);
        match self.effect.repeat() {
            Some(repeat) => {
                if !boundary {
                    return false;
                }
                self.run_number += 1;
                self.run_number == repeat
            }
            None => boundary,
        }
    }

    /// 对节点执行一步效果，返回是否到达边界
    fn execute(&mut self, node: &mut SceneNode, resources: &dyn ResourceCatalogue) -> bool {
        match &mut self.effect {
            Effect::Translation(a) => {
                node.position += a.vec;
                true
            }
            Effect::Rotation(a) => {
                node.rotation += a.vec;
                true
            }
            Effect::Scaling(a) => {
                node.scale += a.vec;
                true
            }
            Effect::FrameRange {
                animation,
                current_frame,
                step,
            } => {
                if *current_frame == animation.end_frame {
                    *current_frame = animation.start_frame;
                }
                set_frame(
                    node,
                    *current_frame,
                    animation.vertical_align,
                    animation.horizontal_align,
                    resources,
                );
                *current_frame += *step;
                *current_frame == animation.end_frame
            }
            Effect::FrameList {
                animation,
                next_index,
            } => {
                let len = animation.frames.len();
                if len == 0 {
                    return true;
                }
                if *next_index >= len {
                    *next_index = 0;
                }
                set_frame(
                    node,
                    animation.frames[*next_index],
                    animation.vertical_align,
                    animation.horizontal_align,
                    resources,
                );
                *next_index += 1;
                *next_index == len
            }
            Effect::Goto(a) => {
                let offset = a.destination - node.position;
                let distance = offset.length();
                if distance > a.step {
                    node.position += offset.normalised() * a.step;
                    false
                } else {
                    // 直接落到终点，避免浮点误差累积
                    node.position = a.destination;
                    true
                }
            }
            Effect::Flash { visible, .. } => {
                *visible = !*visible;
                node.visible = *visible;
                true
            }
            Effect::Timer(_) => true,
        }
    }
}

/// 切换帧并按对齐方式修正位置
///
/// 新旧两帧尺寸都可查询时才修正，保证对齐的边（或中心）不动。
fn set_frame(
    node: &mut SceneNode,
    frame_index: i32,
    v_align: VerticalAlign,
    h_align: HorizontalAlign,
    resources: &dyn ResourceCatalogue,
) {
    let prev = resources.frame_size(&node.sprite_id, node.frame_index);
    node.frame_index = frame_index;
    let next = resources.frame_size(&node.sprite_id, frame_index);

    let (Some(prev), Some(next)) = (prev, next) else {
        return;
    };

    let dx = prev.width - next.width;
    let dy = prev.height - next.height;
    let shift = Vector::new(
        match h_align {
            HorizontalAlign::Left => 0.0,
            HorizontalAlign::HCentre => dx / 2.0,
            HorizontalAlign::Right => dx,
        },
        match v_align {
            VerticalAlign::Top => 0.0,
            VerticalAlign::VCentre => dy / 2.0,
            VerticalAlign::Bottom => dy,
        },
        0.0,
    );
    node.position += shift;
}
