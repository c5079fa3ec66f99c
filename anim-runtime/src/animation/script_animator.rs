//! # ScriptAnimator 模块
//!
//! 在单个场景节点上按顺序运行一个动画脚本。
//!
//! ## 状态机
//!
//! ```text
//! Init ──start()──► Running ◄──resume()── Paused
//!   │                 │  └──────pause()─────►│
//!   │                 │                      │
//!   └──(空脚本/节点不存在)──► Finished ◄──stop()──┘
//! ```
//!
//! `Finished` 是终态：之后的 `progress` 不会再修改任何节点。

use std::rc::Rc;

use tracing::{debug, trace};

use super::animator::{Animator, AnimatorStatus};
use crate::event::AnimationEvent;
use crate::resources::ResourceCatalogue;
use crate::scene::{Scene, SceneNode};
use crate::script::AnimationScript;

/// 脚本执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptState {
    /// 已创建，尚未启动
    #[default]
    Init,
    /// 正在运行
    Running,
    /// 已暂停
    Paused,
    /// 已结束（终态）
    Finished,
}

/// 脚本执行者
#[derive(Debug, Clone)]
pub struct ScriptAnimator {
    script: Rc<AnimationScript>,
    scene_node_id: String,
    state: ScriptState,
    current_animator: Option<Animator>,
    /// 下一个要实例化的 entry
    next_animation_index: usize,
    /// 已完成的脚本遍数
    run_number: u32,
}

impl ScriptAnimator {
    pub fn new(script: Rc<AnimationScript>, scene_node_id: impl Into<String>) -> Self {
        Self {
            script,
            scene_node_id: scene_node_id.into(),
            state: ScriptState::Init,
            current_animator: None,
            next_animation_index: 0,
            run_number: 0,
        }
    }

    pub fn script_id(&self) -> &str {
        &self.script.id
    }

    pub fn scene_node_id(&self) -> &str {
        &self.scene_node_id
    }

    pub fn state(&self) -> ScriptState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ScriptState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == ScriptState::Paused
    }

    pub fn is_finished(&self) -> bool {
        self.state == ScriptState::Finished
    }

    /// 是否匹配 (script, node)
    pub fn matches(&self, script_id: &str, scene_node_id: &str) -> bool {
        self.script.id == script_id && self.scene_node_id == scene_node_id
    }

    /// 启动脚本
    ///
    /// 目标节点不存在或脚本为空时直接进入 `Finished`。返回是否进入运行状态。
    pub fn start(
        &mut self,
        scene: &mut dyn Scene,
        resources: &dyn ResourceCatalogue,
        events: &mut Vec<AnimationEvent>,
    ) -> bool {
        if self.state != ScriptState::Init {
            return self.is_running();
        }

        let Some(node) = scene.node_mut(&self.scene_node_id) else {
            debug!(node = %self.scene_node_id, script = %self.script.id, "目标节点不存在，脚本不会启动");
            self.finish();
            return false;
        };

        let started = self.move_to_next_animation(node, resources, events);
        scene.mark_dirty(&self.scene_node_id);
        if !started {
            debug!(script = %self.script.id, "脚本为空，直接结束");
            self.finish();
            return false;
        }

        self.state = ScriptState::Running;
        true
    }

    /// 停止脚本（已产生的效果不会回滚）
    pub fn stop(&mut self) {
        self.finish();
    }

    /// 暂停，只对运行中的脚本有效
    pub fn pause(&mut self) {
        if self.state == ScriptState::Running {
            self.state = ScriptState::Paused;
        }
    }

    /// 恢复，只对暂停中的脚本有效
    pub fn resume(&mut self) {
        if self.state == ScriptState::Paused {
            self.state = ScriptState::Running;
        }
    }

    /// 推进 `elapsed` 毫秒，返回推进后的状态
    ///
    /// 当前 entry 在本次调用中途结束时，剩余时间交给下一个 entry。
    pub fn progress(
        &mut self,
        elapsed: u32,
        scene: &mut dyn Scene,
        resources: &dyn ResourceCatalogue,
        events: &mut Vec<AnimationEvent>,
    ) -> ScriptState {
        if self.state != ScriptState::Running {
            return self.state;
        }

        let Some(node) = scene.node_mut(&self.scene_node_id) else {
            debug!(node = %self.scene_node_id, script = %self.script.id, "目标节点已被删除，脚本结束");
            self.finish();
            return self.state;
        };

        let mut budget = elapsed;
        // 连续不消耗时间就结束的 entry 数
        let mut idle_entries = 0;
        loop {
            let Some(animator) = self.current_animator.as_mut() else {
                self.finish();
                break;
            };

            let AnimatorStatus::Finished { leftover } = animator.progress(budget, node, resources)
            else {
                break;
            };

            let part_id = animator.entry_id().to_owned();
            if !part_id.is_empty() {
                events.push(AnimationEvent::part_done(
                    &self.scene_node_id,
                    &self.script.id,
                    part_id,
                ));
            }

            if !self.move_to_next_animation(node, resources, events) {
                trace!(node = %self.scene_node_id, script = %self.script.id, "脚本执行完毕");
                self.finish();
                break;
            }
            if leftover == 0 {
                break;
            }
            if leftover == budget {
                idle_entries += 1;
                // 整个脚本都是空 entry 时，等下一个 tick 再继续
                if idle_entries > self.script.len() {
                    break;
                }
            } else {
                idle_entries = 0;
            }
            budget = leftover;
        }

        scene.mark_dirty(&self.scene_node_id);
        self.state
    }

    /// 实例化下一个 entry 的 Animator
    ///
    /// 到达末尾时若脚本级 repeat 未用完，回到第一个 entry。返回是否还有 entry。
    fn move_to_next_animation(
        &mut self,
        node: &mut SceneNode,
        resources: &dyn ResourceCatalogue,
        events: &mut Vec<AnimationEvent>,
    ) -> bool {
        if self.script.is_empty() {
            return false;
        }

        if self.next_animation_index >= self.script.len() {
            self.run_number = self.run_number.saturating_add(1);
            if self.run_number == self.script.repeat {
                return false;
            }
            events.push(AnimationEvent::script_rewind(
                &self.scene_node_id,
                &self.script.id,
            ));
            self.next_animation_index = 0;
        }

        let Some(entry) = self.script.entry(self.next_animation_index) else {
            return false;
        };
        let mut animator = Animator::new(entry.clone());
        animator.start(node, resources);
        self.current_animator = Some(animator);
        self.next_animation_index += 1;
        true
    }

    fn finish(&mut self) {
        self.state = ScriptState::Finished;
        self.current_animator = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;
    use crate::resources::ResourceLibrary;
    use crate::scene::SceneGraph;
    use crate::script::{
        AnimationEntry, FlashAnimation, FrameListAnimation, FrameRangeAnimation, TimerAnimation,
        VectorAnimation,
    };

    struct Fixture {
        scene: SceneGraph,
        resources: ResourceLibrary,
        events: Vec<AnimationEvent>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut scene = SceneGraph::new();
            scene.add(SceneNode::new("node_a", "sprite_a"));
            Self {
                scene,
                resources: ResourceLibrary::new(),
                events: Vec::new(),
            }
        }

        fn start(&mut self, animator: &mut ScriptAnimator) -> bool {
            animator.start(&mut self.scene, &self.resources, &mut self.events)
        }

        fn progress(&mut self, animator: &mut ScriptAnimator, elapsed: u32) -> ScriptState {
            animator.progress(elapsed, &mut self.scene, &self.resources, &mut self.events)
        }

        fn node(&self) -> &SceneNode {
            self.scene.node("node_a").unwrap()
        }
    }

    fn translate(vec: Vector, delay: u32, repeat: u32) -> AnimationEntry {
        AnimationEntry::translation(VectorAnimation::new(vec, delay, repeat))
    }

    fn x(v: f64) -> Vector {
        Vector::new(v, 0.0, 0.0)
    }

    #[test]
    fn test_single_animation_runs_forever() {
        let mut fx = Fixture::new();
        let script = Rc::new(AnimationScript::new("s", vec![translate(x(1.0), 5, 0)]));
        let mut animator = ScriptAnimator::new(script, "node_a");

        assert!(fx.start(&mut animator));
        assert!(animator.is_running());
        assert!(!animator.is_paused());
        assert!(!animator.is_finished());

        assert_eq!(fx.progress(&mut animator, 10), ScriptState::Running);
        assert_eq!(fx.node().position, x(2.0));

        assert_eq!(fx.progress(&mut animator, 500), ScriptState::Running);
        assert_eq!(fx.node().position, x(102.0));
    }

    #[test]
    fn test_single_animation_with_repeat() {
        let mut fx = Fixture::new();
        let script = Rc::new(AnimationScript::new("s", vec![translate(x(1.0), 5, 3)]));
        let mut animator = ScriptAnimator::new(script, "node_a");
        fx.start(&mut animator);

        assert_eq!(fx.progress(&mut animator, 10), ScriptState::Running);
        assert_eq!(fx.node().position, x(2.0));

        assert_eq!(fx.progress(&mut animator, 500), ScriptState::Finished);
        assert_eq!(fx.node().position, x(3.0));

        // 结束后继续推进不再有任何效果
        assert_eq!(fx.progress(&mut animator, 10), ScriptState::Finished);
        assert_eq!(fx.node().position, x(3.0));
        assert!(!animator.is_running());
        assert!(!animator.is_paused());
    }

    #[test]
    fn test_multiple_legs() {
        let mut fx = Fixture::new();
        let first = AnimationEntry {
            translation: Some(VectorAnimation::new(x(1.0), 5, 3)),
            frame_list: Some(FrameListAnimation::new(vec![2, 3], 10, 0)),
            ..Default::default()
        };
        let second = AnimationEntry::flash(FlashAnimation { delay: 2, repeat: 3 });
        let script = Rc::new(AnimationScript::new("s", vec![first, second]));
        let mut animator = ScriptAnimator::new(script, "node_a");
        fx.start(&mut animator);
        assert_eq!(fx.node().frame_index, 2);

        // 第一段结束：位移 3 次，帧列表走到第二帧
        assert_eq!(fx.progress(&mut animator, 15), ScriptState::Running);
        assert_eq!(fx.node().position, x(3.0));
        assert_eq!(fx.node().frame_index, 3);
        assert!(fx.node().visible);

        // 第二段：闪烁 3 次后结束
        assert_eq!(fx.progress(&mut animator, 6), ScriptState::Finished);
        assert_eq!(fx.node().position, x(3.0));
        assert_eq!(fx.node().frame_index, 3);
        assert!(!fx.node().visible);
    }

    #[test]
    fn test_overrun_carries_into_next_leg() {
        let mut fx = Fixture::new();
        let first = translate(x(1.0), 5, 3);
        let second = AnimationEntry::flash(FlashAnimation { delay: 2, repeat: 3 });
        let script = Rc::new(AnimationScript::new("s", vec![first, second]));
        let mut animator = ScriptAnimator::new(script, "node_a");
        fx.start(&mut animator);

        // 15ms 用于位移，剩下 5ms 让闪烁执行两步
        assert_eq!(fx.progress(&mut animator, 20), ScriptState::Running);
        assert_eq!(fx.node().position, x(3.0));
        assert!(fx.node().visible);

        // 闪烁计时中还留有 1ms
        assert_eq!(fx.progress(&mut animator, 1), ScriptState::Finished);
        assert!(!fx.node().visible);
    }

    #[test]
    fn test_translation_then_frame_range() {
        let mut fx = Fixture::new();
        fx.scene.node_mut("node_a").unwrap().frame_index = 7;
        let script = Rc::new(AnimationScript::new(
            "s",
            vec![
                translate(x(1.0), 5, 2),
                AnimationEntry::frame_range(FrameRangeAnimation::new(0, 3, 10, 0)),
            ],
        ));
        let mut animator = ScriptAnimator::new(script, "node_a");
        fx.start(&mut animator);

        // 10ms 完成位移，第二段从第 0 帧开始，剩余 10ms 推进一帧
        assert_eq!(fx.progress(&mut animator, 20), ScriptState::Running);
        assert_eq!(fx.node().position, x(2.0));
        assert_eq!(fx.node().frame_index, 1);

        assert_eq!(fx.progress(&mut animator, 10), ScriptState::Running);
        assert_eq!(fx.node().frame_index, 2);
        assert_eq!(fx.progress(&mut animator, 10), ScriptState::Running);
        assert_eq!(fx.node().frame_index, 0);
    }

    #[test]
    fn test_script_repeat() {
        let mut fx = Fixture::new();
        let script = Rc::new(
            AnimationScript::new(
                "s",
                vec![
                    translate(x(1.0), 5, 3),
                    translate(Vector::new(0.0, 1.0, 0.0), 5, 3),
                ],
            )
            .with_repeat(2),
        );
        let mut animator = ScriptAnimator::new(script, "node_a");
        fx.start(&mut animator);

        assert_eq!(fx.progress(&mut animator, 15), ScriptState::Running);
        assert_eq!(fx.node().position, Vector::new(3.0, 0.0, 0.0));

        assert_eq!(fx.progress(&mut animator, 15), ScriptState::Running);
        assert_eq!(fx.node().position, Vector::new(3.0, 3.0, 0.0));
        assert_eq!(fx.events, vec![AnimationEvent::script_rewind("node_a", "s")]);

        assert_eq!(fx.progress(&mut animator, 15), ScriptState::Running);
        assert_eq!(fx.node().position, Vector::new(6.0, 3.0, 0.0));

        assert_eq!(fx.progress(&mut animator, 15), ScriptState::Finished);
        assert_eq!(fx.node().position, Vector::new(6.0, 6.0, 0.0));
    }

    #[test]
    fn test_infinite_script_keeps_rewinding() {
        let mut fx = Fixture::new();
        let script = Rc::new(
            AnimationScript::new("s", vec![translate(x(1.0), 5, 1).with_id("hop")]).with_repeat(0),
        );
        let mut animator = ScriptAnimator::new(script, "node_a");
        fx.start(&mut animator);

        assert_eq!(fx.progress(&mut animator, 50), ScriptState::Running);
        assert_eq!(fx.node().position, x(10.0));

        let part_done = fx
            .events
            .iter()
            .filter(|e| matches!(e, AnimationEvent::PartDone { .. }))
            .count();
        assert_eq!(part_done, 10);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut fx = Fixture::new();
        let script = Rc::new(AnimationScript::new("s", vec![translate(x(1.0), 5, 4)]));
        let mut animator = ScriptAnimator::new(script, "node_a");
        fx.start(&mut animator);

        fx.progress(&mut animator, 7);
        assert_eq!(fx.node().position, x(1.0));

        animator.pause();
        assert!(animator.is_paused());
        assert_eq!(fx.progress(&mut animator, 100), ScriptState::Paused);
        assert_eq!(fx.node().position, x(1.0));

        // 恢复后从暂停前积累的 2ms 继续
        animator.resume();
        assert_eq!(fx.progress(&mut animator, 3), ScriptState::Running);
        assert_eq!(fx.node().position, x(2.0));
    }

    #[test]
    fn test_stopped_script_cannot_resume() {
        let mut fx = Fixture::new();
        let script = Rc::new(AnimationScript::new("s", vec![translate(x(1.0), 5, 0)]));
        let mut animator = ScriptAnimator::new(script, "node_a");
        fx.start(&mut animator);

        animator.stop();
        animator.resume();
        assert!(animator.is_finished());
        assert_eq!(fx.progress(&mut animator, 50), ScriptState::Finished);
        assert_eq!(fx.node().position, Vector::zero());
    }

    #[test]
    fn test_start_on_missing_node() {
        let mut fx = Fixture::new();
        let script = Rc::new(AnimationScript::new("s", vec![translate(x(1.0), 5, 0)]));
        let mut animator = ScriptAnimator::new(script, "non_existent_node");

        assert!(!fx.start(&mut animator));
        assert!(animator.is_finished());

        assert_eq!(fx.progress(&mut animator, 5), ScriptState::Finished);
        assert!(fx.scene.node("non_existent_node").is_none());
    }

    #[test]
    fn test_empty_script_finishes_on_start() {
        let mut fx = Fixture::new();
        let script = Rc::new(AnimationScript::new("s", vec![]).with_repeat(0));
        let mut animator = ScriptAnimator::new(script, "node_a");

        assert!(!fx.start(&mut animator));
        assert_eq!(animator.state(), ScriptState::Finished);
        assert!(fx.events.is_empty());
    }

    #[test]
    fn test_node_deleted_while_running() {
        let mut fx = Fixture::new();
        fx.scene.add(SceneNode::new("node_b", "sprite_a"));
        let script = Rc::new(AnimationScript::new("s", vec![translate(x(1.0), 5, 0)]));
        let mut animator = ScriptAnimator::new(script, "node_a");
        fx.start(&mut animator);

        fx.progress(&mut animator, 10);
        assert_eq!(fx.node().position, x(2.0));

        fx.scene.remove("node_a");
        assert_eq!(fx.progress(&mut animator, 10), ScriptState::Finished);
        assert!(fx.scene.node("node_a").is_none());
        assert_eq!(fx.scene.node("node_b").unwrap().position, Vector::zero());
    }

    #[test]
    fn test_progress_marks_node_dirty() {
        let mut fx = Fixture::new();
        let script = Rc::new(AnimationScript::new("s", vec![translate(x(1.0), 5, 0)]));
        let mut animator = ScriptAnimator::new(script, "node_a");
        fx.start(&mut animator);
        fx.scene.take_dirty();

        fx.progress(&mut animator, 5);
        assert!(fx.scene.is_dirty("node_a"));
    }

    /// 同一脚本分别用一次大步长和多次小步长推进，返回两者的最终位置
    fn coarse_and_fine(script: AnimationScript, total: u32, step: u32) -> (Vector, Vector) {
        let script = Rc::new(script);
        let run = |step: u32| {
            let mut fx = Fixture::new();
            let mut animator = ScriptAnimator::new(Rc::clone(&script), "node_a");
            fx.start(&mut animator);
            for _ in 0..total / step {
                fx.progress(&mut animator, step);
            }
            fx.node().position
        };
        (run(total), run(step))
    }

    #[test]
    fn test_any_entry_boundary_counts_time_once() {
        let first = AnimationEntry {
            timer: Some(TimerAnimation { delay: 10 }),
            ..translate(x(1.0), 5, 0)
        };
        let second = translate(Vector::new(0.0, 1.0, 0.0), 5, 0);
        let (coarse, fine) = coarse_and_fine(AnimationScript::new("s", vec![first, second]), 20, 5);

        assert_eq!(coarse, Vector::new(2.0, 2.0, 0.0));
        assert_eq!(coarse, fine);
    }

    #[test]
    fn test_empty_entry_passes_time_on() {
        let script = AnimationScript::new(
            "s",
            vec![
                translate(x(1.0), 5, 1),
                AnimationEntry::default(),
                translate(Vector::new(0.0, 1.0, 0.0), 5, 0),
            ],
        );
        let (coarse, fine) = coarse_and_fine(script, 20, 5);

        assert_eq!(coarse, Vector::new(1.0, 3.0, 0.0));
        assert_eq!(coarse, fine);
    }

    #[test]
    fn test_script_of_empty_entries_yields_each_tick() {
        let mut fx = Fixture::new();
        let script =
            Rc::new(AnimationScript::new("s", vec![AnimationEntry::default()]).with_repeat(0));
        let mut animator = ScriptAnimator::new(script, "node_a");
        fx.start(&mut animator);

        assert_eq!(fx.progress(&mut animator, 10), ScriptState::Running);
        assert_eq!(fx.progress(&mut animator, 10), ScriptState::Running);
        assert!(!fx.events.is_empty());
        assert_eq!(fx.node(), &SceneNode::new("node_a", "sprite_a"));
    }

    /// 记录查找次数的场景
    #[derive(Default)]
    struct CountingScene {
        inner: SceneGraph,
        lookups: std::cell::Cell<usize>,
    }

    impl Scene for CountingScene {
        fn node(&self, id: &str) -> Option<&SceneNode> {
            self.lookups.set(self.lookups.get() + 1);
            self.inner.node(id)
        }

        fn node_mut(&mut self, id: &str) -> Option<&mut SceneNode> {
            self.lookups.set(self.lookups.get() + 1);
            self.inner.node_mut(id)
        }

        fn mark_dirty(&mut self, id: &str) {
            self.inner.mark_dirty(id);
        }
    }

    #[test]
    fn test_each_tick_looks_up_node_once() {
        let mut scene = CountingScene::default();
        scene.inner.add(SceneNode::new("node_a", "sprite_a"));
        let resources = ResourceLibrary::new();
        let mut events = Vec::new();
        let script = Rc::new(AnimationScript::new("s", vec![translate(x(1.0), 5, 0)]));
        let mut animator = ScriptAnimator::new(script, "node_a");
        animator.start(&mut scene, &resources, &mut events);

        scene.lookups.set(0);
        animator.progress(5, &mut scene, &resources, &mut events);
        assert_eq!(scene.lookups.get(), 1);
        assert!(scene.inner.is_dirty("node_a"));

        scene.inner.remove("node_a");
        scene.lookups.set(0);
        assert_eq!(
            animator.progress(5, &mut scene, &resources, &mut events),
            ScriptState::Finished
        );
        assert_eq!(scene.lookups.get(), 1);
    }
}
