//! # AnimatorManager 模块
//!
//! 所有活跃 ScriptAnimator 的注册表，由宿主的主循环显式持有。
//!
//! 同一脚本可以在同一节点上播放多次，每次都是独立的实例，效果叠加。

use std::rc::Rc;

use tracing::{debug, trace};

use super::script_animator::ScriptAnimator;
use crate::action::AnimationAction;
use crate::error::{AnimError, AnimResult};
use crate::event::AnimationEvent;
use crate::resources::ResourceCatalogue;
use crate::scene::Scene;
use crate::script::AnimationScript;

/// 动画管理器
pub struct AnimatorManager {
    resources: Rc<dyn ResourceCatalogue>,
    running_scripts: Vec<ScriptAnimator>,
    /// 全局暂停
    paused: bool,
    events: Vec<AnimationEvent>,
}

impl AnimatorManager {
    pub fn new(resources: Rc<dyn ResourceCatalogue>) -> Self {
        Self {
            resources,
            running_scripts: Vec::new(),
            paused: false,
            events: Vec::new(),
        }
    }

    /// 在节点上播放已注册的脚本
    ///
    /// 脚本不存在是内容错误，返回 `Err`；节点不存在或脚本为空时返回 `Ok(false)`。
    pub fn play(
        &mut self,
        script_id: &str,
        scene_node_id: &str,
        scene: &mut dyn Scene,
    ) -> AnimResult<bool> {
        let script = self
            .resources
            .animation_script(script_id)
            .ok_or_else(|| AnimError::UnknownScript {
                script_id: script_id.to_string(),
            })?;
        Ok(self.play_script(script, scene_node_id, scene))
    }

    /// 播放未注册的脚本
    pub fn play_script(
        &mut self,
        script: Rc<AnimationScript>,
        scene_node_id: &str,
        scene: &mut dyn Scene,
    ) -> bool {
        let mut animator = ScriptAnimator::new(script, scene_node_id);
        if !animator.start(scene, self.resources.as_ref(), &mut self.events) {
            debug!(script = %animator.script_id(), node = %scene_node_id, "脚本未能启动，已丢弃");
            return false;
        }
        debug!(script = %animator.script_id(), node = %scene_node_id, "开始播放脚本");
        self.running_scripts.push(animator);
        true
    }

    /// 停止匹配 (script, node) 的所有实例
    pub fn stop(&mut self, script_id: &str, scene_node_id: &str) {
        self.for_matching(script_id, scene_node_id, ScriptAnimator::stop);
        self.reap();
    }

    /// 暂停匹配 (script, node) 的所有实例
    pub fn pause(&mut self, script_id: &str, scene_node_id: &str) {
        self.for_matching(script_id, scene_node_id, ScriptAnimator::pause);
    }

    /// 恢复匹配 (script, node) 的所有实例
    pub fn resume(&mut self, script_id: &str, scene_node_id: &str) {
        self.for_matching(script_id, scene_node_id, ScriptAnimator::resume);
    }

    /// 停止节点上的所有脚本
    pub fn stop_node_animations(&mut self, scene_node_id: &str) {
        self.for_node(scene_node_id, ScriptAnimator::stop);
        self.reap();
    }

    pub fn pause_node_animations(&mut self, scene_node_id: &str) {
        self.for_node(scene_node_id, ScriptAnimator::pause);
    }

    pub fn resume_node_animations(&mut self, scene_node_id: &str) {
        self.for_node(scene_node_id, ScriptAnimator::resume);
    }

    /// 冻结整个管理器，`progress` 变为空操作
    pub fn pause_all(&mut self) {
        self.paused = true;
    }

    pub fn resume_all(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// 停止所有脚本
    pub fn stop_all(&mut self) {
        for animator in &mut self.running_scripts {
            animator.stop();
        }
        self.reap();
    }

    /// 清空注册表（场景销毁时使用），不产生事件
    pub fn clear(&mut self) {
        self.running_scripts.clear();
    }

    /// 推进所有脚本，随后回收已结束的实例
    pub fn progress(&mut self, elapsed: u32, scene: &mut dyn Scene) {
        if self.paused {
            return;
        }

        for animator in &mut self.running_scripts {
            animator.progress(elapsed, scene, self.resources.as_ref(), &mut self.events);
        }
        self.reap();
    }

    /// 执行一个动画动作
    pub fn apply(&mut self, action: &AnimationAction, scene: &mut dyn Scene) -> AnimResult<()> {
        trace!(?action, "执行动画动作");
        match action {
            AnimationAction::Play { node_id, script_id } => {
                self.play(script_id, node_id, scene)?;
            }
            AnimationAction::Stop { node_id, script_id } => match script_id {
                Some(script_id) => self.stop(script_id, node_id),
                None => self.stop_node_animations(node_id),
            },
            AnimationAction::Pause { node_id, script_id } => match script_id {
                Some(script_id) => self.pause(script_id, node_id),
                None => self.pause_node_animations(node_id),
            },
            AnimationAction::Resume { node_id, script_id } => match script_id {
                Some(script_id) => self.resume(script_id, node_id),
                None => self.resume_node_animations(node_id),
            },
        }
        Ok(())
    }

    /// 取走累积的事件
    pub fn drain_events(&mut self) -> Vec<AnimationEvent> {
        std::mem::take(&mut self.events)
    }

    /// 活跃实例数
    pub fn len(&self) -> usize {
        self.running_scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running_scripts.is_empty()
    }

    /// 节点上是否有未结束的脚本
    pub fn is_animating(&self, scene_node_id: &str) -> bool {
        self.running_scripts
            .iter()
            .any(|a| a.scene_node_id() == scene_node_id && !a.is_finished())
    }

    pub fn running_scripts(&self) -> &[ScriptAnimator] {
        &self.running_scripts
    }

    fn for_matching(&mut self, script_id: &str, scene_node_id: &str, f: fn(&mut ScriptAnimator)) {
        self.running_scripts
            .iter_mut()
            .filter(|a| a.matches(script_id, scene_node_id))
            .for_each(f);
    }

    fn for_node(&mut self, scene_node_id: &str, f: fn(&mut ScriptAnimator)) {
        self.running_scripts
            .iter_mut()
            .filter(|a| a.scene_node_id() == scene_node_id)
            .for_each(f);
    }

    /// 回收已结束的实例
    fn reap(&mut self) {
        let events = &mut self.events;
        self.running_scripts.retain(|animator| {
            if !animator.is_finished() {
                return true;
            }
            debug!(script = %animator.script_id(), node = %animator.scene_node_id(), "回收已结束的脚本");
            events.push(AnimationEvent::script_done(
                animator.scene_node_id(),
                animator.script_id(),
            ));
            false
        });
    }
}

impl std::fmt::Debug for AnimatorManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatorManager")
            .field("running_scripts", &self.running_scripts)
            .field("paused", &self.paused)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
