//! # Animator 模块
//!
//! 运行一个 entry：同时推进其中所有效果，并判断 entry 何时完成。

use tracing::{trace, warn};

use super::performer::{Performer, StepOutcome};
use crate::resources::ResourceCatalogue;
use crate::scene::SceneNode;
use crate::script::{AnimationEntry, Termination};

/// Animator 推进后的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorStatus {
    /// 仍在运行
    Running,
    /// entry 完成了所需的全部周期，`leftover` 可交给下一个 entry
    Finished { leftover: u32 },
}

/// 复合动画执行者
///
/// 每个 tick 推进所有 performer。按 `Termination` 判定一个周期是否完成：
/// - `Any`：任一 performer 报告完成，其余 performer 停在同一时刻
/// - `All`：所有 performer 都已完成（已完成的不再推进）
///
/// 周期数达到 entry 的 `repeat` 时结束；`repeat == 0` 永不结束。
#[derive(Debug, Clone)]
pub struct Animator {
    entry: AnimationEntry,
    performers: Vec<Performer>,
    /// `All` 模式下本周期内已完成的 performer
    completed: Vec<bool>,
    run_number: u32,
}

impl Animator {
    pub fn new(entry: AnimationEntry) -> Self {
        Self {
            entry,
            performers: Vec::new(),
            completed: Vec::new(),
            run_number: 0,
        }
    }

    /// entry ID（可能为空）
    pub fn entry_id(&self) -> &str {
        &self.entry.id
    }

    /// 已完成的周期数
    pub fn run_number(&self) -> u32 {
        self.run_number
    }

    /// 为 entry 中的每种效果创建 performer 并初始化
    pub fn start(&mut self, node: &mut SceneNode, resources: &dyn ResourceCatalogue) {
        self.performers = Performer::for_entry(&self.entry);
        self.completed = vec![false; self.performers.len()];
        self.run_number = 0;

        if self.performers.is_empty() {
            warn!(node = %node.id, entry = %self.entry.id, "entry 不包含任何效果，将立即结束");
        }

        for performer in &mut self.performers {
            performer.start(node, resources);
        }
    }

    /// 推进 `elapsed` 毫秒
    ///
    /// 时间按 performer 的下一步时刻分段推进，周期在某一段结束时完成，
    /// 其余 performer 停在同一时刻，未用完的时间进入下一个周期或交给下一个 entry。
    /// 即时效果只在调用开始时执行一步，它们完成周期时占用本次调用的全部时间。
    pub fn progress(
        &mut self,
        elapsed: u32,
        node: &mut SceneNode,
        resources: &dyn ResourceCatalogue,
    ) -> AnimatorStatus {
        if self.performers.is_empty() {
            return AnimatorStatus::Finished { leftover: elapsed };
        }

        if self.advance_instant(node, resources) {
            return self.finish_cycle(0, node).unwrap_or(AnimatorStatus::Running);
        }

        let mut remaining = elapsed;
        while remaining > 0 {
            let span = self
                .next_step_in()
                .map_or(remaining, |until| until.min(remaining));
            remaining -= span;
            if self.advance_timed(span, node, resources)
                && let Some(status) = self.finish_cycle(remaining, node)
            {
                return status;
            }
        }
        AnimatorStatus::Running
    }

    /// 记一个周期；达到 `repeat` 时返回结束状态，否则重置 performer 进入下一周期
    fn finish_cycle(&mut self, leftover: u32, node: &SceneNode) -> Option<AnimatorStatus> {
        self.run_number = self.run_number.saturating_add(1);
        if self.run_number == self.entry.repeat {
            return Some(AnimatorStatus::Finished { leftover });
        }

        trace!(node = %node.id, run = self.run_number, "entry 周期完成");
        for performer in &mut self.performers {
            performer.rewind();
        }
        self.completed.fill(false);
        None
    }

    /// 仍需推进的 performer 中最近的下一步时刻
    fn next_step_in(&self) -> Option<u32> {
        self.performers
            .iter()
            .zip(&self.completed)
            .filter(|(_, done)| !**done)
            .filter_map(|(performer, _)| performer.until_next_step())
            .min()
    }

    /// 即时效果各执行一步，返回周期是否完成
    fn advance_instant(
        &mut self,
        node: &mut SceneNode,
        resources: &dyn ResourceCatalogue,
    ) -> bool {
        self.advance(node, resources, |performer, node, resources| {
            performer
                .is_instant()
                .then(|| performer.progress(0, node, resources))
        })
    }

    /// 非即时效果推进 `span` 毫秒，返回周期是否完成
    ///
    /// `span` 不超过任何 performer 的下一步时刻，每个 performer 至多执行一步。
    fn advance_timed(
        &mut self,
        span: u32,
        node: &mut SceneNode,
        resources: &dyn ResourceCatalogue,
    ) -> bool {
        self.advance(node, resources, |performer, node, resources| {
            (!performer.is_instant()).then(|| performer.progress(span, node, resources))
        })
    }

    fn advance(
        &mut self,
        node: &mut SceneNode,
        resources: &dyn ResourceCatalogue,
        mut drive: impl FnMut(
            &mut Performer,
            &mut SceneNode,
            &dyn ResourceCatalogue,
        ) -> Option<StepOutcome>,
    ) -> bool {
        let wait_all = self.entry.termination == Termination::All;
        let mut any_completed = false;
        for (performer, done) in self.performers.iter_mut().zip(self.completed.iter_mut()) {
            if *done {
                continue;
            }
            if let Some(outcome) = drive(performer, node, resources)
                && outcome.is_completed()
            {
                any_completed = true;
                *done = wait_all;
            }
        }

        if wait_all {
            self.completed.iter().all(|done| *done)
        } else {
            any_completed
        }
    }
}
