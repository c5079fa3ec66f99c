//! # Driver 模块
//!
//! headless 模拟循环：持有场景与 AnimatorManager，按固定步长推进。
//!
//! 每个 tick 的顺序：
//!
//! 1. 执行该 tick 的定时动作
//! 2. `AnimatorManager::progress(tick_ms)`
//! 3. 取走事件，清理脏节点标记

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anim_runtime::{
    AnimError, AnimationAction, AnimatorManager, ResourceError, ResourceLibrary, SceneGraph,
    SceneNode,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::config::HostConfig;

/// 宿主错误
#[derive(Debug, Error)]
pub enum HostError {
    #[error("读取资源文件失败 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("资源文件 {path:?} 无效: {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: ResourceError,
    },

    #[error(transparent)]
    Anim(#[from] AnimError),
}

/// 从磁盘加载动画资源
pub fn load_resources(path: impl AsRef<Path>) -> Result<ResourceLibrary, HostError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| HostError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let library = ResourceLibrary::from_json(&text).map_err(|source| HostError::Resource {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = ?path, scripts = library.script_count(), "动画资源加载成功");
    Ok(library)
}

/// 模拟结果
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// 实际推进的 tick 数
    pub ticks: u32,
    /// 模拟的总时长（毫秒）
    pub elapsed_ms: u64,
    /// 按发生顺序排列的事件 ID
    pub events: Vec<String>,
    /// 结束时仍在运行的脚本实例数
    pub running_scripts: usize,
    /// 结束时的场景节点
    pub nodes: Vec<SceneNode>,
}

/// 模拟器
pub struct Simulation {
    scene: SceneGraph,
    manager: AnimatorManager,
    tick_ms: u32,
    ticks: u32,
    /// (tick, action)，按 tick 排序
    schedule: Vec<(u32, AnimationAction)>,
    current_tick: u32,
    events: Vec<String>,
}

impl Simulation {
    pub fn new(config: &HostConfig, library: ResourceLibrary) -> Self {
        let scene: SceneGraph = config.nodes.iter().cloned().collect();

        let mut schedule: Vec<(u32, AnimationAction)> = config
            .plays
            .iter()
            .map(|play| (0, play.to_action()))
            .chain(
                config
                    .schedule
                    .iter()
                    .map(|scheduled| (scheduled.tick, scheduled.action.clone())),
            )
            .collect();
        // 稳定排序，同一 tick 内保持配置中的顺序
        schedule.sort_by_key(|(tick, _)| *tick);

        Self {
            scene,
            manager: AnimatorManager::new(Rc::new(library)),
            tick_ms: config.tick_ms,
            ticks: config.ticks,
            schedule,
            current_tick: 0,
            events: Vec::new(),
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn manager(&self) -> &AnimatorManager {
        &self.manager
    }

    pub fn current_tick(&self) -> u32 {
        self.current_tick
    }

    /// 推进一个 tick
    ///
    /// 未知脚本等内容错误会中止模拟。
    pub fn step(&mut self) -> Result<(), HostError> {
        let tick = self.current_tick;
        let due = self.schedule.partition_point(|(at, _)| *at <= tick);
        for (_, action) in self.schedule.drain(..due) {
            debug!(tick, ?action, "执行定时动作");
            self.manager.apply(&action, &mut self.scene)?;
        }

        self.manager.progress(self.tick_ms, &mut self.scene);

        for event in self.manager.drain_events() {
            info!(tick, event = %event, "动画事件");
            self.events.push(event.event_id());
        }
        let dirty = self.scene.take_dirty();
        trace!(tick, dirty = dirty.len(), "tick 完成");

        self.current_tick += 1;
        Ok(())
    }

    /// 推进配置中的全部 tick
    pub fn run(&mut self) -> Result<RunReport, HostError> {
        while self.current_tick < self.ticks {
            self.step()?;
        }
        Ok(self.report())
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            ticks: self.current_tick,
            elapsed_ms: u64::from(self.current_tick) * u64::from(self.tick_ms),
            events: self.events.clone(),
            running_scripts: self.manager.len(),
            nodes: self.scene.nodes().cloned().collect(),
        }
    }
}
