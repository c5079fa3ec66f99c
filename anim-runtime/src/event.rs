//! # Event 模块
//!
//! 动画系统向宿主报告的生命周期事件。
//!
//! 事件在 tick 中排队，宿主通过 `AnimatorManager::drain_events` 取走。

use serde::{Deserialize, Serialize};

/// 动画事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationEvent {
    /// 脚本结束（自然结束或被 stop），实例已被回收
    ScriptDone { node_id: String, script_id: String },
    /// 脚本执行完一遍，开始下一次重复
    ScriptRewind { node_id: String, script_id: String },
    /// 带 ID 的 entry 完成
    PartDone {
        node_id: String,
        script_id: String,
        part_id: String,
    },
}

impl AnimationEvent {
    pub fn script_done(node_id: impl Into<String>, script_id: impl Into<String>) -> Self {
        Self::ScriptDone {
            node_id: node_id.into(),
            script_id: script_id.into(),
        }
    }

    pub fn script_rewind(node_id: impl Into<String>, script_id: impl Into<String>) -> Self {
        Self::ScriptRewind {
            node_id: node_id.into(),
            script_id: script_id.into(),
        }
    }

    pub fn part_done(
        node_id: impl Into<String>,
        script_id: impl Into<String>,
        part_id: impl Into<String>,
    ) -> Self {
        Self::PartDone {
            node_id: node_id.into(),
            script_id: script_id.into(),
            part_id: part_id.into(),
        }
    }

    /// 事件所属节点
    pub fn node_id(&self) -> &str {
        match self {
            Self::ScriptDone { node_id, .. }
            | Self::ScriptRewind { node_id, .. }
            | Self::PartDone { node_id, .. } => node_id,
        }
    }

    /// 点分形式的事件 ID，供脚本层订阅
    ///
    /// - `node.script.done`
    /// - `node.script.rewind`
    /// - `node.script.part.done`
    pub fn event_id(&self) -> String {
        match self {
            Self::ScriptDone { node_id, script_id } => format!("{node_id}.{script_id}.done"),
            Self::ScriptRewind { node_id, script_id } => format!("{node_id}.{script_id}.rewind"),
            Self::PartDone {
                node_id,
                script_id,
                part_id,
            } => format!("{node_id}.{script_id}.{part_id}.done"),
        }
    }
}

impl std::fmt::Display for AnimationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.event_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ids() {
        assert_eq!(
            AnimationEvent::script_done("mario", "jump").event_id(),
            "mario.jump.done"
        );
        assert_eq!(
            AnimationEvent::script_rewind("mario", "jump").event_id(),
            "mario.jump.rewind"
        );
        assert_eq!(
            AnimationEvent::part_done("mario", "jump", "rise").to_string(),
            "mario.jump.rise.done"
        );
        assert_eq!(AnimationEvent::part_done("a", "b", "c").node_id(), "a");
    }
}
