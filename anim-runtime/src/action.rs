//! # Action 模块
//!
//! 游戏逻辑（动作 / 事件处理器 / 碰撞回调）对动画系统发出的请求。
//!
//! 宿主把动作交给 `AnimatorManager::apply` 执行。
//! `script_id` 为空时，Stop / Pause / Resume 作用于节点上的所有脚本。

use serde::{Deserialize, Serialize};

/// 动画动作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AnimationAction {
    /// 在节点上播放脚本
    Play { node_id: String, script_id: String },
    /// 停止节点上的脚本
    Stop {
        node_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        script_id: Option<String>,
    },
    /// 暂停节点上的脚本
    Pause {
        node_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        script_id: Option<String>,
    },
    /// 恢复节点上的脚本
    Resume {
        node_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        script_id: Option<String>,
    },
}

impl AnimationAction {
    pub fn play(node_id: impl Into<String>, script_id: impl Into<String>) -> Self {
        Self::Play {
            node_id: node_id.into(),
            script_id: script_id.into(),
        }
    }

    pub fn stop(node_id: impl Into<String>, script_id: Option<&str>) -> Self {
        Self::Stop {
            node_id: node_id.into(),
            script_id: script_id.map(str::to_string),
        }
    }

    pub fn pause(node_id: impl Into<String>, script_id: Option<&str>) -> Self {
        Self::Pause {
            node_id: node_id.into(),
            script_id: script_id.map(str::to_string),
        }
    }

    pub fn resume(node_id: impl Into<String>, script_id: Option<&str>) -> Self {
        Self::Resume {
            node_id: node_id.into(),
            script_id: script_id.map(str::to_string),
        }
    }

    /// 动作作用的节点
    pub fn node_id(&self) -> &str {
        match self {
            Self::Play { node_id, .. }
            | Self::Stop { node_id, .. }
            | Self::Pause { node_id, .. }
            | Self::Resume { node_id, .. } => node_id,
        }
    }
}
