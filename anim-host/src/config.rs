//! # Config 模块
//!
//! headless 宿主的运行配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::{Path, PathBuf};

use anim_runtime::{AnimationAction, SceneNode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 宿主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// 动画资源文件（精灵 + 脚本）
    #[serde(default = "default_resources")]
    pub resources: PathBuf,

    /// 每个 tick 的时长（毫秒）
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u32,

    /// 模拟的 tick 数
    #[serde(default = "default_ticks")]
    pub ticks: u32,

    /// 日志级别（trace / debug / info / warn / error）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 初始场景节点
    #[serde(default)]
    pub nodes: Vec<SceneNode>,

    /// 在第一个 tick 之前播放的脚本
    #[serde(default)]
    pub plays: Vec<PlayRequest>,

    /// 在指定 tick 执行的动作
    #[serde(default)]
    pub schedule: Vec<ScheduledAction>,
}

/// 播放请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    pub node_id: String,
    pub script_id: String,
}

impl PlayRequest {
    pub fn to_action(&self) -> AnimationAction {
        AnimationAction::play(&self.node_id, &self.script_id)
    }
}

impl std::str::FromStr for PlayRequest {
    type Err = ConfigError;

    /// 解析 `node:script` 形式的命令行参数
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((node_id, script_id)) if !node_id.is_empty() && !script_id.is_empty() => {
                Ok(Self {
                    node_id: node_id.to_string(),
                    script_id: script_id.to_string(),
                })
            }
            _ => Err(ConfigError::InvalidPlay(s.to_string())),
        }
    }
}

/// 定时动作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAction {
    /// 在第几个 tick 推进之前执行（从 0 开始）
    pub tick: u32,
    pub action: AnimationAction,
}

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub resources: Option<PathBuf>,
    pub tick_ms: Option<u32>,
    pub ticks: Option<u32>,
    pub log_level: Option<String>,
    /// 追加到配置文件中的 plays 之后
    pub plays: Vec<PlayRequest>,
}

// 默认值函数
fn default_resources() -> PathBuf {
    PathBuf::from("demos/animations.json")
}

fn default_tick_ms() -> u32 {
    16
}

fn default_ticks() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            resources: default_resources(),
            tick_ms: default_tick_ms(),
            ticks: default_ticks(),
            log_level: default_log_level(),
            nodes: Vec::new(),
            plays: Vec::new(),
            schedule: Vec::new(),
        }
    }
}

impl HostConfig {
    /// 加载配置文件
    ///
    /// 文件不存在时返回 `Ok(None)`，由调用方决定是否回退到默认配置。
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(config))
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 应用命令行覆盖项
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(resources) = overrides.resources {
            self.resources = resources;
        }
        if let Some(tick_ms) = overrides.tick_ms {
            self.tick_ms = tick_ms;
        }
        if let Some(ticks) = overrides.ticks {
            self.ticks = ticks;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
        self.plays.extend(overrides.plays);
    }

    /// 解析日志级别
    pub fn level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "tick_ms 必须大于 0".to_string(),
            ));
        }
        self.level()?;

        let mut ids: Vec<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ConfigError::ValidationFailed(format!(
                "场景节点 '{}' 重复定义",
                pair[0]
            )));
        }
        Ok(())
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置 IO 错误 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置解析失败 {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("无效的日志级别: {0}")]
    InvalidLogLevel(String),

    #[error("无效的播放请求 '{0}'，应为 node:script")]
    InvalidPlay(String),

    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
