//! # Scene 模块
//!
//! 动画系统与场景节点存储之间的接口。
//!
//! 场景节点归宿主所有，动画系统只持有节点 ID，
//! 每个 tick 重新查找节点（节点可能在两次 tick 之间被游戏逻辑删除）。

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::geometry::Vector;

fn default_visible() -> bool {
    true
}

fn default_scale() -> Vector {
    Vector::one()
}

/// 场景节点中动画可修改的部分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: String,
    /// 精灵 ID，用于查询帧尺寸
    #[serde(default)]
    pub sprite_id: String,
    #[serde(default)]
    pub position: Vector,
    /// 欧拉角（度）
    #[serde(default)]
    pub rotation: Vector,
    #[serde(default = "default_scale")]
    pub scale: Vector,
    #[serde(default)]
    pub frame_index: i32,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl SceneNode {
    /// 创建位于原点、第 0 帧、可见的节点
    pub fn new(id: impl Into<String>, sprite_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sprite_id: sprite_id.into(),
            position: Vector::zero(),
            rotation: Vector::zero(),
            scale: Vector::one(),
            frame_index: 0,
            visible: true,
        }
    }

    /// 设置位置
    pub fn at(mut self, position: impl Into<Vector>) -> Self {
        self.position = position.into();
        self
    }
}

/// 场景节点存储
///
/// 由宿主实现。动画系统只通过它查找、修改节点并标记脏节点。
pub trait Scene {
    /// 按 ID 查找节点
    fn node(&self, id: &str) -> Option<&SceneNode>;

    /// 按 ID 查找可变节点
    fn node_mut(&mut self, id: &str) -> Option<&mut SceneNode>;

    /// 通知下游（碰撞检测 / 重绘）该节点需要重新检查
    fn mark_dirty(&mut self, id: &str);

    /// 节点是否存在
    fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }
}

/// 内存中的场景节点表
///
/// 按 ID 有序存储，便于测试和 headless 宿主输出稳定的结果。
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<String, SceneNode>,
    dirty: BTreeSet<String>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加节点，同 ID 节点会被替换
    pub fn add(&mut self, node: SceneNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// 删除节点
    pub fn remove(&mut self, id: &str) -> Option<SceneNode> {
        self.dirty.remove(id);
        self.nodes.remove(id)
    }

    /// 节点数量
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 遍历所有节点
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    /// 节点是否被标记为脏
    pub fn is_dirty(&self, id: &str) -> bool {
        self.dirty.contains(id)
    }

    /// 取出并清空脏节点集合
    pub fn take_dirty(&mut self) -> Vec<String> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }
}

impl Scene for SceneGraph {
    fn node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    fn mark_dirty(&mut self, id: &str) {
        if self.nodes.contains_key(id) {
            self.dirty.insert(id.to_string());
        }
    }
}

impl FromIterator<SceneNode> for SceneGraph {
    fn from_iter<I: IntoIterator<Item = SceneNode>>(iter: I) -> Self {
        let mut scene = Self::new();
        for node in iter {
            scene.add(node);
        }
        scene
    }
}
