//! # Resources 模块
//!
//! 动画脚本与精灵帧尺寸的资源目录。
//!
//! 资源文件格式（JSON）：
//!
//! ```text
//! {
//!   "sprites": [ { "id": "hero", "film": [ { "width": 16, "height": 24 }, ... ] } ],
//!   "scripts": [ { "id": "walk", "repeat": 0, "animation": [ ... ] } ]
//! }
//! ```
//!
//! 资源在加载阶段解析完成，动画系统只做只读查询。

use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::ResourceError;
use crate::geometry::Size;
use crate::script::AnimationScript;

/// 资源目录接口
pub trait ResourceCatalogue {
    /// 按 ID 查找动画脚本
    fn animation_script(&self, id: &str) -> Option<Rc<AnimationScript>>;

    /// 查询精灵某一帧的尺寸
    ///
    /// 无法得知时返回 `None`，此时帧切换不做对齐修正。
    fn frame_size(&self, _sprite_id: &str, _frame_index: i32) -> Option<Size> {
        None
    }
}

/// 精灵定义（只关心帧尺寸）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub id: String,
    #[serde(default, alias = "frames")]
    pub film: Vec<Size>,
}

/// 资源文件的反序列化形态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceFile {
    #[serde(default)]
    pub sprites: Vec<Sprite>,
    #[serde(default)]
    pub scripts: Vec<AnimationScript>,
}

/// 内存中的资源目录
#[derive(Debug, Clone, Default)]
pub struct ResourceLibrary {
    scripts: HashMap<String, Rc<AnimationScript>>,
    sprites: HashMap<String, Sprite>,
}

impl ResourceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文本加载
    pub fn from_json(text: &str) -> Result<Self, ResourceError> {
        let mut library = Self::new();
        library.load_json(text)?;
        Ok(library)
    }

    /// 追加加载一个 JSON 资源文件
    ///
    /// 与已有资源 ID 冲突时返回错误，冲突之前的条目已经加入。
    pub fn load_json(&mut self, text: &str) -> Result<(), ResourceError> {
        let file: ResourceFile = serde_json::from_str(text)?;
        self.extend(file)
    }

    /// 追加一个已解析的资源文件
    pub fn extend(&mut self, file: ResourceFile) -> Result<(), ResourceError> {
        for sprite in file.sprites {
            self.add_sprite(sprite)?;
        }
        for script in file.scripts {
            self.add_script(script)?;
        }
        Ok(())
    }

    /// 注册动画脚本
    pub fn add_script(&mut self, script: AnimationScript) -> Result<(), ResourceError> {
        if self.scripts.contains_key(&script.id) {
            return Err(ResourceError::DuplicateScript { id: script.id });
        }
        self.scripts.insert(script.id.clone(), Rc::new(script));
        Ok(())
    }

    /// 注册精灵
    pub fn add_sprite(&mut self, sprite: Sprite) -> Result<(), ResourceError> {
        if self.sprites.contains_key(&sprite.id) {
            return Err(ResourceError::DuplicateSprite { id: sprite.id });
        }
        self.sprites.insert(sprite.id.clone(), sprite);
        Ok(())
    }

    /// 已注册的脚本数量
    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// 遍历已注册的脚本（顺序不固定）
    pub fn scripts(&self) -> impl Iterator<Item = &AnimationScript> {
        self.scripts.values().map(Rc::as_ref)
    }

    /// 已注册的脚本 ID（排序后）
    pub fn script_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.scripts.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl ResourceCatalogue for ResourceLibrary {
    fn animation_script(&self, id: &str) -> Option<Rc<AnimationScript>> {
        self.scripts.get(id).cloned()
    }

    fn frame_size(&self, sprite_id: &str, frame_index: i32) -> Option<Size> {
        let sprite = self.sprites.get(sprite_id)?;
        let index = usize::try_from(frame_index).ok()?;
        sprite.film.get(index).copied()
    }
}
