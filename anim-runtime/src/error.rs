//! # Error 模块
//!
//! 定义 anim-runtime 中使用的错误类型。
//!
//! 只有配置层面的错误会以 `Err` 的形式出现：
//! 目标节点不存在、脚本为空等运行期情况都在 ScriptAnimator 内部消化。

use thiserror::Error;

/// 资源加载错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// JSON 解析失败
    #[error("解析动画资源失败: {message}")]
    Parse { message: String },

    /// 脚本 ID 重复
    #[error("动画脚本 '{id}' 重复定义")]
    DuplicateScript { id: String },

    /// 精灵 ID 重复
    #[error("精灵 '{id}' 重复定义")]
    DuplicateSprite { id: String },
}

impl From<serde_json::Error> for ResourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}

/// anim-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimError {
    /// 引用了未注册的动画脚本（内容编写错误）
    #[error("动画脚本 '{script_id}' 未找到")]
    UnknownScript { script_id: String },

    /// 资源错误
    #[error("资源错误: {0}")]
    Resource(#[from] ResourceError),
}

/// Result 类型别名
pub type AnimResult<T> = Result<T, AnimError>;
