//! # 诊断模块
//!
//! 动画脚本的静态检查，不依赖 IO 或场景。
//!
//! 诊断分级：Error（必须修复）、Warn（建议修复）、Info（信息提示）。

use crate::script::{AnimationEntry, AnimationScript, Termination};

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub script_id: String,
    /// entry 下标（如果可定位，从 0 开始）
    pub entry: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, script_id, message)
    }

    pub fn warn(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, script_id, message)
    }

    pub fn info(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, script_id, message)
    }

    fn new(
        level: DiagnosticLevel,
        script_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            script_id: script_id.into(),
            entry: None,
            message: message.into(),
        }
    }

    pub fn with_entry(mut self, entry: usize) -> Self {
        self.entry = Some(entry);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.script_id)?;
        if let Some(entry) = self.entry {
            write!(f, "#{entry}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn error_count(&self) -> usize {
        self.count(DiagnosticLevel::Error)
    }

    pub fn warn_count(&self) -> usize {
        self.count(DiagnosticLevel::Warn)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn count(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }
}

/// 检查单个脚本
pub fn analyze_script(script: &AnimationScript) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();
    let id = script.id.as_str();

    if id.is_empty() {
        result.push(Diagnostic::error(id, "脚本缺少 id"));
    }
    if script.is_empty() {
        result.push(Diagnostic::warn(id, "脚本不包含任何 entry，播放后立即结束"));
        return result;
    }

    let last = script.len() - 1;
    for (index, entry) in script.animation.iter().enumerate() {
        for diagnostic in analyze_entry(id, entry) {
            result.push(diagnostic.with_entry(index));
        }
        if index < last && never_finishes(entry) {
            result.push(
                Diagnostic::warn(id, "entry 永不结束，之后的 entry 不会执行").with_entry(index),
            );
        }
    }
    result
}

fn analyze_entry(id: &str, entry: &AnimationEntry) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if entry.is_empty() {
        diagnostics.push(Diagnostic::warn(id, "entry 不包含任何效果"));
        return diagnostics;
    }
    if let Some(list) = &entry.frame_list
        && list.frames.is_empty()
    {
        diagnostics.push(Diagnostic::warn(id, "frame_list 的帧列表为空"));
    }
    if let Some(range) = &entry.frame_range
        && range.start_frame == range.end_frame
    {
        diagnostics.push(Diagnostic::warn(
            id,
            format!("frame_range 起止帧相同 ({})，不会产生动画", range.start_frame),
        ));
    }
    if let Some(goto) = &entry.go_to
        && !(goto.step.is_finite() && goto.step > 0.0)
    {
        diagnostics.push(Diagnostic::error(
            id,
            format!("go_to 的 step 必须为正数，当前为 {}", goto.step),
        ));
    }
    if entry_delays(entry).any(|delay| delay == 0) {
        diagnostics.push(Diagnostic::info(id, "存在 delay 为 0 的效果，每个 tick 执行一步"));
    }
    diagnostics
}

fn entry_delays(entry: &AnimationEntry) -> impl Iterator<Item = u32> + '_ {
    [
        entry.translation.as_ref().map(|a| a.delay),
        entry.rotation.as_ref().map(|a| a.delay),
        entry.scaling.as_ref().map(|a| a.delay),
        entry.frame_range.as_ref().map(|a| a.delay),
        entry.frame_list.as_ref().map(|a| a.delay),
        entry.go_to.as_ref().map(|a| a.delay),
        entry.flash.as_ref().map(|a| a.delay),
        entry.timer.as_ref().map(|a| a.delay),
    ]
    .into_iter()
    .flatten()
}

/// entry 是否永远不会结束
fn never_finishes(entry: &AnimationEntry) -> bool {
    if entry.repeat == 0 {
        return true;
    }

    // 每个效果是否有可能报告完成
    let finite = [
        entry.translation.as_ref().map(|a| a.repeat > 0),
        entry.rotation.as_ref().map(|a| a.repeat > 0),
        entry.scaling.as_ref().map(|a| a.repeat > 0),
        entry.frame_range.as_ref().map(|a| a.repeat > 0),
        entry.frame_list.as_ref().map(|a| a.repeat > 0),
        entry.go_to.as_ref().map(|a| a.step.is_finite() && a.step > 0.0),
        entry.flash.as_ref().map(|a| a.repeat > 0),
        entry.timer.as_ref().map(|_| true),
    ];
    let mut present = finite.into_iter().flatten().peekable();
    if present.peek().is_none() {
        return false;
    }
    match entry.termination {
        Termination::Any => !present.any(|finite| finite),
        Termination::All => !present.all(|finite| finite),
    }
}
