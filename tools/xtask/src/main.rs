//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 anim-runtime 覆盖率
//! - `script-check`: 检查动画资源文件（JSON 结构、重复 ID、脚本诊断）

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anim_runtime::{
    Diagnostic, DiagnosticResult, ResourceFile, ResourceLibrary, analyze_script,
};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let sh = Shell::new()?;
            eprintln!("\n==> cargo fmt --all -- --check");
            cmd!(sh, "cargo fmt --all -- --check").run()?;
            eprintln!("\n==> cargo clippy --workspace --all-targets");
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;
            eprintln!("\n==> cargo test --workspace");
            cmd!(sh, "cargo test --workspace").run()?;
        }
        "cov-runtime" => {
            let sh = Shell::new()?;
            if cmd!(sh, "cargo llvm-cov --version").quiet().run().is_err() {
                anyhow::bail!(
                    "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
                );
            }
            eprintln!("\n==> cargo llvm-cov -p anim-runtime --html");
            cmd!(sh, "cargo llvm-cov -p anim-runtime --html").run()?;
            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "script-check" => {
            let path = args.next();
            script_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 anim-runtime 覆盖率报告
  script-check    检查动画资源文件

SCRIPT-CHECK:
  cargo xtask script-check [path]

  不带参数：检查 demos/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 结构错误
    - 脚本 / 精灵 ID 重复（包括跨文件）
    - 空脚本、空 entry、永不结束的 entry 等脚本问题

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-runtime   -> cargo xtask cov-runtime
  cargo script-check  -> cargo xtask script-check
"#
    );
}

//=============================================================================
// script-check 命令实现
//=============================================================================

const DEFAULT_ASSETS_DIR: &str = "demos";

/// 执行资源检查
fn script_check(path: Option<&str>) -> anyhow::Result<()> {
    let root = PathBuf::from(path.unwrap_or(DEFAULT_ASSETS_DIR));
    if !root.exists() {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定资源路径",
            root.display()
        );
    }

    let files = collect_resource_files(&root);
    if files.is_empty() {
        eprintln!("未找到资源文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个资源文件...\n", files.len());

    // 所有文件合并进同一个资源库，以便发现跨文件的重复 ID
    let mut library = ResourceLibrary::new();
    let mut result = DiagnosticResult::new();
    for file in &files {
        check_resource_file(file, &mut library, &mut result);
    }
    for script in library.scripts() {
        result.merge(analyze_script(script));
    }
    result
        .diagnostics
        .sort_by(|a, b| b.level.cmp(&a.level).then(a.script_id.cmp(&b.script_id)));

    print_check_result(files.len(), library.script_count(), &result);

    if result.has_errors() {
        anyhow::bail!("资源检查发现错误");
    }
    Ok(())
}

/// 收集目录下的所有 JSON 文件
fn collect_resource_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个资源文件
///
/// 不含 `scripts` / `sprites` 的 JSON（例如宿主配置）会被静默跳过。
fn check_resource_file(file: &Path, library: &mut ResourceLibrary, result: &mut DiagnosticResult) {
    let file_id = file.display().to_string();

    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            result.push(Diagnostic::error(&file_id, format!("无法读取文件 - {e}")));
            return;
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            result.push(Diagnostic::error(&file_id, e.to_string()));
            return;
        }
    };
    if value.get("scripts").is_none() && value.get("sprites").is_none() {
        return;
    }

    let parsed: ResourceFile = match serde_json::from_value(value) {
        Ok(f) => f,
        Err(e) => {
            result.push(Diagnostic::error(&file_id, e.to_string()));
            return;
        }
    };
    if let Err(e) = library.extend(parsed) {
        result.push(Diagnostic::error(&file_id, e.to_string()));
    }
}

/// 输出检查结果
fn print_check_result(files: usize, scripts: usize, result: &DiagnosticResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {files} 个文件, {scripts} 个脚本");
    eprintln!();

    for diag in &result.diagnostics {
        eprintln!("{diag}");
    }

    let error_count = result.error_count();
    let warn_count = result.warn_count();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {error_count} 个错误, {warn_count} 个警告");
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {warn_count} 个警告");
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
