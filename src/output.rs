//! 输出呈现模块
//!
//! 终端消息、表格与使用说明。纯装饰层：核心管线不依赖本模块，
//! 确认提示也属于这里而不是执行器。

use std::io::Write;

/// 打印成功消息
pub fn print_success(message: &str) {
    println!("✓ {message}");
}

/// 打印错误消息
pub fn print_error(message: &str) {
    eprintln!("✗ {message}");
}

/// 打印版本信息
pub fn print_version() {
    println!("{} v{}", crate::APP_NAME, crate::VERSION);
    println!("{}", crate::APP_DESCRIPTION);
}

/// 打印使用说明
pub fn print_usage() {
    println!("{} v{} - {}", crate::APP_NAME, crate::VERSION, crate::APP_DESCRIPTION);
    println!();
    println!("用法: uvkit <命令> [选项] [参数]");
    println!();
    println!("软件包命令:");
    println!("  install <软件包...>       安装软件包 (-py/--python 选择版本)");
    println!("  uninstall <软件包...>     卸载软件包");
    println!("  update <软件包...>|--all  升级软件包");
    println!("  list <范围标志...>        列出 (-py/--internal/--external/--outdated/--all)");
    println!("  check                     检查已安装软件包的依赖一致性");
    println!();
    println!("虚拟环境命令 (均支持 -p/--path 指定环境目录):");
    println!("  venv create               创建虚拟环境 (-py/--python 选择版本)");
    println!("  venv add <软件包...>      添加软件包并写入依赖记录");
    println!("  venv update <软件包...>|--all 升级环境内软件包");
    println!("  venv activate             激活虚拟环境（写入标记文件）");
    println!("  venv deactivate           取消激活");
    println!("  venv remove <软件包...>|--venv 移除软件包或整个环境");
    println!("  venv list <范围标志...>   列出 (--packages/--deps/--outdated/--all)");
    println!();
    println!("项目命令:");
    println!("  create <路径>             用内嵌模板创建项目骨架");
    println!("  delete <路径>             删除项目目录 (--yes 跳过确认)");
    println!();
    println!("构建与发布:");
    println!("  build [--sdist|--wheel]   构建分发产物（默认二者都构建）");
    println!("  publish --test-pypi|--pypi|--all 发布产物");
    println!();
    println!("透传语法: 以 * 开头的参数原样转发给 uv，其中 ! 还原为空格。");
    println!("示例: uvkit install requests *--no-cache  /  uvkit install *-e!.");
}

/// 打印解析失败后的提示
pub fn print_usage_hint() {
    eprintln!("运行 `uvkit --help` 查看可用命令");
}

/// 交互式确认
///
/// 返回用户是否确认；读取失败按未确认处理。
pub fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// 解析 `uv pip list` 风格的表格输出
///
/// 前两行是表头与分隔线，其余每行按空白列切分。
pub fn parse_table_rows(stdout: &str) -> Vec<Vec<String>> {
    stdout
        .trim()
        .lines()
        .skip(2)
        .map(|line| {
            line.split_whitespace()
                .map(|cell| cell.to_string())
                .collect()
        })
        .filter(|cells: &Vec<String>| !cells.is_empty())
        .collect()
}

/// 打印已安装软件包表格
pub fn print_package_table(stdout: &str) {
    let rows = parse_table_rows(stdout);
    if rows.is_empty() {
        println!("未找到已安装的软件包");
        return;
    }
    println!("\n已安装软件包:");
    println!("{:<28} {:<16}", "软件包", "版本");
    println!("{}", "-".repeat(44));
    for row in rows {
        let name = row.first().map(String::as_str).unwrap_or("");
        let version = row.get(1).map(String::as_str).unwrap_or("");
        println!("{name:<28} {version:<16}");
    }
}

/// 打印过期软件包表格
pub fn print_outdated_table(stdout: &str) {
    let rows = parse_table_rows(stdout);
    if rows.is_empty() {
        println!("没有过期的软件包");
        return;
    }
    println!("\n过期软件包:");
    println!("{:<28} {:<16} {:<16}", "软件包", "当前版本", "最新版本");
    println!("{}", "-".repeat(60));
    for row in rows {
        let name = row.first().map(String::as_str).unwrap_or("");
        let current = row.get(1).map(String::as_str).unwrap_or("");
        let latest = row.get(2).map(String::as_str).unwrap_or("");
        println!("{name:<28} {current:<16} {latest:<16}");
    }
}

/// 打印 Python 解释器表格
pub fn print_python_table(rows: &[(String, String)]) {
    if rows.is_empty() {
        println!("未找到 Python 解释器");
        return;
    }
    println!("\nPython 解释器:");
    println!("{:<20} {:<50}", "版本", "路径");
    println!("{}", "-".repeat(70));
    for (version, path) in rows {
        println!("{version:<20} {path:<50}");
    }
}

/// 打印内建模块表格
pub fn print_builtin_modules(stdout: &str) {
    println!("\n内建模块:");
    println!("{}", "-".repeat(28));
    for module in stdout.lines() {
        let module = module.trim();
        // 跳过下划线开头的私有模块
        if module.is_empty() || module.contains('_') {
            continue;
        }
        println!("{module}");
    }
}
