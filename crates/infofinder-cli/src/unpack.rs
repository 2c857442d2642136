//! 外部解包 / 反编译工具调用
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use chrono::Local;
use infofinder_core::FileConfig;
use tracing::info;

use crate::sink;

/// 解包一个小程序包，返回反编译产物目录
/// `Unpack_Method` 选择工具链：wxapkg（默认）或 unveilr；工具退出码非零即失败
pub fn unpack_packet(packet_path: &Path, file_config: &FileConfig) -> Result<PathBuf> {
    let packet_id = packet_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let save_folder = build_output_folder(&packet_id, file_config)?;

    match file_config.unpack_method.to_ascii_lowercase().as_str() {
        "unveilr" => run_unveilr(packet_path, &save_folder, file_config)?,
        _ => run_wxapkg(packet_path, &save_folder, file_config)?,
    }

    let renamed = rename_with_app_name(&save_folder, &packet_id, file_config)?;
    info!(folder = %renamed.display(), "unpack finished");
    Ok(renamed)
}

fn build_output_folder(packet_id: &str, file_config: &FileConfig) -> Result<PathBuf> {
    let target = PathBuf::from(&file_config.applet_packet_save_path).join(packet_id);
    fs::create_dir_all(&target).with_context(|| {
        format!("failed to create unpack output folder {}", target.display())
    })?;
    Ok(target)
}

fn run_wxapkg(packet_path: &Path, save_folder: &Path, file_config: &FileConfig) -> Result<()> {
    info!("unpacking with wxapkg");
    let program = Path::new(&file_config.wxapkg_path).join(&file_config.wxapkg_program_name);
    let mut command = Command::new(&program);
    command
        .arg("unpack")
        .arg("-o")
        .arg(save_folder)
        .arg("-r")
        .arg(packet_path)
        .arg("-n")
        .arg(file_config.wxapkg_threads.to_string());
    if file_config.wxapkg_disable_beautify {
        command.arg("--disable-beautify");
    }
    run_tool(command, &program)
}

fn run_unveilr(packet_path: &Path, save_folder: &Path, file_config: &FileConfig) -> Result<()> {
    info!("unpacking with unveilr");
    let program = Path::new(&file_config.unveilr_path).join(&file_config.unveilr_program_name);
    let mut command = Command::new(&program);
    command
        .arg("wx")
        .arg(packet_path)
        .arg("-d")
        .arg(file_config.unveilr_depth.to_string())
        .arg("-o")
        .arg(save_folder)
        .arg("--clear-output");
    run_tool(command, &program)
}

fn run_tool(mut command: Command, program: &Path) -> Result<()> {
    let status = command
        .status()
        .with_context(|| format!("failed to launch unpack tool {}", program.display()))?;
    if !status.success() {
        bail!("unpack tool {} exited with {status}", program.display());
    }
    Ok(())
}

/// 解包完成后按 app.json 的应用名重命名输出目录，便于辨认
fn rename_with_app_name(
    save_folder: &Path,
    packet_id: &str,
    file_config: &FileConfig,
) -> Result<PathBuf> {
    let app_name = sink::app_name_from_app_json(save_folder).unwrap_or_default();
    let timestamp = Local::now().format("%Y_%m_%d_%H_%M_%S");
    let new_name = if app_name.is_empty() {
        format!("{packet_id}_{timestamp}")
    } else {
        format!("{app_name}_{packet_id}_{timestamp}")
    };
    let new_folder = PathBuf::from(&file_config.applet_packet_save_path).join(new_name);
    fs::rename(save_folder, &new_folder).with_context(|| {
        format!("failed to rename unpack output to {}", new_folder.display())
    })?;
    Ok(new_folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_save_path(path: &Path) -> FileConfig {
        FileConfig {
            applet_packet_save_path: path.to_string_lossy().into_owned(),
            ..FileConfig::default()
        }
    }

    #[test]
    fn output_folder_is_created_per_packet() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_save_path(dir.path());
        let folder = build_output_folder("wx1234567890", &config).unwrap();
        assert!(folder.is_dir());
        assert!(folder.ends_with("wx1234567890"));
    }

    #[test]
    fn rename_uses_app_json_title() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_save_path(dir.path());
        let folder = build_output_folder("wx1234567890", &config).unwrap();
        fs::write(
            folder.join("app.json"),
            r#"{"window": {"navigationBarTitleText": "demo"}}"#,
        )
        .unwrap();

        let renamed = rename_with_app_name(&folder, "wx1234567890", &config).unwrap();
        let name = renamed.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("demo_wx1234567890_"));
        assert!(renamed.is_dir());
        assert!(!folder.exists());
    }

    #[test]
    fn rename_without_app_json_keeps_packet_id() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_save_path(dir.path());
        let folder = build_output_folder("wxabcdef", &config).unwrap();

        let renamed = rename_with_app_name(&folder, "wxabcdef", &config).unwrap();
        let name = renamed.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("wxabcdef_"));
    }
}
