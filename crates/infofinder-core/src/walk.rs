//! 目标文件枚举
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::FileConfig;

/// 递归枚举 root 下通过后缀策略的文件，惰性产出路径（深度不限）
/// 遍历出错的条目（权限、悬空链接等）记录后跳过，不中断枚举
pub fn iter_target_files<'a>(
    root: &Path,
    file_config: &'a FileConfig,
) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root).into_iter().filter_map(move |entry| {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(%err, "skipping unreadable directory entry");
                return None;
            }
        };
        if !entry.file_type().is_file() {
            return None;
        }
        let name = entry.file_name().to_string_lossy();
        if file_config.allows_name(&name) {
            Some(entry.into_path())
        } else {
            None
        }
    })
}
