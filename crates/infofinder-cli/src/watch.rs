//! 包目录监控：轮询新包，出现后解包并进入扫描管线
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use infofinder_core::AppConfig;
use tracing::{info, warn};

use crate::pipeline;
use crate::unpack;

/// 持续轮询 `WX_Applet_Path`
/// 新条目出现后先等待一个轮询周期（给客户端下载留时间）再解包扫描；
/// 单个包处理失败只记录，监控继续
pub fn monitor_folder(config: &AppConfig) -> Result<()> {
    let file_config = &config.file_config;
    let watch_path = Path::new(&file_config.wx_applet_path);
    let interval = Duration::from_secs(file_config.sleep_time);

    let mut known = list_entries(watch_path)
        .with_context(|| format!("failed to list watch folder {}", watch_path.display()))?;
    info!(folder = %watch_path.display(), entries = known.len(), "watching applet folder");

    loop {
        thread::sleep(interval);
        let current = match list_entries(watch_path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(%err, "failed to list watch folder");
                continue;
            }
        };

        let added: Vec<String> = current.difference(&known).cloned().collect();
        for name in &added {
            info!(packet = %name, "new applet packet detected");
            thread::sleep(interval);
            let packet_path = watch_path.join(name);
            let outcome = unpack::unpack_packet(&packet_path, file_config)
                .and_then(|folder| pipeline::run(&folder, config));
            if let Err(err) = outcome {
                warn!(packet = %name, %err, "failed to process new packet");
            }
        }
        known = current;
    }
}

fn list_entries(path: &Path) -> std::io::Result<HashSet<String>> {
    let mut entries = HashSet::new();
    for entry in fs::read_dir(path)? {
        entries.insert(entry?.file_name().to_string_lossy().into_owned());
    }
    Ok(entries)
}
