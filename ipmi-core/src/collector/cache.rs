//! On-disk SDR definition cache.
//!
//! Reading sensor definitions over the network is the slow part of an `sdr`
//! listing. With caching enabled the definitions are dumped once per host
//! (`sdr dump <file>`) and every later listing reads them back with `-S`.

use crate::command::CommandBuilder;
use crate::connection::ConnectionDescriptor;
use crate::error::{IpmiError, Result};
use crate::exec::CommandExecutor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const CACHE_SUFFIX: &str = "_ipmi_cache";
const LOCAL_HOST: &str = "localhost";

/// Cache file for `conn` inside `dir`, keyed by host only.
pub fn cache_file(dir: &Path, conn: &ConnectionDescriptor) -> PathBuf {
    let host = conn.server_tag().unwrap_or(LOCAL_HOST);
    let host: String =
        host.chars().map(|c| if std::path::is_separator(c) { '_' } else { c }).collect();
    dir.join(format!("{}{}", host, CACHE_SUFFIX))
}

/// Dump the SDR definitions to `path` unless the file already exists.
///
/// `builder` must not have a cache file configured yet.
pub async fn ensure_sdr_cache(
    executor: &dyn CommandExecutor,
    builder: &CommandBuilder,
    conn: &ConnectionDescriptor,
    path: &Path,
    timeout: Duration,
) -> Result<()> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| IpmiError::Io { path: dir.to_path_buf(), source: e })?;
    }

    let file = path.to_string_lossy();
    let spec = builder.build(conn, &["sdr", "dump", &*file]);
    if let Err(e) = executor.run(&spec, timeout).await {
        // A failed dump may leave a truncated file that later runs would trust.
        if let Err(remove) = tokio::fs::remove_file(path).await {
            if remove.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %remove, "Failed to remove partial SDR cache");
            }
        }
        return Err(e);
    }

    info!(path = %path.display(), "Created SDR cache");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandSpec;
    use async_trait::async_trait;

    #[test]
    fn test_cache_file_name() {
        let dir = Path::new("/var/cache/ipmi");
        let remote = ConnectionDescriptor::parse("root:s3cret@lan(10.0.0.5:623)").unwrap();
        assert_eq!(cache_file(dir, &remote), PathBuf::from("/var/cache/ipmi/10.0.0.5_ipmi_cache"));
        assert!(!cache_file(dir, &remote).to_string_lossy().contains("s3cret"));

        let local = ConnectionDescriptor::default();
        assert_eq!(cache_file(dir, &local), PathBuf::from("/var/cache/ipmi/localhost_ipmi_cache"));
    }

    /// Writes half a dump, then times out.
    struct TruncatingExecutor;

    #[async_trait]
    impl CommandExecutor for TruncatingExecutor {
        async fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<Vec<u8>> {
            let file = spec.args.last().cloned().unwrap_or_default();
            std::fs::write(&file, b"partial").unwrap();
            Err(IpmiError::Timeout { command: spec.display(), timeout })
        }
    }

    #[tokio::test]
    async fn test_failed_dump_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let conn = ConnectionDescriptor::parse("u:p@lan(10.0.0.5)").unwrap();
        let path = cache_file(dir.path(), &conn);
        let builder = CommandBuilder::new("ipmitool");

        let err = ensure_sdr_cache(&TruncatingExecutor, &builder, &conn, &path, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "timeout");
        assert!(!path.exists());
    }

    #[test]
    fn test_cache_file_strips_separators() {
        let conn = ConnectionDescriptor::parse("u:p@lan(../../etc)").unwrap();
        let file = cache_file(Path::new("/tmp"), &conn);
        assert_eq!(file.parent(), Some(Path::new("/tmp")));
    }
}
