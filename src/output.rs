use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ChartError, ChartResult};
use crate::plot::types::RenderedChart;

/// Write a rendered chart into `dir`, creating the directory if needed.
/// Existing files are overwritten whole.
pub fn save_chart(chart: &RenderedChart, dir: &Path) -> ChartResult<PathBuf> {
    std::fs::create_dir_all(dir)
        .map_err(|e| ChartError::io(format!("create {}: {}", dir.display(), e)))?;
    let path = dir.join(&chart.file_name);
    std::fs::write(&path, &chart.png_bytes)
        .map_err(|e| ChartError::io(format!("write {}: {}", path.display(), e)))?;
    info!(path = %path.display(), bytes = chart.png_bytes.len(), "saved chart");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn chart(bytes: &[u8]) -> RenderedChart {
        RenderedChart {
            file_name: "test.png".to_string(),
            png_bytes: bytes.to_vec(),
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_save_creates_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/output");
        let path = save_chart(&chart(b"first, longer"), &out).unwrap();
        assert_eq!(path, out.join("test.png"));
        save_chart(&chart(b"second"), &out).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn test_save_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let err = save_chart(&chart(b"png"), &blocker).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }
}
