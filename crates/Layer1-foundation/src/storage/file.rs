//! JSON 파일 입출력
//!
//! 쓰기는 대상과 같은 디렉토리의 임시 파일에 기록한 뒤 rename 합니다.
//! 스캔 도중 실패해도 이전 매니페스트가 반쯤 쓰인 채로 남지 않습니다.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// JSON 파일 읽기, 파일이 없으면 `None`
///
/// 파싱 실패는 경로를 포함한 `Error::Config`로 반환합니다.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Option<T>> {
    let path = path.as_ref();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// JSON 파일 쓰기 (상위 디렉토리 생성, 임시 파일 후 교체)
pub fn write_json_atomic<T: Serialize>(path: impl AsRef<Path>, data: &T) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, data)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!(path = %path.display(), "Wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/sample.json");
        let sample = Sample {
            name: "zeyon".into(),
            count: 3,
        };

        write_json_atomic(&path, &sample).unwrap();
        assert_eq!(read_json::<Sample>(&path).unwrap(), Some(sample));

        // 임시 파일이 남지 않음
        let files: Vec<_> = std::fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        write_json_atomic(&path, &Sample { name: "a".into(), count: 1 }).unwrap();
        write_json_atomic(&path, &Sample { name: "b".into(), count: 2 }).unwrap();

        let loaded: Sample = read_json(&path).unwrap().unwrap();
        assert_eq!(loaded.count, 2);
    }

    #[test]
    fn test_read_missing_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_json::<Sample>(dir.path().join("missing.json"))
            .unwrap()
            .is_none());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(read_json::<Sample>(&broken), Err(Error::Config(_))));
    }
}
