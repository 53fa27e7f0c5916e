//! JSON 설정 저장소
//!
//! 설정 파일이 놓이는 두 위치를 다룹니다.
//!
//! | Scope | 경로 |
//! |-------|------|
//! | Global | `<config_dir>/tokenmeter/` |
//! | Project | `<cwd>/.tokenmeter/` |

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// 글로벌 설정 디렉토리 이름
const GLOBAL_DIR: &str = "tokenmeter";

/// 프로젝트 설정 디렉토리 이름
const PROJECT_DIR: &str = ".tokenmeter";

/// 설정 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScope {
    Global,
    Project,
}

/// 디렉토리 하나에 묶인 JSON 파일 저장소
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 범위에 해당하는 저장소
    pub fn for_scope(scope: StoreScope) -> Result<Self> {
        match scope {
            StoreScope::Global => Self::global(),
            StoreScope::Project => Self::current_project(),
        }
    }

    pub fn global() -> Result<Self> {
        dirs::config_dir()
            .map(|dir| Self::new(dir.join(GLOBAL_DIR)))
            .ok_or_else(|| Error::Config("Cannot find config directory".to_string()))
    }

    pub fn current_project() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::Config(format!("Cannot get current directory: {}", e)))?;
        Ok(Self::new(cwd.join(PROJECT_DIR)))
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.file_path(filename).is_file()
    }

    pub fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        read_json(&self.file_path(filename))
    }

    /// 파일이 없으면 None
    pub fn load_optional<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        if !self.exists(filename) {
            return Ok(None);
        }
        self.load(filename).map(Some)
    }

    /// 디렉토리를 만들고 pretty JSON으로 저장
    pub fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            Error::Config(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let path = self.file_path(filename);
        let mut content = serde_json::to_string_pretty(data)
            .map_err(|e| Error::Config(format!("Failed to serialize {}: {}", filename, e)))?;
        content.push('\n');

        std::fs::write(&path, content)
            .map_err(|e| Error::Config(format!("Failed to write {}: {}", path.display(), e)))
    }
}

/// JSON 파일 하나를 읽어 역직렬화
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}
