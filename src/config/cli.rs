use crate::domain::ports::SheetSource;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Sheet files read straight from one directory on disk.
#[derive(Debug, Clone)]
pub struct LocalSheetDirectory {
    base_path: PathBuf,
}

impl LocalSheetDirectory {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }
}

impl SheetSource for LocalSheetDirectory {
    /// Regular files only, sorted by name.
    async fn list_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!("Ignoring non UTF-8 file name {:?}", raw),
            }
        }
        names.sort();
        Ok(names)
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(name);
        let data = fs::read(full_path)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lists_only_files_in_name_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("05_Meier_korrigiert.pdf"), b"b").unwrap();
        fs::write(dir.path().join("05_Albers_korrigiert.pdf"), b"a").unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();

        let source = LocalSheetDirectory::new(dir.path());
        let names = source.list_files().await.unwrap();

        assert_eq!(
            names,
            vec!["05_Albers_korrigiert.pdf", "05_Meier_korrigiert.pdf"]
        );
        assert_eq!(source.read_file("05_Meier_korrigiert.pdf").await.unwrap(), b"b");
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let source = LocalSheetDirectory::new(dir.path().join("Blatt99"));

        let err = source.list_files().await.unwrap_err();
        assert!(matches!(err, crate::utils::error::MailerError::IoError(_)));
    }
}
