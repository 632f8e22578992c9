use core_config::{ConfigError, FromEnv, env_list_or, env_parse_or};

use crate::error::FileError;

pub const DEFAULT_ALLOWED_EXTENSIONS: &str = "jpg,jpeg,png,gif";

/// 5 MiB
pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Upload limits, read from `UPLOAD_ALLOWED_EXTENSIONS` and `UPLOAD_MAX_BYTES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub allowed_extensions: Vec<String>,
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .split(',')
                .map(str::to_string)
                .collect(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl FromEnv for UploadConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            allowed_extensions: env_list_or("UPLOAD_ALLOWED_EXTENSIONS", DEFAULT_ALLOWED_EXTENSIONS),
            max_bytes: env_parse_or("UPLOAD_MAX_BYTES", &DEFAULT_MAX_BYTES.to_string())?,
        })
    }
}

/// Extension allow-list applied to uploaded file names.
#[derive(Debug, Clone)]
pub struct FileFilter {
    allowed: Vec<String>,
}

impl FileFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Accept `file_name` when its last extension is allowed, ignoring case.
    ///
    /// ```
    /// use domain_files::FileFilter;
    ///
    /// let filter = FileFilter::default();
    /// assert!(filter.check("photo.PNG").is_ok());
    /// assert!(filter.check("notes.txt").is_err());
    /// ```
    pub fn check(&self, file_name: &str) -> Result<(), FileError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty());

        match extension {
            Some(ext) if self.allowed.contains(&ext) => Ok(()),
            _ => Err(FileError::InvalidExtension(file_name.to_string())),
        }
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new(UploadConfig::default().allowed_extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_accepts_images() {
        let filter = FileFilter::default();
        for name in ["a.jpg", "b.JPEG", "c.Png", "d.gif", "archive.tar.png"] {
            assert!(filter.check(name).is_ok(), "{name} should pass");
        }
    }

    #[test]
    fn test_default_filter_rejects_others() {
        let filter = FileFilter::default();
        for name in ["notes.txt", "image", "image.", "png", "photo.png.exe"] {
            assert!(
                matches!(filter.check(name), Err(FileError::InvalidExtension(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_custom_extensions_are_normalized() {
        let filter = FileFilter::new([".WEBP"]);
        assert!(filter.check("hero.webp").is_ok());
        assert!(filter.check("hero.jpg").is_err());
    }

    #[test]
    fn test_upload_config_defaults() {
        temp_env::with_vars_unset(["UPLOAD_ALLOWED_EXTENSIONS", "UPLOAD_MAX_BYTES"], || {
            let config = UploadConfig::from_env().unwrap();
            assert_eq!(config, UploadConfig::default());
            assert_eq!(config.max_bytes, 5_242_880);
        });
    }

    #[test]
    fn test_upload_config_from_env() {
        temp_env::with_vars(
            [
                ("UPLOAD_ALLOWED_EXTENSIONS", Some("webp, avif")),
                ("UPLOAD_MAX_BYTES", Some("1024")),
            ],
            || {
                let config = UploadConfig::from_env().unwrap();
                assert_eq!(config.allowed_extensions, ["webp", "avif"]);
                assert_eq!(config.max_bytes, 1024);
            },
        );
    }

    #[test]
    fn test_upload_config_rejects_bad_size() {
        temp_env::with_var("UPLOAD_MAX_BYTES", Some("lots"), || {
            assert!(UploadConfig::from_env().is_err());
        });
    }
}
