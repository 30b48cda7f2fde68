use std::collections::HashMap;
use std::path::Path;

use crate::config::UploadPolicy;
use crate::sanitize::{sanitize_filename, SanitizationResult};

/// Reasons a batch is rejected before any network call is made
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select at least one file")]
    NoFiles,

    #[error("Too many files: {count} selected (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("{name}: file too large, {size} bytes (max: {max} bytes)")]
    FileTooLarge { name: String, size: u64, max: u64 },

    #[error("{name}: file is empty")]
    EmptyFile { name: String },

    #[error("{name}: file type '{extension}' is not allowed (allowed: {})", .allowed.join(", "))]
    InvalidExtension {
        name: String,
        extension: String,
        allowed: Vec<String>,
    },

    #[error("{0}: file has no extension")]
    MissingExtension(String),

    #[error("Files would overwrite each other, rename them: {}", describe_collisions(.0))]
    DuplicateNames(Vec<NameCollision>),
}

/// Files in one batch that would be stored under the same name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    /// Stored name of the first file in the group
    pub stored_as: String,
    /// Original names, in submission order
    pub files: Vec<String>,
}

fn describe_collisions(collisions: &[NameCollision]) -> String {
    collisions
        .iter()
        .map(|c| {
            let files: Vec<String> = c.files.iter().map(|f| format!("'{}'", f)).collect();
            format!("{} -> '{}'", files.join(", "), c.stored_as)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates a whole batch of files against the upload policy.
///
/// Files are checked in submission order and the first failure rejects the batch.
/// Duplicate detection compares sanitized names case-insensitively, since SharePoint
/// treats names that differ only in case as the same item.
#[derive(Debug, Clone)]
pub struct BatchValidator {
    max_files: usize,
    max_file_size: u64,
    allowed_extensions: Vec<String>,
}

impl BatchValidator {
    pub fn new(max_files: usize, max_file_size: u64, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_files,
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn from_policy(policy: &UploadPolicy) -> Self {
        Self::new(
            policy.max_files,
            policy.max_file_size_bytes,
            policy.allowed_extensions.clone(),
        )
    }

    /// Validate file count bounds
    pub fn validate_count(&self, count: usize) -> Result<(), ValidationError> {
        if count == 0 {
            return Err(ValidationError::NoFiles);
        }
        if count > self.max_files {
            return Err(ValidationError::TooManyFiles {
                count,
                max: self.max_files,
            });
        }
        Ok(())
    }

    /// Validate a single file's size and extension
    pub fn validate_file(&self, name: &str, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile {
                name: name.to_string(),
            });
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                name: name.to_string(),
                size,
                max: self.max_file_size,
            });
        }

        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::MissingExtension(name.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                name: name.to_string(),
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    /// Validate a batch of `(name, size)` pairs.
    ///
    /// Returns the sanitization result for every file, in order, when the batch passes.
    pub fn validate_batch<'a, I>(&self, files: I) -> Result<Vec<SanitizationResult>, ValidationError>
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let files: Vec<(&str, u64)> = files.into_iter().collect();
        self.validate_count(files.len())?;

        for (name, size) in &files {
            self.validate_file(name, *size)?;
        }

        let mut group_of: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<NameCollision> = Vec::new();
        let mut results = Vec::with_capacity(files.len());
        for (name, _) in &files {
            let result = sanitize_filename(name, false);
            match group_of.get(&result.sanitized.to_lowercase()) {
                Some(&index) => groups[index].files.push(name.to_string()),
                None => {
                    group_of.insert(result.sanitized.to_lowercase(), groups.len());
                    groups.push(NameCollision {
                        stored_as: result.sanitized.clone(),
                        files: vec![name.to_string()],
                    });
                }
            }
            results.push(result);
        }

        let collisions: Vec<NameCollision> =
            groups.into_iter().filter(|g| g.files.len() > 1).collect();
        if !collisions.is_empty() {
            return Err(ValidationError::DuplicateNames(collisions));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn test_validator() -> BatchValidator {
        BatchValidator::new(
            5,
            50 * MB,
            vec!["jpg".to_string(), "PNG".to_string(), ".mp4".to_string()],
        )
    }

    #[test]
    fn test_validate_count_bounds() {
        let validator = test_validator();
        assert_eq!(validator.validate_count(0), Err(ValidationError::NoFiles));
        assert!(validator.validate_count(5).is_ok());
        assert_eq!(
            validator.validate_count(6),
            Err(ValidationError::TooManyFiles { count: 6, max: 5 })
        );
    }

    #[test]
    fn test_validate_file_ok_case_insensitive_extension() {
        let validator = test_validator();
        assert!(validator.validate_file("photo.JPG", MB).is_ok());
        assert!(validator.validate_file("scan.png", MB).is_ok());
        assert!(validator.validate_file("clip.mp4", 50 * MB).is_ok());
    }

    #[test]
    fn test_validate_file_rejections() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_file("photo.jpg", 0),
            Err(ValidationError::EmptyFile { .. })
        ));
        assert!(matches!(
            validator.validate_file("clip.mp4", 50 * MB + 1),
            Err(ValidationError::FileTooLarge { .. })
        ));
        assert!(matches!(
            validator.validate_file("notes.exe", MB),
            Err(ValidationError::InvalidExtension { .. })
        ));
        assert_eq!(
            validator.validate_file("README", MB),
            Err(ValidationError::MissingExtension("README".to_string()))
        );
    }

    #[test]
    fn test_validate_batch_returns_sanitized_names_in_order() {
        let validator = test_validator();
        let results = validator
            .validate_batch([("My Photo.jpg", MB), ("clip.mp4", 2 * MB)])
            .expect("batch should pass");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].sanitized, "My_Photo.jpg");
        assert!(results[0].changes_made);
        assert_eq!(results[1].sanitized, "clip.mp4");
        assert!(!results[1].changes_made);
    }

    #[test]
    fn test_validate_batch_rejects_sanitized_duplicates() {
        let validator = test_validator();
        let err = validator
            .validate_batch([("Report #1.jpg", MB), ("report 1.JPG", MB)])
            .unwrap_err();
        match err {
            ValidationError::DuplicateNames(collisions) => {
                assert_eq!(
                    collisions,
                    vec![NameCollision {
                        stored_as: "Report_1.jpg".to_string(),
                        files: vec!["Report #1.jpg".to_string(), "report 1.JPG".to_string()],
                    }]
                );
            }
            other => panic!("Expected DuplicateNames, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_batch_reports_every_collision() {
        let validator = test_validator();
        let err = validator
            .validate_batch([
                ("a b.jpg", MB),
                ("a_b.jpg", MB),
                ("x&y.png", MB),
                ("A B.JPG", MB),
                ("xandy.png", MB),
            ])
            .unwrap_err();
        let ValidationError::DuplicateNames(collisions) = &err else {
            panic!("Expected DuplicateNames, got {err:?}");
        };
        assert_eq!(collisions.len(), 2);
        assert_eq!(collisions[0].stored_as, "a_b.jpg");
        assert_eq!(collisions[0].files, vec!["a b.jpg", "a_b.jpg", "A B.JPG"]);
        assert_eq!(collisions[1].stored_as, "xandy.png");
        assert_eq!(collisions[1].files, vec!["x&y.png", "xandy.png"]);
        assert_eq!(
            err.to_string(),
            "Files would overwrite each other, rename them: \
             'a b.jpg', 'a_b.jpg', 'A B.JPG' -> 'a_b.jpg'; 'x&y.png', 'xandy.png' -> 'xandy.png'"
        );
    }

    #[test]
    fn test_validate_batch_rejects_before_duplicates_on_bad_file() {
        let validator = test_validator();
        let err = validator
            .validate_batch([("a.jpg", MB), ("b.gif", MB), ("a.jpg", MB)])
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidExtension { .. }));
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::InvalidExtension {
            name: "x.exe".to_string(),
            extension: "exe".to_string(),
            allowed: vec!["jpg".to_string(), "png".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "x.exe: file type 'exe' is not allowed (allowed: jpg, png)"
        );
    }
}
