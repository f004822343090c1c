//! Discovery of per-member forecast files.
//!
//! Inference output is stored one file per member:
//!
//! ```text
//! {path}/{member}/{prefix}*{YYYY-MM-DDTHH}.json
//! ```
//!
//! A deterministic run is either a path naming the file itself, or a
//! directory (or directory plus file-name prefix) holding a file whose name
//! ends with the forecast time stamp.

use std::path::{Path, PathBuf};

use field_common::{ForecastTime, PlotError, Result};
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

/// Extension of dataset documents.
pub const DATA_EXTENSION: &str = "json";

/// A forecast file holding a single ensemble member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberFile {
    pub member: usize,
    pub path: PathBuf,
}

/// Locate the files of every requested member at forecast time `time`.
///
/// With `members` unset the run is treated as deterministic and a single
/// file is returned as member 0. The first match in file-name order wins
/// when several files fit.
pub fn discover_member_files(
    path: &Path,
    time: &ForecastTime,
    members: Option<&[usize]>,
    prefix: &str,
) -> Result<Vec<MemberFile>> {
    let stamp = time.stamp();
    let suffix = format!("{}.{}", stamp, DATA_EXTENSION);

    if path.is_file() {
        debug!(path = %path.display(), "Using forecast file directly");
        return Ok(vec![MemberFile {
            member: 0,
            path: path.to_path_buf(),
        }]);
    }

    let Some(members) = members else {
        // `path` may be a directory or a directory plus file-name prefix
        let (dir, name_prefix) = if path.is_dir() {
            (path.to_path_buf(), String::new())
        } else {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (dir, name)
        };
        let found = first_match(&dir, &name_prefix, &suffix).ok_or_else(|| {
            PlotError::MissingMemberFile {
                time: stamp.clone(),
                member: "0".to_string(),
            }
        })?;
        return Ok(vec![MemberFile {
            member: 0,
            path: found,
        }]);
    };

    members
        .iter()
        .map(|&member| {
            let dir = path.join(member.to_string());
            let found = first_match(&dir, prefix, &suffix).ok_or_else(|| {
                PlotError::MissingMemberFile {
                    time: stamp.clone(),
                    member: member.to_string(),
                }
            })?;
            debug!(member, path = %found.display(), "Found member file");
            Ok(MemberFile {
                member,
                path: found,
            })
        })
        .collect()
}

/// First file directly inside `dir` whose name starts with `prefix` and ends
/// with `suffix`.
fn first_match(dir: &Path, prefix: &str, suffix: &str) -> Option<PathBuf> {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| {
            let name = entry.file_name().to_string_lossy();
            name.starts_with(prefix) && name.ends_with(suffix)
        })
        .map(|entry| entry.into_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn time() -> ForecastTime {
        ForecastTime::parse("2024-05-01T06").unwrap()
    }

    #[test]
    fn test_direct_file_is_single_member() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("anything.json");
        fs::write(&file, "{}").unwrap();

        let files = discover_member_files(&file, &time(), Some(&[3, 4]), "").unwrap();
        assert_eq!(files, vec![MemberFile { member: 0, path: file }]);
    }

    #[test]
    fn test_deterministic_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("run_2024-04-30T18.json"), "{}").unwrap();
        fs::write(dir.path().join("run_2024-05-01T06.json"), "{}").unwrap();

        let files = discover_member_files(dir.path(), &time(), None, "").unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("run_2024-05-01T06.json"));
    }

    #[test]
    fn test_deterministic_prefix_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("aifs_2024-05-01T06.json"), "{}").unwrap();
        fs::write(dir.path().join("other_2024-05-01T06.json"), "{}").unwrap();

        let files = discover_member_files(&dir.path().join("other_"), &time(), None, "").unwrap();
        assert!(files[0].path.ends_with("other_2024-05-01T06.json"));
    }

    #[test]
    fn test_members_in_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        for member in [0, 1] {
            let sub = dir.path().join(member.to_string());
            fs::create_dir(&sub).unwrap();
            fs::write(sub.join("ens_x_2024-05-01T06.json"), "{}").unwrap();
            fs::write(sub.join("det_x_2024-05-01T06.json"), "{}").unwrap();
        }

        let files = discover_member_files(dir.path(), &time(), Some(&[1, 0]), "ens").unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].member, 1);
        assert!(files[0].path.ends_with("1/ens_x_2024-05-01T06.json"));
        assert_eq!(files[1].member, 0);
    }

    #[test]
    fn test_missing_member_names_time_and_member() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("0");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("2024-05-01T06.json"), "{}").unwrap();

        let err = discover_member_files(dir.path(), &time(), Some(&[0, 1]), "").unwrap_err();
        match err {
            PlotError::MissingMemberFile { time, member } => {
                assert_eq!(time, "2024-05-01T06");
                assert_eq!(member, "1");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_deterministic_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_member_files(dir.path(), &time(), None, "").unwrap_err();
        assert!(matches!(err, PlotError::MissingMemberFile { .. }));
    }
}
