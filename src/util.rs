// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Utilities for random numbers and path resolution.

use std::{
    env,
    fs::read_dir,
    io::{self, ErrorKind},
    path::{Path, PathBuf, MAIN_SEPARATOR},
};

mod rand;
pub use rand::*;

/// get flag_file path...
pub fn get_project_root(flag_file: &str) -> io::Result<PathBuf> {
    let path = env::current_dir()?;
    let path_ancestors = path.as_path().ancestors();

    for p in path_ancestors {
        let mut has_flag = false;
        for entry in read_dir(p)? {
            if entry?.file_name() == *flag_file {
                has_flag = true;
                break;
            }
        }
        if has_flag {
            return Ok(PathBuf::from(p));
        }
    }
    Err(io::Error::new(
        ErrorKind::NotFound,
        "Ran out of places to find flag_file",
    ))
}

/// Gets the absolute path of the project root. It looks for where Cargo.toml
/// or spechack.toml locates, falling back to the current directory.
pub fn get_root_path() -> String {
    for flag in ["spechack.toml", "Cargo.toml"] {
        if let Ok(p) = get_project_root(flag) {
            return p.to_string_lossy().to_string();
        }
    }
    ".".to_string()
}

pub fn get_abs_path(fpath: &str) -> String {
    if Path::new(fpath).is_relative() {
        format!("{}{}{}", get_root_path(), MAIN_SEPARATOR, fpath)
    } else {
        fpath.to_string()
    }
}

/// Clamp a value into [lower, upper].
pub fn clamp(lower: f64, upper: f64, x: f64) -> f64 {
    f64::max(f64::min(upper, x), lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_are_untouched() {
        #[cfg(not(windows))]
        assert_eq!(get_abs_path("/tmp/spechack.log"), "/tmp/spechack.log");
    }

    #[test]
    fn relative_paths_are_rooted() {
        let p = get_abs_path("log/spechack.log");
        assert!(p.ends_with("spechack.log"));
        assert!(Path::new(&p).is_absolute() || p.starts_with('.'));
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(0.0, 1.0, 1.5), 1.0);
        assert_eq!(clamp(0.0, 1.0, -0.5), 0.0);
        assert_eq!(clamp(0.0, 1.0, 0.25), 0.25);
    }
}
