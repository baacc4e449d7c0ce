//! Input discovery and output writing for the command line.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use crate::error::OptsvgError;

/// One file to optimize and where its result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// `-` stands for stdin/stdout.
pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

pub fn is_svg_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "svg")
}

/// Pair each input with an output path.
///
/// - no outputs: inputs are rewritten in place
/// - a single existing directory: `DIR/<input file name>`
/// - fewer outputs than inputs: the remaining inputs are rewritten in place
pub fn pair_outputs(inputs: &[PathBuf], outputs: &[PathBuf]) -> Vec<FileJob> {
    let output_dir = match outputs {
        [dir] if dir.is_dir() => Some(dir),
        _ => None,
    };

    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let output = match output_dir {
                Some(_) if input.is_dir() => input.clone(),
                Some(dir) => match input.file_name() {
                    Some(name) => dir.join(name),
                    None => dir.clone(),
                },
                None => outputs.get(i).unwrap_or(input).clone(),
            };
            FileJob {
                input: input.clone(),
                output,
            }
        })
        .collect()
}

/// Find the `*.svg` files of a folder, mirroring its layout into `output`.
///
/// Subdirectories are searched only when `recursive` is set.
pub fn collect_folder(
    dir: &Path,
    output: &Path,
    recursive: bool,
) -> Result<Vec<FileJob>, OptsvgError> {
    let mut walker = WalkBuilder::new(dir);
    walker
        .standard_filters(false)
        .max_depth(if recursive { None } else { Some(1) })
        .sort_by_file_name(|a, b| a.cmp(b));

    let mut jobs = Vec::new();
    for entry in walker.build() {
        let entry = entry.map_err(std::io::Error::other)?;
        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) || !is_svg_file(path) {
            continue;
        }

        let relative = path.strip_prefix(dir).unwrap_or(path);
        jobs.push(FileJob {
            input: path.to_path_buf(),
            output: output.join(relative),
        });
    }

    if jobs.is_empty() {
        return Err(OptsvgError::NoSvgFiles(dir.to_path_buf()));
    }

    debug!(dir = %dir.display(), files = jobs.len(), "collected folder");
    Ok(jobs)
}

/// Write an optimized file, creating parent directories as needed.
///
/// If `output` is an existing directory the file is written inside it under
/// the input's file name.
pub fn write_output(input: Option<&Path>, output: &Path, data: &str) -> Result<(), OptsvgError> {
    if output.is_dir()
        && let Some(name) = input.and_then(Path::file_name)
    {
        fs::write(output.join(name), data)?;
        return Ok(());
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| match e.kind() {
            ErrorKind::NotADirectory | ErrorKind::AlreadyExists => {
                OptsvgError::NotADirectory(parent.to_path_buf())
            }
            _ => OptsvgError::Io(e),
        })?;
    }

    fs::write(output, data).map_err(|e| match e.kind() {
        ErrorKind::NotADirectory => OptsvgError::NotADirectory(output.to_path_buf()),
        _ => OptsvgError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_outputs_in_place() {
        let inputs = vec![PathBuf::from("a.svg"), PathBuf::from("b.svg")];
        let jobs = pair_outputs(&inputs, &[]);
        assert_eq!(jobs[0].output, PathBuf::from("a.svg"));
        assert_eq!(jobs[1].output, PathBuf::from("b.svg"));
    }

    #[test]
    fn test_pair_outputs_fills_missing_outputs() {
        let inputs = vec![PathBuf::from("a.svg"), PathBuf::from("b.svg")];
        let jobs = pair_outputs(&inputs, &[PathBuf::from("out-a.svg")]);
        assert_eq!(jobs[0].output, PathBuf::from("out-a.svg"));
        assert_eq!(jobs[1].output, PathBuf::from("b.svg"));
    }

    #[test]
    fn test_is_stdio() {
        assert!(is_stdio(Path::new("-")));
        assert!(!is_stdio(Path::new("-.svg")));
    }
}
