//! Folder discovery and output writing.

use std::fs;
use std::path::PathBuf;

use optsvg::OptsvgError;
use optsvg::files::{FileJob, collect_folder, pair_outputs, write_output};

const SVG: &str = "<svg/>";

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.svg"), SVG).unwrap();
    fs::write(dir.path().join("notes.txt"), "hi").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/c.svg"), SVG).unwrap();
    dir
}

#[test]
fn test_collect_folder_flat() {
    let dir = fixture();
    let out = PathBuf::from("out");

    let jobs = collect_folder(dir.path(), &out, false).unwrap();

    assert_eq!(
        jobs,
        vec![FileJob {
            input: dir.path().join("a.svg"),
            output: out.join("a.svg"),
        }]
    );
}

#[test]
fn test_collect_folder_recursive_mirrors_layout() {
    let dir = fixture();
    let out = PathBuf::from("out");

    let jobs = collect_folder(dir.path(), &out, true).unwrap();
    let outputs: Vec<_> = jobs.iter().map(|job| job.output.clone()).collect();

    assert_eq!(outputs, vec![out.join("a.svg"), out.join("sub").join("c.svg")]);
}

#[test]
fn test_collect_folder_without_svg_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "hi").unwrap();

    assert!(matches!(
        collect_folder(dir.path(), dir.path(), true),
        Err(OptsvgError::NoSvgFiles(_))
    ));
}

#[test]
fn test_pair_outputs_into_directory() {
    let dir = fixture();
    let out = tempfile::tempdir().unwrap();
    let inputs = vec![dir.path().join("a.svg"), dir.path().join("sub")];

    let jobs = pair_outputs(&inputs, &[out.path().to_path_buf()]);

    assert_eq!(jobs[0].output, out.path().join("a.svg"));
    // directories are processed in place
    assert_eq!(jobs[1].output, dir.path().join("sub"));
}

#[test]
fn test_write_output_creates_parents() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested/deep/x.svg");

    write_output(None, &target, SVG).unwrap();

    assert_eq!(fs::read_to_string(target).unwrap(), SVG);
}

#[test]
fn test_write_output_into_existing_directory() {
    let dir = fixture();
    let out = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.svg");

    write_output(Some(&input), out.path(), SVG).unwrap();

    assert_eq!(fs::read_to_string(out.path().join("a.svg")).unwrap(), SVG);
}
