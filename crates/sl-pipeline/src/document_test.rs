use super::*;
use std::fs;
use tempfile::TempDir;

fn exts(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_extension_filter() {
    let accepted = exts(&["md", ".TXT"]);
    assert!(has_accepted_extension(Path::new("a/notes.txt"), &accepted));
    assert!(has_accepted_extension(Path::new("README.MD"), &accepted));
    assert!(!has_accepted_extension(Path::new("image.png"), &accepted));
    assert!(!has_accepted_extension(Path::new("Makefile"), &accepted));
    assert!(has_accepted_extension(Path::new("Makefile"), &[]));
}

#[test]
fn test_collect_files_walks_directories() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("nested/b.md"), "b").unwrap();
    fs::write(dir.path().join("nested/c.png"), "c").unwrap();

    let files = collect_files(&[dir.path().to_path_buf()], &exts(&["txt", "md"])).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.md"]);
}

#[test]
fn test_explicit_file_bypasses_filter() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.png");
    fs::write(&file, "x").unwrap();
    let files = collect_files(&[file.clone(), file.clone()], &exts(&["txt"])).unwrap();
    assert_eq!(files, vec![file]);
}

#[test]
fn test_missing_path_is_error() {
    let err = collect_files(&[PathBuf::from("/definitely/not/here")], &[]).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
}

#[test]
fn test_plain_text_extractor() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("cs.txt");
    fs::write(&file, "Computer Science dept").unwrap();
    assert_eq!(
        PlainTextExtractor.extract(&file).unwrap(),
        "Computer Science dept"
    );

    let err = PlainTextExtractor
        .extract(&dir.path().join("missing.txt"))
        .unwrap_err();
    assert!(err.to_string().contains("[P005]"));
}
