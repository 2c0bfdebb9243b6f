use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn related_files_includes_direct_dependency() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.go"), "package p\nimport \"./b\"\n").expect("write");
    fs::write(dir.path().join("b.go"), "package p\n").expect("write");

    let mut graph = DepGraph::default();
    let related = graph.related_files(dir.path(), &[PathBuf::from("a.go")]);
    assert!(related.contains(&PathBuf::from("a.go")));
    assert!(related.contains(&PathBuf::from("b.go")));
}

#[test]
fn related_files_follows_dependents_direction_too() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.go"), "package p\nimport \"./b\"\n").expect("write");
    fs::write(dir.path().join("b.go"), "package p\n").expect("write");

    let mut graph = DepGraph::default();
    // Seed from b.go; a.go depends on it, so it must appear via `dependents`.
    let related = graph.related_files(dir.path(), &[PathBuf::from("b.go")]);
    assert!(related.contains(&PathBuf::from("a.go")));
}

#[test]
fn related_files_handles_cycles_without_looping_forever() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.go"), "package p\nimport \"./b\"\n").expect("write");
    fs::write(dir.path().join("b.go"), "package p\nimport \"./a\"\n").expect("write");

    let mut graph = DepGraph::default();
    let related = graph.related_files(dir.path(), &[PathBuf::from("a.go")]);
    assert_eq!(related.len(), 2);
}

#[test]
fn related_files_tolerates_unreadable_seed() {
    let dir = tempdir().expect("tempdir");
    let mut graph = DepGraph::default();
    let related = graph.related_files(dir.path(), &[PathBuf::from("missing.go")]);
    assert_eq!(related, [PathBuf::from("missing.go")].into_iter().collect());
}

#[test]
fn each_file_is_scanned_at_most_once() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.go"), "package p\nimport \"./b\"\nimport \"./b\"\n").expect("write");
    fs::write(dir.path().join("b.go"), "package p\n").expect("write");

    let mut graph = DepGraph::default();
    graph.related_files(dir.path(), &[PathBuf::from("a.go")]);
    assert!(graph.scanned.contains(&PathBuf::from("a.go")));
    assert_eq!(graph.scanned.len(), 2);
}
