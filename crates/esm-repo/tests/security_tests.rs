//! Repositories must never resolve or open anything outside their root.

use esm_fs::RelativePath;
use esm_repo::{ArchiveRepository, DirectoryRepository, Error, ModuleRepository};
use esm_test_utils::{ArchiveBuilder, ModuleTree};
use rstest::rstest;

/// A repository root next to a sibling directory holding a "secret" module.
fn jail() -> (ModuleTree, DirectoryRepository) {
    let tree = ModuleTree::new()
        .file("repo/inside.mjs", "inside")
        .file("repo/etc/passwd", "decoy inside the root")
        .file("secret.mjs", "outside")
        .file("etc/passwd", "root:x:0:0");
    let repo = DirectoryRepository::new(tree.path("repo")).unwrap();
    (tree, repo)
}

#[rstest]
#[case("../secret")]
#[case("../secret.mjs")]
#[case("../../etc/passwd")]
#[case("./../secret")]
#[case("a/../../secret")]
#[case("..\\secret")]
fn test_escaping_references_are_not_found(#[case] reference: &str) {
    let (_tree, repo) = jail();
    assert_eq!(repo.resolve_module_str(reference), None);
}

#[test]
fn test_escaping_namespaced_path_is_not_found() {
    let (_tree, repo) = jail();
    let escaping = repo
        .unique_prefix()
        .append(&RelativePath::parse("../../secret.mjs"));

    assert_eq!(repo.resolve_module_path(&escaping), None);
    assert!(matches!(
        repo.open_for_read(&escaping),
        Err(Error::Traversal { .. })
    ));
}

#[test]
fn test_parent_segments_inside_root_are_fine() {
    let (_tree, repo) = jail();
    let resolved = repo.resolve_module_str("etc/../inside").unwrap();
    assert!(resolved.to_string().ends_with("/inside.mjs"));
}

#[cfg(unix)]
#[test]
fn test_symlink_out_of_root_is_rejected() {
    let (tree, repo) = jail();
    std::os::unix::fs::symlink(tree.path("secret.mjs"), tree.path("repo/link.mjs")).unwrap();

    assert_eq!(repo.resolve_module_str("link"), None);
    let forged = repo.unique_prefix().append(&RelativePath::parse("link.mjs"));
    assert!(matches!(
        repo.open_for_read(&forged),
        Err(Error::Traversal { .. })
    ));
}

#[cfg(unix)]
#[test]
fn test_symlink_inside_root_reports_target() {
    let (tree, repo) = jail();
    std::os::unix::fs::symlink(tree.path("repo/inside.mjs"), tree.path("repo/alias.mjs")).unwrap();

    let resolved = repo.resolve_module_str("alias").unwrap();
    assert!(resolved.to_string().ends_with("/inside.mjs"));
}

#[test]
fn test_archive_references_cannot_leave_in_archive_root() {
    let (_dir, jar) = ArchiveBuilder::new()
        .file("secret.js", "outside")
        .file("js/v3/lib/x.js", "inside")
        .build_temp("modules.jar");
    let repo = ArchiveRepository::with_root(&jar, &RelativePath::parse("js/v3")).unwrap();

    assert_eq!(repo.resolve_module_str("../../secret"), None);
    assert_eq!(repo.resolve_module_str("../../secret.js"), None);
    assert!(repo.resolve_module_str("lib/x").is_some());
}
