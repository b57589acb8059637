//! End-to-end tests for updating a WORKSPACE through the library, with the
//! network-facing steps replaced by fakes.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use wtool::add::{AddOptions, add_to_workspace};
use wtool::error::WtoolError;
use wtool::naming::ResolveMode;
use wtool::vcs::{RemoteLister, RepoRoot, RepoRootResolver, VcsKind, static_repo_root};
use wtool::workspace::{WORKSPACE_FILE, WorkspaceFile};

const FAKE_COMMIT: &str = "23def4e6c14b4da8ac2ed8007337bc5eb5007998";

/// Resolves well-known hosts only; anything else is a resolution error.
struct OfflineResolver;

impl RepoRootResolver for OfflineResolver {
    fn repo_root_for_import_path(&self, import_path: &str) -> Result<RepoRoot, WtoolError> {
        static_repo_root(import_path)?.ok_or_else(|| WtoolError::VcsResolution {
            import_path: import_path.to_string(),
            message: "offline".to_string(),
        })
    }
}

#[derive(Default)]
struct FakeGit {
    queried: RefCell<Vec<String>>,
}

impl RemoteLister for FakeGit {
    fn ls_remote(&self, repo: &str, reference: &str) -> Result<String, WtoolError> {
        assert_eq!(reference, "HEAD");
        self.queried.borrow_mut().push(repo.to_string());
        Ok(FAKE_COMMIT.to_string())
    }
}

struct SilentGit;

impl RemoteLister for SilentGit {
    fn ls_remote(&self, repo: &str, reference: &str) -> Result<String, WtoolError> {
        Err(WtoolError::NoRemoteOutput {
            repo: repo.to_string(),
            reference: reference.to_string(),
        })
    }
}

fn workspace_with(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join(WORKSPACE_FILE);
    fs::write(&path, contents).expect("Failed to write WORKSPACE");
    (dir, path)
}

fn options() -> AddOptions {
    AddOptions {
        quiet: true,
        ..AddOptions::default()
    }
}

fn args(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_appends_one_declaration_after_existing_statement() {
    let original = r#"# Copyright 2016 The Demo Authors.

git_repository(
    name = "io_bazel_rules_go",
    remote = "https://github.com/bazelbuild/rules_go.git",
    tag = "0.2.0",
)
"#;
    let (_dir, path) = workspace_with(original);
    let git = FakeGit::default();

    let report = add_to_workspace(
        &path,
        &args(&["com_github_golang_glog"]),
        "new_go_repository",
        &options(),
        &OfflineResolver,
        &git,
    )
    .expect("add should succeed");

    let expected = format!(
        r#"{original}
new_go_repository(
    name = "com_github_golang_glog",
    importpath = "github.com/golang/glog",
    commit = "{FAKE_COMMIT}",
)
"#
    );
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, expected);
    assert_eq!(report.contents, expected.as_bytes());
    assert_eq!(report.added.len(), 1);
    assert_eq!(
        git.queried.borrow().as_slice(),
        ["https://github.com/golang/glog"]
    );
}

#[test]
fn test_declarations_follow_argument_order() {
    let (_dir, path) = workspace_with("workspace(name = \"demo\")\n");

    add_to_workspace(
        &path,
        &args(&[
            "com_github_golang_protobuf",
            "com_github_golang_glog",
            "com_github_grpc_ecosystem_grpc_gateway",
        ]),
        "new_go_repository",
        &options(),
        &OfflineResolver,
        &FakeGit::default(),
    )
    .unwrap();

    let ws = WorkspaceFile::load(&path).unwrap();
    assert_eq!(
        ws.declared_names(),
        [
            "demo",
            "com_github_golang_protobuf",
            "com_github_golang_glog",
            "com_github_grpc_ecosystem_grpc_gateway",
        ]
    );
    assert!(
        fs::read_to_string(&path)
            .unwrap()
            .contains("importpath = \"github.com/grpc/ecosystem-grpc-gateway\"")
    );
}

#[test]
fn test_running_twice_appends_twice() {
    let (_dir, path) = workspace_with("workspace(name = \"demo\")\n");

    for _ in 0..2 {
        add_to_workspace(
            &path,
            &args(&["com_github_golang_glog"]),
            "new_go_repository",
            &options(),
            &OfflineResolver,
            &FakeGit::default(),
        )
        .unwrap();
    }

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written.matches("new_go_repository(").count(), 2);
    assert_eq!(
        WorkspaceFile::load(&path)
            .unwrap()
            .document()
            .stmts
            .len(),
        3
    );
}

#[test]
fn test_remote_failure_leaves_file_byte_for_byte() {
    let original = "# header   \n\n\n\nworkspace(name = \"demo\")   \n";
    let (_dir, path) = workspace_with(original);

    let err = add_to_workspace(
        &path,
        &args(&["com_github_golang_glog"]),
        "new_go_repository",
        &options(),
        &OfflineResolver,
        &SilentGit,
    )
    .unwrap_err();

    assert!(matches!(err, WtoolError::NoRemoteOutput { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_non_git_repository_is_rejected() {
    let (_dir, path) = workspace_with("");
    let git = FakeGit::default();

    let err = add_to_workspace(
        &path,
        &args(&["launchpad.net/gocheck"]),
        "new_go_repository",
        &AddOptions {
            mode: ResolveMode::ImportPath,
            ..options()
        },
        &OfflineResolver,
        &git,
    )
    .unwrap_err();

    match err {
        WtoolError::UnsupportedVcs { vcs, .. } => assert_eq!(vcs, VcsKind::Bazaar.to_string()),
        other => panic!("Expected UnsupportedVcs, got {:?}", other),
    }
    assert!(git.queried.borrow().is_empty());
}

#[test]
fn test_custom_rule_name() {
    let (_dir, path) = workspace_with("");

    add_to_workspace(
        &path,
        &args(&["github.com/golang/glog"]),
        "go_repository",
        &AddOptions {
            mode: ResolveMode::ImportPath,
            ..options()
        },
        &OfflineResolver,
        &FakeGit::default(),
    )
    .unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("go_repository(\n    name = \"com_github_golang_glog\",\n"));
}
