//! Integration tests for the four calling conventions.
//!
//! Each test creates a real repository in a temp dir and drives builtin
//! operations through the global dispatcher.

use std::path::Path;

use tempfile::TempDir;

use gitvane::git::{Identity, Repository};
use gitvane::ops::{
    self, option_map, AddOp, CommitOp, Configure, DispatchError, Dispatcher, ErrorKind, Invocation,
    LogOp, OptionMap, OptionValue, Phase, Registry,
};

/// A fresh repository with a fallback identity attached.
struct TestRepo {
    dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = ops::init(|op| op.dir = Some(dir.path().to_path_buf())).expect("init failed");
        repo.set_identity(Some(Identity {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
        }));
        Self { dir, repo }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, name: &str, content: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Write, stage and commit one file.
    fn commit_file(&self, name: &str, content: &str, message: &str) {
        self.write(name, content);
        self.repo
            .run_by::<CommitOp>(|op| {
                op.message = Some(message.to_string());
                op.paths = vec![name.to_string()];
            })
            .unwrap();
    }
}

mod scenarios {
    use super::*;

    #[test]
    fn commit_with_message_returns_identifier() {
        let t = TestRepo::new();
        t.write("README.md", "# hi\n");
        t.repo.run_by::<AddOp>(|op| op.patterns = vec!["README.md".into()]).unwrap();

        let commit = t
            .repo
            .run_map::<CommitOp>(option_map([("message", "First commit")]))
            .unwrap();

        assert_eq!(commit.oid.as_str().len(), 40);
        assert_eq!(commit.summary, "First commit");
        assert_eq!(t.repo.head().unwrap().oid, commit.oid);
    }

    #[test]
    fn commit_without_message_is_missing_option() {
        let t = TestRepo::new();

        let err = t.repo.run_map::<CommitOp>(OptionMap::new()).unwrap_err();

        assert!(matches!(
            err,
            DispatchError::MissingOption { option: "message", .. }
        ));
        assert!(err.to_string().contains("missing required option: message"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn empty_required_list_is_missing_option() {
        let t = TestRepo::new();

        let err = t
            .repo
            .run_map::<AddOp>(option_map([("patterns", Vec::<String>::new())]))
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::MissingOption { option: "patterns", .. }
        ));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn bogus_key_creates_no_commit() {
        let t = TestRepo::new();
        t.write("a.txt", "a");
        t.repo.run_by::<AddOp>(|op| op.patterns = vec!["a.txt".into()]).unwrap();

        let options = option_map([
            ("message", OptionValue::from("x")),
            ("bogus", OptionValue::from(1)),
        ]);
        let err = t.repo.run_map::<CommitOp>(options).unwrap_err();

        assert!(err.to_string().contains("unknown option: bogus"));
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(t.repo.log().unwrap().is_empty());
        assert!(t.repo.head().is_err());
    }

    #[test]
    fn log_converges_across_no_arg_and_empty_map() {
        let t = TestRepo::new();
        t.commit_file("one.txt", "1", "one");
        t.commit_file("two.txt", "2", "two");
        t.commit_file("three.txt", "3", "three");

        let no_arg = t.repo.run::<LogOp>().unwrap();
        let empty_map = t.repo.run_map::<LogOp>(OptionMap::new()).unwrap();
        let closure = t.repo.run_by::<LogOp>(|_| {}).unwrap();

        let summaries: Vec<_> = no_arg.iter().map(|c| c.summary.as_str()).collect();
        assert_eq!(summaries, vec!["three", "two", "one"]);
        assert_eq!(no_arg, empty_map);
        assert_eq!(no_arg, closure);
    }

    struct StageAll;

    impl Configure<AddOp> for StageAll {
        fn configure(&self, op: &mut AddOp) {
            op.patterns = vec![".".to_string()];
        }
    }

    #[test]
    fn add_via_configuration_object_stages_matches() {
        let t = TestRepo::new();
        t.write("a.txt", "a");
        t.write("dir/b.txt", "b");

        t.repo.run_with::<AddOp>(&StageAll).unwrap();

        let status = t.repo.status().unwrap();
        let mut staged = status.staged.added.clone();
        staged.sort();
        assert_eq!(staged, vec!["a.txt", "dir/b.txt"]);
        assert!(status.unstaged.is_empty());
    }
}

mod equivalence {
    use super::*;

    fn configured_map(handle: &gitvane::git::RepoHandle, options: OptionMap) -> Invocation<'static> {
        let mut invocation = Dispatcher::global().prepare("log", Some(handle)).unwrap();
        invocation.configure_map(options).unwrap();
        invocation
    }

    #[test]
    fn map_and_object_produce_same_snapshot() {
        let t = TestRepo::new();
        let handle = t.repo.handle();

        let by_map = configured_map(
            &handle,
            option_map([
                ("includes", OptionValue::from(vec!["main"])),
                ("skip", OptionValue::from(2)),
                ("max_commits", OptionValue::from(10)),
            ]),
        );

        let mut by_object = Dispatcher::global().prepare("log", Some(&handle)).unwrap();
        by_object
            .configure_with(ops::Convention::Object, |op: &mut LogOp| {
                op.includes = vec!["main".into()];
                op.skip = 2;
                op.max_commits = 10;
            })
            .unwrap();

        assert_eq!(by_map.snapshot(), by_object.snapshot());
        assert_eq!(by_map.phase(), Phase::Configured);
        assert_eq!(by_object.phase(), Phase::Configured);
    }

    #[test]
    fn empty_map_matches_defaults() {
        let t = TestRepo::new();
        let handle = t.repo.handle();

        for descriptor in Registry::global().iter().filter(|d| !d.schema.has_required()) {
            let Ok(mut defaults) = Dispatcher::global().prepare(descriptor.name, Some(&handle)) else {
                continue;
            };
            defaults.configure_defaults().unwrap();

            let mut mapped = Dispatcher::global().prepare(descriptor.name, Some(&handle)).unwrap();
            mapped.configure_map(OptionMap::new()).unwrap();

            assert_eq!(defaults.snapshot(), mapped.snapshot(), "{}", descriptor.name);
        }
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn execute_twice_is_rejected() {
        let t = TestRepo::new();
        t.commit_file("a.txt", "a", "first");

        let mut invocation = Dispatcher::global().prepare("head", Some(&t.repo.handle())).unwrap();
        invocation.configure_defaults().unwrap();
        invocation.execute().unwrap();
        assert_eq!(invocation.phase(), Phase::Completed);

        let err = invocation.execute().unwrap_err();
        assert!(matches!(err, DispatchError::AlreadyExecuted { .. }));
    }

    #[test]
    fn failed_execution_is_final() {
        let t = TestRepo::new();

        let mut invocation = Dispatcher::global().prepare("head", Some(&t.repo.handle())).unwrap();
        invocation.configure_defaults().unwrap();
        let err = invocation.execute().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Execution);
        assert_eq!(invocation.phase(), Phase::Failed);
        assert!(matches!(
            invocation.execute(),
            Err(DispatchError::AlreadyExecuted { .. })
        ));
    }

    #[test]
    fn bound_operation_without_handle() {
        let err = Dispatcher::global().call("status", None).unwrap_err();
        assert!(matches!(err, DispatchError::HandleRequired { .. }));
    }

    #[test]
    fn closed_repository_is_reported() {
        let t = TestRepo::new();
        let handle = t.repo.handle();
        let TestRepo { dir: _dir, repo } = t;
        repo.close();

        let err = Dispatcher::global().call("status", Some(&handle)).unwrap_err();
        assert!(matches!(err, DispatchError::HandleClosed { .. }));
    }

    #[test]
    fn unknown_operation() {
        let err = Dispatcher::global().call("frobnicate", None).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownOperation { .. }));
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn object_convention_skips_validation() {
        let t = TestRepo::new();
        t.write("a.txt", "a");

        // No message set: the configurator is trusted, so the engine reports it
        let err = t.repo.run_by::<CommitOp>(|op| op.all = true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert!(matches!(err, DispatchError::Execution { .. }));
    }
}
