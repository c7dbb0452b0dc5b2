//! Integration tests for the repository service driven by configuration.

use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use gitvane::core::config::Config;
use gitvane::ops::{option_map, AddOp, CommitOp, LogOp, StatusOp};
use gitvane::service::{RepoService, ServiceError, ServiceParams};

fn global_config(dir: &TempDir, body: &str) -> Config {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    Config::load_from(Some(path.as_path()), None).unwrap()
}

const CONFIG: &str = r#"
[identity]
name = "Service User"
email = "service@example.com"

[service]
init_if_missing = true
"#;

#[test]
fn config_enables_init_and_identity() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let config = global_config(&home, CONFIG);

    let service = RepoService::new(ServiceParams::directory(work.path()).with_config(&config));
    assert!(!service.is_open());

    let repo = service.lease().unwrap();
    assert!(work.path().join(".git").is_dir());

    std::fs::write(work.path().join("a.txt"), "a").unwrap();
    repo.run_by::<AddOp>(|op| op.patterns = vec!["a.txt".into()]).unwrap();
    let commit = repo
        .run_map::<CommitOp>(option_map([("message", "from the service")]))
        .unwrap();

    assert_eq!(commit.author.email, "service@example.com");
    assert_eq!(commit.summary, "from the service");
}

#[test]
fn without_init_an_empty_directory_is_unavailable() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let config = global_config(&home, "[service]\ninit_if_missing = false\n");

    let service = RepoService::new(ServiceParams::directory(work.path()).with_config(&config));

    assert!(matches!(service.lease(), Err(ServiceError::NoRepository { .. })));
    assert!(service.find().is_none());
    assert!(!work.path().join(".git").exists());
}

#[test]
fn close_ends_all_access() {
    let work = TempDir::new().unwrap();
    let service = RepoService::new(ServiceParams::directory(work.path()).init_if_missing(true));

    let handle = {
        let repo = service.lease().unwrap();
        repo.run::<StatusOp>().unwrap();
        repo.handle()
    };

    service.close();

    assert!(service.is_closed());
    assert!(matches!(service.lease(), Err(ServiceError::Closed)));
    assert!(gitvane::ops::Dispatcher::global()
        .call("status", Some(&handle))
        .is_err());
}

#[test]
fn concurrent_commits_are_all_recorded() {
    let work = TempDir::new().unwrap();
    let root = work.path().to_path_buf();
    let service = Arc::new(RepoService::new(
        ServiceParams::directory(&root)
            .init_if_missing(true)
            .identity(Some(gitvane::git::Identity {
                name: "Worker".to_string(),
                email: "worker@example.com".to_string(),
            })),
    ));

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let service = Arc::clone(&service);
            let root = root.clone();
            thread::spawn(move || {
                let repo = service.lease().unwrap();
                let name = format!("file-{i}.txt");
                std::fs::write(root.join(&name), i.to_string()).unwrap();
                repo.run_by::<CommitOp>(|op| {
                    op.message = Some(format!("commit {i}"));
                    op.paths = vec![name];
                })
                .unwrap();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let repo = service.lease().unwrap();
    let log = repo.run::<LogOp>().unwrap();
    assert_eq!(log.len(), 4);
    assert!(repo.status().unwrap().is_clean());
}
