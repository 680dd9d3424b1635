#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
//! Integration tests for staging the service into a build directory.

mod common;

use std::sync::Arc;
use std::time::SystemTime;

use buildaux::commands;
use buildaux::config::ServiceLayout;
use buildaux::tasks;

use common::{RecordingExecutor, context, list_tree, write_file};

fn modified(path: &std::path::Path) -> SystemTime {
    std::fs::metadata(path).unwrap().modified().unwrap()
}

#[test]
fn stages_service_and_rerun_rewrites_nothing() {
    let src = tempfile::tempdir().unwrap();
    let build = tempfile::tempdir().unwrap();
    let indicator = write_file(src.path(), "meson.build", "project('app')\n");
    write_file(src.path(), "service/main.js", "main\n");
    write_file(src.path(), "service/node_modules/dep/index.js", "dep\n");
    write_file(src.path(), "package.json", "{}\n");
    write_file(src.path(), "yarn.lock", "# yarn lockfile v1\n");

    let layout = ServiceLayout::for_build_dir(&indicator, &build.path().join("service")).unwrap();
    let target = layout.target.clone();
    let mirror = layout.mirror.clone();
    let exec = Arc::new(RecordingExecutor::new());

    let (ctx, log) = context(&exec, false);
    let staged = tasks::stage_service_tasks(&layout, "yarn");
    commands::run_tasks(staged.iter().map(AsRef::as_ref), &ctx, &log).unwrap();

    assert_eq!(
        list_tree(&target),
        vec![".yarnrc", "main.js", "package.json", "yarn.lock"]
    );
    assert_eq!(
        std::fs::read_to_string(target.join(".yarnrc")).unwrap(),
        format!("yarn-offline-mirror \"{}\"\n", mirror.display())
    );
    assert!(mirror.ends_with("deps"));
    assert!(mirror.is_absolute());

    let rc_before = modified(&target.join(".yarnrc"));
    let main_before = modified(&target.join("main.js"));

    let (ctx, log) = context(&exec, false);
    commands::run_tasks(staged.iter().map(AsRef::as_ref), &ctx, &log).unwrap();

    assert_eq!(modified(&target.join(".yarnrc")), rc_before);
    assert_eq!(modified(&target.join("main.js")), main_before);
    assert_eq!(
        exec.calls(),
        vec![
            "yarn install --offline --only=production --frozen-lockfile --noprogress";
            2
        ]
    );
}
