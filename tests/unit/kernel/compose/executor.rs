use super::*;
use crate::kernel::test_support::{runtime, FakeSpawner};
use std::path::Path;

fn compose(spawner: Arc<FakeSpawner>, files: &[String]) -> ComposeExecutor {
    let program_args = vec!["compose".to_string()];
    ComposeExecutor::new(
        ComposeExecutorConfig {
            program: "docker",
            program_args: &program_args,
            files,
            shell: "/bin/bash",
            project_name: "shop",
            cwd: Path::new("/work/shop"),
        },
        spawner,
    )
}

#[test]
fn compose_command_puts_project_and_files_before_args() {
    let spawner = FakeSpawner::new();
    let files = vec!["base.yml".to_string(), "override.yml".to_string()];
    let spec = compose(spawner, &files).command(["ps"]);

    assert_eq!(spec.program, "docker");
    assert_eq!(
        spec.args,
        ["compose", "-p", "shop", "-f", "base.yml", "-f", "override.yml", "ps"]
    );
    assert_eq!(spec.cwd, Path::new("/work/shop"));
}

#[test]
fn no_files_means_no_file_flags() {
    let spawner = FakeSpawner::new();
    let spec = compose(spawner, &[]).command(["config", "--services"]);
    assert_eq!(spec.args, ["compose", "-p", "shop", "config", "--services"]);
}

#[test]
fn project_lifecycle_verbs() {
    let spawner = FakeSpawner::new();
    let exec = compose(spawner.clone(), &[]);

    exec.lifecycle(ComposeVerb::Up, None).unwrap();
    exec.lifecycle(ComposeVerb::Down, None).unwrap();
    exec.lifecycle(ComposeVerb::Kill, None).unwrap();

    let tails = spawner
        .spawned()
        .into_iter()
        .map(|spec| spec.args[3..].join(" "))
        .collect::<Vec<_>>();
    assert_eq!(tails, ["up -d", "down", "kill"]);
}

#[test]
fn spawned_commands_disable_ansi_but_queries_do_not() {
    let spawner = FakeSpawner::new();
    let exec = compose(spawner.clone(), &[]);

    exec.lifecycle(ComposeVerb::Build, Some("web")).unwrap();
    assert_eq!(
        spawner.spawned()[0].env,
        [("COMPOSE_ANSI".to_string(), "never".to_string())]
    );
    assert!(exec.command(["ps"]).env.is_empty());
}

#[test]
fn service_down_stops_and_removes_only_that_service() {
    let spawner = FakeSpawner::new();
    let exec = compose(spawner.clone(), &[]);

    exec.lifecycle(ComposeVerb::Down, Some("web")).unwrap();
    exec.lifecycle(ComposeVerb::Restart, Some("web")).unwrap();

    let spawned = spawner.spawned();
    assert_eq!(spawned[0].args[3..], ["rm", "--stop", "--force", "web"]);
    assert_eq!(spawned[1].args[3..], ["restart", "web"]);
}

#[test]
fn service_names_skips_blank_lines() {
    let rt = runtime();
    let spawner = FakeSpawner::new();
    spawner.on_output("config --services", "web\n\n db \n");
    let exec = compose(spawner, &[]);

    let names = rt.block_on(exec.service_names()).unwrap();
    assert_eq!(names, ["web", "db"]);
}

#[test]
fn non_zero_exit_becomes_failed() {
    let rt = runtime();
    let spawner = FakeSpawner::new();
    spawner.on_output_failure("config --services", 14, "no configuration file provided");
    let exec = compose(spawner, &[]);

    let err = rt.block_on(exec.service_names()).unwrap_err();
    match err {
        ExecError::Failed { code, stderr, .. } => {
            assert_eq!(code, Some(14));
            assert!(stderr.contains("no configuration file"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn ps_json_filters_by_service() {
    let rt = runtime();
    let spawner = FakeSpawner::new();
    let exec = compose(spawner.clone(), &[]);

    rt.block_on(exec.ps_json(Some("web"))).unwrap();
    rt.block_on(exec.ps_json(None)).unwrap();

    let outputs = spawner.outputs();
    assert_eq!(outputs[0].args[3..], ["ps", "--all", "--format", "json", "web"]);
    assert_eq!(outputs[1].args[3..], ["ps", "--all", "--format", "json"]);
}

#[test]
fn service_logs_honor_tail_and_merge_streams() {
    let rt = runtime();
    let spawner = FakeSpawner::new();
    spawner.on_output_captured(
        "logs --no-color",
        CapturedOutput {
            exit: crate::kernel::services::ports::ProcessExit::with_code(0),
            stdout: "out line".to_string(),
            stderr: "err line\n".to_string(),
        },
    );
    let exec = compose(spawner.clone(), &[]);

    let text = rt.block_on(exec.logs("web", Some(50))).unwrap();
    assert_eq!(text, "out line\nerr line\n");
    assert_eq!(
        spawner.outputs()[0].args[3..],
        ["logs", "--no-color", "--tail", "50", "web"]
    );
}

#[test]
fn interactive_service_commands() {
    let spawner = FakeSpawner::new();
    let exec = compose(spawner.clone(), &[]);

    exec.follow_logs("web").unwrap();
    exec.exec_shell("web").unwrap();

    let calls = spawner.interactive_calls();
    assert_eq!(calls[0].args[3..], ["logs", "--follow", "web"]);
    assert_eq!(calls[1].args[3..], ["exec", "web", "/bin/bash"]);
}

#[test]
fn docker_executor_targets_single_container() {
    let rt = runtime();
    let spawner = FakeSpawner::new();
    let docker = DockerExecutor::new("docker", Path::new("/work/shop"), spawner.clone());

    docker.stop("shop-web-1").unwrap();
    docker.kill("shop-web-1").unwrap();
    docker.exec_shell("shop-web-1", "/bin/sh").unwrap();
    docker.attach("shop-web-1").unwrap();
    rt.block_on(docker.logs("shop-web-1", None)).unwrap();

    let spawned = spawner.spawned();
    assert_eq!(spawned[0].args, ["stop", "shop-web-1"]);
    assert_eq!(spawned[1].args, ["kill", "shop-web-1"]);
    let calls = spawner.interactive_calls();
    assert_eq!(calls[0].args, ["exec", "-it", "shop-web-1", "/bin/sh"]);
    assert_eq!(calls[1].args, ["attach", "shop-web-1"]);
    assert_eq!(spawner.outputs()[0].args, ["logs", "shop-web-1"]);
}
