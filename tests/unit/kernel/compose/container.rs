use super::*;
use crate::kernel::test_support::{runtime, FakeSpawner, DB_PS, WEB_PS};
use std::path::Path;

#[test]
fn parse_state_is_case_insensitive() {
    assert_eq!(ContainerState::parse("Running"), ContainerState::Running);
    assert_eq!(ContainerState::parse(" exited "), ContainerState::Exited);
    assert_eq!(ContainerState::parse("removing"), ContainerState::Dead);
    assert_eq!(ContainerState::parse("weird"), ContainerState::Unknown);
}

#[test]
fn parse_ps_accepts_ndjson() {
    let raw = format!("{}\n\n{}\n", WEB_PS, DB_PS);
    let entries = parse_ps_json(&raw).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "shop-web-1");
    assert_eq!(entries[0].service, "web");
    assert_eq!(entries[1].state, "exited");
}

#[test]
fn parse_ps_accepts_single_array() {
    let raw = format!("[{},{}]", WEB_PS, DB_PS);
    let entries = parse_ps_json(&raw).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].status, "Exited (0) 1 hour ago");
}

#[test]
fn parse_ps_empty_output_means_no_containers() {
    assert!(parse_ps_json("").unwrap().is_empty());
    assert!(parse_ps_json("  \n").unwrap().is_empty());
}

#[test]
fn parse_ps_missing_optional_fields_default() {
    let entries = parse_ps_json(r#"{"Name":"lonely"}"#).unwrap();
    assert_eq!(entries[0].service, "");
    assert_eq!(entries[0].state, "");
}

#[test]
fn parse_ps_rejects_garbage() {
    let err = parse_ps_json("not json").unwrap_err();
    assert!(matches!(err, ExecError::Parse(_)));
}

#[test]
fn container_actions_use_docker_directly() {
    let rt = runtime();
    let spawner = FakeSpawner::new();
    spawner.on_output("logs", "hello\n");
    let docker = DockerExecutor::new("docker", Path::new("/work/shop"), spawner.clone());
    let entry = parse_ps_json(WEB_PS).unwrap().remove(0);
    let container = Container::new(entry, docker, "/bin/zsh", Some(10));

    assert_eq!(container.state(), ContainerState::Running);
    assert_eq!(container.status(), "Up 3 minutes");

    container.restart().unwrap();
    container.shell().unwrap();
    let logs = rt.block_on(container.logs()).unwrap();

    assert_eq!(spawner.spawned()[0].args, ["restart", "shop-web-1"]);
    assert_eq!(
        spawner.interactive_calls()[0].args,
        ["exec", "-it", "shop-web-1", "/bin/zsh"]
    );
    assert_eq!(spawner.outputs()[0].args, ["logs", "--tail", "10", "shop-web-1"]);
    assert_eq!(logs, "hello\n");
}
