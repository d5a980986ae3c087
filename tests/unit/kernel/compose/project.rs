use super::*;
use crate::kernel::test_support::{folder, project, runtime, FakeSpawner, DB_PS, WEB_PS};

#[test]
fn folder_name_is_sanitized() {
    let f = folder(0, "my app.v2 (old)");
    assert_eq!(project_name(&f, &[]), "myappv2old");

    let f = folder(0, "shop_api-2");
    assert_eq!(project_name(&f, &[]), "shop_api-2");
}

#[test]
fn unusable_folder_name_yields_empty_project_name() {
    let f = folder(0, "日本");
    assert_eq!(project_name(&f, &[]), "");

    let p = Project::from_folder(&f, &Settings::default(), FakeSpawner::new());
    assert_eq!(p.name(), "");
}

#[test]
fn mapping_overrides_by_folder_index() {
    let mapping = vec!["".to_string(), "custom".to_string()];

    assert_eq!(project_name(&folder(0, "first"), &mapping), "first");
    assert_eq!(project_name(&folder(1, "second"), &mapping), "custom");
    assert_eq!(project_name(&folder(2, "third"), &mapping), "third");
}

#[test]
fn mapping_is_used_verbatim() {
    let mapping = vec!["Not Sanitized!".to_string()];
    assert_eq!(project_name(&folder(0, "x"), &mapping), "Not Sanitized!");
}

#[test]
fn from_folder_applies_settings() {
    let spawner = FakeSpawner::new();
    let settings = Settings {
        project_names: vec!["prod".to_string()],
        files: vec!["a.yml".to_string()],
        compose_command: "docker-compose".to_string(),
        docker_command: "podman".to_string(),
        log_tail: Some(200),
        ..Settings::default()
    };
    let p = Project::from_folder(&folder(0, "shop"), &settings, spawner.clone());

    assert_eq!(p.name(), "prod");
    assert_eq!(p.log_tail(), Some(200));

    p.up().unwrap();
    let spec = &spawner.spawned()[0];
    assert_eq!(spec.program, "docker-compose");
    assert_eq!(spec.args, ["-p", "prod", "-f", "a.yml", "up", "-d"]);
    assert_eq!(spec.cwd, PathBuf::from("/work/shop"));
    assert_eq!(p.docker().command(["ps"]).program, "podman");
}

#[test]
fn services_come_from_compose_config() {
    let rt = runtime();
    let spawner = FakeSpawner::new();
    spawner.on_output("config --services", "web\ndb\n");
    let p = project("shop", spawner);

    let services = rt.block_on(p.services()).unwrap();
    let names = services.iter().map(|s| s.name()).collect::<Vec<_>>();
    assert_eq!(names, ["web", "db"]);
    assert_eq!(services[0].project().name(), "shop");
}

#[test]
fn service_containers_drop_other_services() {
    let rt = runtime();
    let spawner = FakeSpawner::new();
    spawner.on_output("ps --all", &format!("{}\n{}", WEB_PS, DB_PS));
    let p = project("shop", spawner.clone());
    let web = Service::new("web".to_string(), p);

    let containers = rt.block_on(web.containers()).unwrap();
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].service(), "web");
    assert_eq!(
        spawner.outputs()[0].args.last().map(String::as_str),
        Some("web")
    );
}

#[test]
fn service_attach_follows_logs() {
    let spawner = FakeSpawner::new();
    let web = Service::new("web".to_string(), project("shop", spawner.clone()));

    web.attach().unwrap();
    web.shell().unwrap();

    // compose -p shop -f docker-compose.yml <args>
    let calls = spawner.interactive_calls();
    assert_eq!(calls[0].args[5..], ["logs", "--follow", "web"]);
    assert_eq!(calls[1].args[5..], ["exec", "web", "/bin/sh"]);
}
