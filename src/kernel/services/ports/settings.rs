use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";
pub const DEFAULT_SHELL: &str = "/bin/sh";
pub const DEFAULT_AUTO_REFRESH_MS: u64 = 90_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Project name override, indexed by workspace folder position.
    pub project_names: Vec<String>,
    pub files: Vec<String>,
    pub shell: String,
    /// Milliseconds between automatic refreshes; `0` turns the timer off.
    pub auto_refresh_interval: u64,
    pub docker_command: String,
    pub compose_command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_tail: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_names: Vec::new(),
            files: vec![DEFAULT_COMPOSE_FILE.to_string()],
            shell: DEFAULT_SHELL.to_string(),
            auto_refresh_interval: DEFAULT_AUTO_REFRESH_MS,
            docker_command: "docker".to_string(),
            compose_command: "docker compose".to_string(),
            log_tail: None,
        }
    }
}

impl Settings {
    /// `compose_command` split into program + leading args (`docker compose` → `docker`, `compose`).
    pub fn compose_program(&self) -> (String, Vec<String>) {
        let mut parts = self.compose_command.split_whitespace().map(str::to_string);
        match parts.next() {
            Some(program) => (program, parts.collect()),
            None => ("docker".to_string(), vec!["compose".to_string()]),
        }
    }

    pub fn docker_program(&self) -> String {
        let program = self.docker_command.trim();
        if program.is_empty() {
            "docker".to_string()
        } else {
            program.to_string()
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
