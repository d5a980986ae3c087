//! Docker Compose 领域对象：项目、服务、容器及其执行器。

pub mod container;
pub mod executor;
pub mod project;
pub mod service;

pub use container::{parse_ps_json, Container, ContainerState, PsEntry};
pub use executor::{ComposeExecutor, ComposeExecutorConfig, ComposeVerb, DockerExecutor};
pub use project::{project_name, Project, WorkspaceFolder};
pub use service::Service;
