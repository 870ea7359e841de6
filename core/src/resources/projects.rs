use serde_json::{json, Value};

use super::{bag, expect_str, merge};
use crate::error::Result;
use crate::rpc::Params;
use crate::validation::{validate_project_name, validate_required, validate_required_field};

resource!(
    /// `projects.*` procedures.
    Projects
);

impl Projects {
    pub fn list_projects(&self) -> Result<Value> {
        self.client.get("projects.listProjects", Params::new())
    }

    pub fn list_projects_and_services(&self) -> Result<Value> {
        self.client
            .get("projects.listProjectsAndServices", Params::new())
    }

    pub fn inspect_project(&self, project_name: &str) -> Result<Value> {
        validate_project_name(project_name)?;
        self.client.get(
            "projects.inspectProject",
            bag([("projectName", json!(project_name))]),
        )
    }

    /// Containers backing one service, keyed by its Docker service name.
    pub fn get_docker_containers(&self, service: &str) -> Result<Value> {
        validate_required_field(Some(service), "service")?;
        self.client
            .get("projects.getDockerContainers", bag([("service", json!(service))]))
    }

    /// `project` must carry a `name` in identifier format.
    pub fn create_project(&self, project: Params) -> Result<Value> {
        validate_required(&project, &["name"])?;
        validate_project_name(expect_str(&project, "name")?)?;
        self.client.post("projects.createProject", project)
    }

    pub fn update_project(&self, project_name: &str, changes: Params) -> Result<Value> {
        validate_project_name(project_name)?;
        self.client.patch(
            "projects.updateProject",
            merge(bag([("projectName", json!(project_name))]), changes),
        )
    }

    pub fn delete_project(&self, project_name: &str) -> Result<Value> {
        validate_project_name(project_name)?;
        self.client.delete(
            "projects.deleteProject",
            bag([("projectName", json!(project_name))]),
        )
    }
}
