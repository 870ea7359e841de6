//! Cross-type service inspection and the operations every service type
//! shares.

use serde_json::{json, Value};

use super::{bag, insert_opt, service_target};
use crate::error::Result;
use crate::rpc::Params;
use crate::validation::{validate_project_name, validate_required_field, validate_wordpress_stage};

resource!(
    /// Read-only views over services of every type.
    Services
);

impl Services {
    fn inspect(&self, procedure: &'static str, project: &str, service: &str) -> Result<Value> {
        self.client.get(procedure, service_target(project, service)?)
    }

    pub fn get_service_error(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.common.getServiceError", project, service)
    }

    pub fn get_notes(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.common.getNotes", project, service)
    }

    pub fn inspect_app_service(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.app.inspectService", project, service)
    }

    pub fn get_exposed_ports(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.app.getExposedPorts", project, service)
    }

    pub fn inspect_mariadb_service(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.mariadb.inspectService", project, service)
    }

    pub fn inspect_mongo_service(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.mongo.inspectService", project, service)
    }

    pub fn inspect_mysql_service(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.mysql.inspectService", project, service)
    }

    pub fn inspect_postgres_service(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.postgres.inspectService", project, service)
    }

    pub fn inspect_redis_service(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.redis.inspectService", project, service)
    }

    pub fn inspect_wordpress_service(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.wordpress.inspectService", project, service)
    }

    /// WordPress profiler output for `stage` (`bootstrap`, `main_query` or
    /// `template`).
    pub fn get_wordpress_profile(
        &self,
        project: &str,
        service: &str,
        stage: &str,
    ) -> Result<Value> {
        validate_wordpress_stage(stage)?;
        let mut params = service_target(project, service)?;
        params.insert("stage".to_string(), json!(stage));
        self.client.get("services.wordpress.getProfile", params)
    }

    pub fn inspect_box_service(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.box.inspectService", project, service)
    }

    pub fn list_box_presets(&self) -> Result<Value> {
        self.client.get("services.box.listPresets", Params::new())
    }

    pub fn inspect_compose_service(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.compose.inspectService", project, service)
    }

    pub fn get_docker_services(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.compose.getDockerServices", project, service)
    }

    pub fn get_compose_issues(&self, project: &str, service: &str) -> Result<Value> {
        self.inspect("services.compose.getIssues", project, service)
    }
}

resource!(
    /// `services.common.*` procedures.
    ServicesCommon
);

impl ServicesCommon {
    pub fn get_service_error(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .get("services.common.getServiceError", service_target(project, service)?)
    }

    pub fn get_notes(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .get("services.common.getNotes", service_target(project, service)?)
    }

    /// Moves a service, possibly into another project.
    pub fn rename(
        &self,
        old_project: &str,
        old_service: &str,
        new_project: &str,
        new_service: &str,
    ) -> Result<Value> {
        validate_project_name(old_project)?;
        validate_project_name(new_project)?;
        validate_required_field(Some(old_service), "oldServiceName")?;
        validate_required_field(Some(new_service), "newServiceName")?;
        self.client.post(
            "services.common.rename",
            bag([
                ("oldProjectName", json!(old_project)),
                ("oldServiceName", json!(old_service)),
                ("newProjectName", json!(new_project)),
                ("newServiceName", json!(new_service)),
            ]),
        )
    }

    /// `None` clears the notes.
    pub fn set_notes(&self, project: &str, service: &str, notes: Option<&str>) -> Result<Value> {
        let mut params: Params = service_target(project, service)?;
        params.insert("notes".to_string(), json!(notes.unwrap_or_default()));
        self.client.post("services.common.setNotes", params)
    }

    /// Lists Docker services, optionally narrowed to a project or a single
    /// service.
    pub fn list_docker_services(
        &self,
        project: Option<&str>,
        service: Option<&str>,
    ) -> Result<Value> {
        let mut params = Params::new();
        if let Some(project) = project {
            validate_project_name(project)?;
        }
        insert_opt(&mut params, "projectName", project);
        insert_opt(&mut params, "serviceName", service);
        self.client.get("services.compose.getDockerServices", params)
    }
}
