//! Docker Compose services.

use serde::Serialize;
use serde_json::{json, Value};

use super::{expect_str, insert_opt, merge, service_target, to_params};
use crate::error::Result;
use crate::rpc::Params;
use crate::validation::{validate_project_name, validate_required, validate_required_field};

/// Git source of a compose stack.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeGitSource<'a> {
    pub repo: &'a str,
    #[serde(rename = "ref")]
    pub git_ref: &'a str,
    pub root_path: &'a str,
    pub compose_file: &'a str,
}

resource!(
    /// `services.compose.*` procedures.
    ServicesCompose
);

impl ServicesCompose {
    fn action(&self, procedure: &'static str, project: &str, service: &str) -> Result<Value> {
        self.client.post(procedure, service_target(project, service)?)
    }

    pub fn inspect_service(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .get("services.compose.inspectService", service_target(project, service)?)
    }

    pub fn get_docker_services(
        &self,
        project: Option<&str>,
        service: Option<&str>,
    ) -> Result<Value> {
        let mut params = Params::new();
        insert_opt(&mut params, "projectName", project);
        insert_opt(&mut params, "serviceName", service);
        self.client.get("services.compose.getDockerServices", params)
    }

    pub fn get_issues(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .get("services.compose.getIssues", service_target(project, service)?)
    }

    /// `service` must carry `projectName` and `serviceName`.
    pub fn create_service(&self, service: Params) -> Result<Value> {
        validate_required(&service, &["projectName", "serviceName"])?;
        validate_project_name(expect_str(&service, "projectName")?)?;
        self.client.post("services.compose.createService", service)
    }

    /// Replaces the stack's environment. `create_dot_env` is only sent when
    /// given.
    pub fn update_env(
        &self,
        project: &str,
        service: &str,
        env: &str,
        create_dot_env: Option<bool>,
    ) -> Result<Value> {
        let mut params = service_target(project, service)?;
        params.insert("env".to_string(), json!(env));
        insert_opt(&mut params, "createDotEnv", create_dot_env);
        self.client.post("services.compose.updateEnv", params)
    }

    pub fn refresh_deploy_token(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.compose.refreshDeployToken", project, service)
    }

    pub fn update_source_inline(
        &self,
        project: &str,
        service: &str,
        content: &str,
    ) -> Result<Value> {
        let mut params = service_target(project, service)?;
        params.insert("content".to_string(), json!(content));
        self.client.post("services.compose.updateSourceInline", params)
    }

    pub fn update_source_git(
        &self,
        project: &str,
        service: &str,
        source: &ComposeGitSource<'_>,
    ) -> Result<Value> {
        validate_required_field(Some(source.repo), "repo")?;
        let target = service_target(project, service)?;
        self.client
            .post("services.compose.updateSourceGit", merge(target, to_params(source)?))
    }

    pub fn update_redirects(
        &self,
        project: &str,
        service: &str,
        redirects: Option<Value>,
    ) -> Result<Value> {
        let mut params = service_target(project, service)?;
        insert_opt(&mut params, "redirects", redirects);
        self.client.post("services.compose.updateRedirects", params)
    }

    pub fn update_basic_auth(
        &self,
        project: &str,
        service: &str,
        basic_auth: Option<Value>,
    ) -> Result<Value> {
        let mut params = service_target(project, service)?;
        insert_opt(&mut params, "basicAuth", basic_auth);
        self.client.post("services.compose.updateBasicAuth", params)
    }

    pub fn update_maintenance(
        &self,
        project: &str,
        service: &str,
        maintenance: Params,
    ) -> Result<Value> {
        let mut params = service_target(project, service)?;
        params.insert("maintenance".to_string(), Value::Object(maintenance));
        self.client.post("services.compose.updateMaintenance", params)
    }

    pub fn deploy_service(
        &self,
        project: &str,
        service: &str,
        force_rebuild: bool,
    ) -> Result<Value> {
        let mut params = service_target(project, service)?;
        params.insert("forceRebuild".to_string(), json!(force_rebuild));
        self.client.post("services.compose.deployService", params)
    }

    pub fn destroy_service(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.compose.destroyService", project, service)
    }

    pub fn start_service(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.compose.startService", project, service)
    }

    pub fn stop_service(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.compose.stopService", project, service)
    }

    pub fn restart_service(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.compose.restartService", project, service)
    }
}
