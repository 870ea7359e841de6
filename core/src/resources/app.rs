//! App services: source, build, deploy and runtime settings.

use serde_json::{json, Value};

use super::{bag, check_resource_limits, merge, service_target, str_field};
use crate::error::Result;
use crate::rpc::Params;
use crate::validation::{validate_project_name, validate_required_field};

resource!(
    /// `services.app.*` procedures.
    ServicesApp
);

impl ServicesApp {
    fn action(&self, procedure: &'static str, project: &str, service: &str) -> Result<Value> {
        self.client.post(procedure, service_target(project, service)?)
    }

    fn update(
        &self,
        procedure: &'static str,
        project: &str,
        service: &str,
        data: Params,
    ) -> Result<Value> {
        let target = service_target(project, service)?;
        self.client.patch(procedure, merge(target, data))
    }

    pub fn inspect_service(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .get("services.app.inspectService", service_target(project, service)?)
    }

    pub fn get_exposed_ports(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .get("services.app.getExposedPorts", service_target(project, service)?)
    }

    /// `service` must carry the new service's `name`.
    pub fn create_service(&self, project: &str, service: Params) -> Result<Value> {
        validate_project_name(project)?;
        validate_required_field(str_field(&service, "name"), "name")?;
        self.client.post(
            "services.app.createService",
            merge(bag([("projectName", json!(project))]), service),
        )
    }

    pub fn update_deploy(&self, project: &str, service: &str, deploy: Params) -> Result<Value> {
        self.update("services.app.updateDeploy", project, service, deploy)
    }

    /// String limits (`memoryLimit`, `cpuLimit`, ...) must use the panel's
    /// notation, e.g. `512M` or `0.5`.
    pub fn update_resources(
        &self,
        project: &str,
        service: &str,
        resources: Params,
    ) -> Result<Value> {
        check_resource_limits(&resources)?;
        self.update("services.app.updateResources", project, service, resources)
    }

    pub fn update_env(&self, project: &str, service: &str, env: Params) -> Result<Value> {
        self.update("services.app.updateEnv", project, service, env)
    }

    pub fn update_basic_auth(&self, project: &str, service: &str, auth: Params) -> Result<Value> {
        self.update("services.app.updateBasicAuth", project, service, auth)
    }

    pub fn update_redirects(
        &self,
        project: &str,
        service: &str,
        redirects: Params,
    ) -> Result<Value> {
        self.update("services.app.updateRedirects", project, service, redirects)
    }

    pub fn update_source_github(
        &self,
        project: &str,
        service: &str,
        source: Params,
    ) -> Result<Value> {
        self.update("services.app.updateSourceGithub", project, service, source)
    }

    pub fn update_source_git(&self, project: &str, service: &str, source: Params) -> Result<Value> {
        self.update("services.app.updateSourceGit", project, service, source)
    }

    pub fn update_source_image(
        &self,
        project: &str,
        service: &str,
        image: Params,
    ) -> Result<Value> {
        self.update("services.app.updateSourceImage", project, service, image)
    }

    pub fn update_source_dockerfile(
        &self,
        project: &str,
        service: &str,
        dockerfile: Params,
    ) -> Result<Value> {
        self.update("services.app.updateSourceDockerfile", project, service, dockerfile)
    }

    pub fn update_build(&self, project: &str, service: &str, build: Params) -> Result<Value> {
        self.update("services.app.updateBuild", project, service, build)
    }

    pub fn update_maintenance(
        &self,
        project: &str,
        service: &str,
        maintenance: Params,
    ) -> Result<Value> {
        self.update("services.app.updateMaintenance", project, service, maintenance)
    }

    pub fn enable_github_deploy(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.app.enableGithubDeploy", project, service)
    }

    pub fn disable_github_deploy(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.app.disableGithubDeploy", project, service)
    }

    pub fn refresh_deploy_token(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.app.refreshDeployToken", project, service)
    }

    pub fn deploy_service(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.app.deployService", project, service)
    }

    pub fn start_service(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.app.startService", project, service)
    }

    pub fn stop_service(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.app.stopService", project, service)
    }

    pub fn restart_service(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.app.restartService", project, service)
    }

    pub fn destroy_service(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .delete("services.app.destroyService", service_target(project, service)?)
    }

    /// `archive` carries the upload descriptor returned by the panel.
    pub fn upload_code_archive(
        &self,
        project: &str,
        service: &str,
        archive: Params,
    ) -> Result<Value> {
        let target = service_target(project, service)?;
        self.client
            .post("services.app.uploadCodeArchive", merge(target, archive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::HttpMethod;
    use crate::testing::{bag as json_bag, last_call, recording_client};

    #[test]
    fn create_service_prefixes_project_name() {
        let (transport, client) = recording_client();
        ServicesApp::new(client)
            .create_service("shop", json_bag(json!({"name": "web", "image": "nginx"})))
            .unwrap();
        let (procedure, params) = last_call(&transport);
        assert_eq!(procedure, "services.app.createService");
        let keys: Vec<_> = params.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["projectName", "name", "image"]);
    }

    #[test]
    fn create_service_requires_name() {
        let (transport, client) = recording_client();
        let err = ServicesApp::new(client)
            .create_service("shop", json_bag(json!({"image": "nginx"})))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn updates_use_patch_and_actions_use_post() {
        let (transport, client) = recording_client();
        let app = ServicesApp::new(client);
        app.update_env("shop", "web", json_bag(json!({"env": "A=1"})))
            .unwrap();
        assert_eq!(transport.last_request().method, HttpMethod::Patch);
        assert_eq!(
            last_call(&transport).1,
            json!({"projectName": "shop", "serviceName": "web", "env": "A=1"})
        );

        app.deploy_service("shop", "web").unwrap();
        assert_eq!(transport.last_request().method, HttpMethod::Post);
        app.destroy_service("shop", "web").unwrap();
        assert_eq!(transport.last_request().method, HttpMethod::Delete);
    }

    #[test]
    fn update_resources_checks_limits() {
        let (transport, client) = recording_client();
        let app = ServicesApp::new(client);
        let err = app
            .update_resources("shop", "web", json_bag(json!({"memoryLimit": "1.5GB"})))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(transport.requests().is_empty());
        let limits = json_bag(json!({"memoryLimit": "1G", "cpuLimit": "0.5"}));
        app.update_resources("shop", "web", limits).unwrap();
        assert_eq!(last_call(&transport).0, "services.app.updateResources");
    }
}
