//! Box services: language runtimes (PHP, Node.js, Python, Ruby) behind
//! nginx, with a deploy script and long-running processes.

use serde_json::{json, Value};

use super::service_target;
use crate::error::Result;
use crate::rpc::Params;
use crate::validation::validate_required_field;

code_service!(
    /// `services.box.*` procedures.
    ServicesBox,
    "box"
);

impl ServicesBox {
    /// Presets a box can be loaded from.
    pub fn list_presets(&self) -> Result<Value> {
        self.client.get("services.box.listPresets", Params::new())
    }

    pub fn load_preset(&self, project: &str, service: &str, preset_key: &str) -> Result<Value> {
        validate_required_field(Some(preset_key), "presetKey")?;
        let mut params = service_target(project, service)?;
        params.insert("presetKey".to_string(), json!(preset_key));
        self.client.post("services.box.loadPreset", params)
    }

    /// Replaces the supervised processes.
    pub fn update_processes(
        &self,
        project: &str,
        service: &str,
        processes: Vec<Value>,
    ) -> Result<Value> {
        self.with_list("services.box.updateProcesses", (project, service), "processes", processes)
    }

    pub fn refresh_deploy_token(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.box.refreshDeployToken", project, service)
    }

    pub fn update_deploy_script(
        &self,
        project: &str,
        service: &str,
        deployment: Params,
    ) -> Result<Value> {
        let mut params = service_target(project, service)?;
        params.insert("deployment".to_string(), Value::Object(deployment));
        self.client.post("services.box.updateDeployScript", params)
    }

    /// Runs the deploy script now.
    pub fn run_deploy_script(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.box.runDeployScript", project, service)
    }

    pub fn update_modules(&self, project: &str, service: &str, modules: Params) -> Result<Value> {
        let mut params = service_target(project, service)?;
        params.insert("modules".to_string(), Value::Object(modules));
        self.client.post("services.box.updateModules", params)
    }

    pub fn update_advanced(
        &self,
        project: &str,
        service: &str,
        advanced: Option<Params>,
    ) -> Result<Value> {
        self.with_section("services.box.updateAdvanced", (project, service), "advanced", advanced)
    }

    pub fn update_nodejs(
        &self,
        project: &str,
        service: &str,
        nodejs: Option<Params>,
    ) -> Result<Value> {
        self.with_section("services.box.updateNodejs", (project, service), "nodejs", nodejs)
    }

    pub fn update_python(
        &self,
        project: &str,
        service: &str,
        python: Option<Params>,
    ) -> Result<Value> {
        self.with_section("services.box.updatePython", (project, service), "python", python)
    }

    pub fn update_ruby(&self, project: &str, service: &str, ruby: Option<Params>) -> Result<Value> {
        self.with_section("services.box.updateRuby", (project, service), "ruby", ruby)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::HttpMethod;
    use crate::testing::{bag as json_bag, last_call, recording_client};

    #[test]
    fn shared_procedures_use_the_box_namespace() {
        let (transport, client) = recording_client();
        let boxes = ServicesBox::new(client);

        boxes.inspect_service("shop", "api").unwrap();
        assert_eq!(transport.last_request().method, HttpMethod::Get);
        assert_eq!(last_call(&transport).0, "services.box.inspectService");

        boxes.restart_service("shop", "api").unwrap();
        assert_eq!(transport.last_request().method, HttpMethod::Post);
        assert_eq!(
            last_call(&transport),
            (
                "services.box.restartService".to_string(),
                json!({"projectName": "shop", "serviceName": "api"})
            )
        );
    }

    #[test]
    fn init_service_sends_git_only_when_given() {
        let (transport, client) = recording_client();
        let boxes = ServicesBox::new(client);

        boxes.init_service("shop", "api", None, true).unwrap();
        assert_eq!(
            last_call(&transport).1,
            json!({"projectName": "shop", "serviceName": "api", "private": true})
        );

        let git = json_bag(json!({"repo": "https://github.com/acme/api", "branch": "main"}));
        boxes.init_service("shop", "api", Some(git), false).unwrap();
        let (_, params) = last_call(&transport);
        assert_eq!(params["private"], false);
        assert_eq!(params["git"]["branch"], "main");
    }

    #[test]
    fn runtime_sections_are_optional() {
        let (transport, client) = recording_client();
        let boxes = ServicesBox::new(client);

        boxes.update_php("shop", "api", None).unwrap();
        assert_eq!(
            last_call(&transport),
            (
                "services.box.updatePhp".to_string(),
                json!({"projectName": "shop", "serviceName": "api"})
            )
        );

        let ruby = json_bag(json!({"enabled": true, "version": "3.3"}));
        boxes.update_ruby("shop", "api", Some(ruby)).unwrap();
        assert_eq!(
            last_call(&transport).1,
            json!({
                "projectName": "shop",
                "serviceName": "api",
                "ruby": {"enabled": true, "version": "3.3"}
            })
        );
    }

    #[test]
    fn processes_and_scripts_are_sent_as_lists() {
        let (transport, client) = recording_client();
        let boxes = ServicesBox::new(client);

        boxes
            .update_processes("shop", "api", vec![json!({"name": "worker", "command": "php q"})])
            .unwrap();
        let (procedure, params) = last_call(&transport);
        assert_eq!(procedure, "services.box.updateProcesses");
        assert_eq!(params["processes"][0]["name"], "worker");

        boxes.update_scripts("shop", "api", Vec::new()).unwrap();
        assert_eq!(last_call(&transport).1["scripts"], json!([]));
    }

    #[test]
    fn presets() {
        let (transport, client) = recording_client();
        let boxes = ServicesBox::new(client);

        boxes.list_presets().unwrap();
        let request = transport.last_request();
        assert!(request.url.ends_with("/api/trpc/services.box.listPresets"));

        let err = boxes.load_preset("shop", "api", "").unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("presetKey"));
        boxes.load_preset("shop", "api", "laravel").unwrap();
        assert_eq!(last_call(&transport).1["presetKey"], "laravel");
    }

    #[test]
    fn create_service_checks_the_project_name() {
        let (transport, client) = recording_client();
        let boxes = ServicesBox::new(client);

        let err = boxes
            .create_service(json_bag(json!({"projectName": "Shop", "serviceName": "api"})))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(boxes
            .create_service(json_bag(json!({"serviceName": "api"})))
            .is_err());
        assert!(transport.requests().is_empty());

        boxes
            .create_service(json_bag(json!({"projectName": "shop", "serviceName": "api"})))
            .unwrap();
        assert_eq!(last_call(&transport).0, "services.box.createService");
    }

    #[test]
    fn git_identity_and_limits_are_validated() {
        let (transport, client) = recording_client();
        let boxes = ServicesBox::new(client);

        assert!(boxes
            .update_git_config("shop", "api", "Deploy Bot", "not-an-email")
            .is_err());
        assert!(boxes
            .update_resources("shop", "api", json_bag(json!({"memoryLimit": "lots"})))
            .is_err());
        assert!(transport.requests().is_empty());

        boxes
            .update_resources("shop", "api", json_bag(json!({"memoryLimit": "512M"})))
            .unwrap();
        assert_eq!(last_call(&transport).1["resources"]["memoryLimit"], "512M");
    }
}
