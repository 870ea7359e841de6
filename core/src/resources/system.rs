//! Panel-wide operations: monitoring, settings, cluster membership, updates,
//! first-run setup, builders, action history, deploy keys, templates and
//! branding.

use serde_json::{json, Value};

use super::{bag, insert_opt, service_target};
use crate::error::{Error, Result};
use crate::rpc::Params;
use crate::validation::{
    validate_domain_name, validate_email, validate_required_field, validate_url,
};

resource!(
    /// `monitor.*` procedures.
    Monitor
);

impl Monitor {
    pub fn get_system_stats(&self) -> Result<Value> {
        self.client.get("monitor.getSystemStats", Params::new())
    }

    pub fn get_storage_stats(&self) -> Result<Value> {
        self.client.get("monitor.getStorageStats", Params::new())
    }

    pub fn get_advanced_stats(&self) -> Result<Value> {
        self.client.get("monitor.getAdvancedStats", Params::new())
    }

    pub fn get_service_stats(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .get("monitor.getServiceStats", service_target(project, service)?)
    }

    pub fn get_docker_task_stats(&self) -> Result<Value> {
        self.client.get("monitor.getDockerTaskStats", Params::new())
    }

    pub fn get_monitor_table_data(&self) -> Result<Value> {
        self.client.get("monitor.getMonitorTableData", Params::new())
    }
}

resource!(
    /// `settings.*` procedures.
    PanelSettings
);

impl PanelSettings {
    pub fn get_github_token(&self) -> Result<Value> {
        self.client.get("settings.getGithubToken", Params::new())
    }

    pub fn get_daily_docker_cleanup(&self) -> Result<Value> {
        self.client.get("settings.getDailyDockerCleanup", Params::new())
    }

    pub fn get_lets_encrypt_email(&self) -> Result<Value> {
        self.client.get("settings.getLetsEncryptEmail", Params::new())
    }

    pub fn get_panel_domain(&self) -> Result<Value> {
        self.client.get("settings.getPanelDomain", Params::new())
    }

    pub fn get_server_ip(&self) -> Result<Value> {
        self.client.get("settings.getServerIp", Params::new())
    }

    pub fn get_demo_mode(&self) -> Result<Value> {
        self.client.get("settings.getDemoMode", Params::new())
    }

    pub fn get_google_analytics_measurement_id(&self) -> Result<Value> {
        self.client
            .get("settings.getGoogleAnalyticsMeasurementId", Params::new())
    }

    pub fn check_for_updates(&self) -> Result<Value> {
        self.client.get("settings.checkForUpdates", Params::new())
    }

    pub fn set_github_token(&self, token: &str) -> Result<Value> {
        self.client
            .post("settings.setGithubToken", bag([("token", json!(token))]))
    }

    pub fn set_daily_docker_cleanup(&self, enabled: bool) -> Result<Value> {
        self.client.post(
            "settings.setDailyDockerCleanup",
            bag([("enabled", json!(enabled))]),
        )
    }

    pub fn set_lets_encrypt_email(&self, email: &str) -> Result<Value> {
        validate_email(email)?;
        self.client
            .post("settings.setLetsEncryptEmail", bag([("email", json!(email))]))
    }

    pub fn set_panel_domain(&self, domain: &str) -> Result<Value> {
        validate_domain_name(domain)?;
        self.client
            .post("settings.setPanelDomain", bag([("domain", json!(domain))]))
    }

    pub fn set_google_analytics_measurement_id(&self, measurement_id: &str) -> Result<Value> {
        self.client.post(
            "settings.setGoogleAnalyticsMeasurementId",
            bag([("measurementId", json!(measurement_id))]),
        )
    }

    pub fn restart_easypanel(&self) -> Result<Value> {
        self.client.post("settings.restartEasypanel", Params::new())
    }

    pub fn cleanup_docker_images(&self) -> Result<Value> {
        self.client.post("settings.cleanupDockerImages", Params::new())
    }

    pub fn cleanup_docker_builder(&self) -> Result<Value> {
        self.client.post("settings.cleanupDockerBuilder", Params::new())
    }

    pub fn system_prune(&self) -> Result<Value> {
        self.client.post("settings.systemPrune", Params::new())
    }

    pub fn change_credentials(&self, credentials: Params) -> Result<Value> {
        self.client.post("settings.changeCredentials", credentials)
    }

    pub fn refresh_server_ip(&self) -> Result<Value> {
        self.client.post("settings.refreshServerIp", Params::new())
    }
}

resource!(
    /// `cluster.*` procedures.
    Cluster
);

impl Cluster {
    pub fn list_nodes(&self) -> Result<Value> {
        self.client.get("cluster.listNodes", Params::new())
    }

    /// The `docker swarm join` command for a new worker.
    pub fn add_worker_command(&self) -> Result<Value> {
        self.client.get("cluster.addWorkerCommand", Params::new())
    }

    pub fn remove_node(&self, node_id: &str) -> Result<Value> {
        validate_required_field(Some(node_id), "id")?;
        self.client
            .post("cluster.removeNode", bag([("id", json!(node_id))]))
    }
}

resource!(Server);

impl Server {
    pub fn reboot(&self) -> Result<Value> {
        self.client.post("server.reboot", Params::new())
    }
}

resource!(
    /// `update.*` procedures.
    Update
);

impl Update {
    pub fn get_status(&self) -> Result<Value> {
        self.client.get("update.getStatus", Params::new())
    }

    pub fn update(&self) -> Result<Value> {
        self.client.post("update.update", Params::new())
    }
}

/// Answers to the first-run form.
#[derive(Debug, Clone)]
pub struct SetupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub subscribe: bool,
    /// Where the admin heard about the panel.
    pub source: &'a str,
    pub terms: bool,
}

resource!(
    /// `setup.*` procedures.
    Setup
);

impl Setup {
    pub fn get_status(&self) -> Result<Value> {
        self.client.get("setup.getStatus", Params::new())
    }

    pub fn setup(&self, request: &SetupRequest<'_>) -> Result<Value> {
        validate_email(request.email)?;
        validate_required_field(Some(request.password), "password")?;
        self.client.post(
            "setup.setup",
            bag([
                ("email", json!(request.email)),
                ("password", json!(request.password)),
                ("subscribe", json!(request.subscribe)),
                ("source", json!(request.source)),
                ("terms", json!(request.terms)),
            ]),
        )
    }
}

resource!(Subscription);

impl Subscription {
    pub fn on_invalidate_actions(&self) -> Result<Value> {
        self.client
            .post("subscription.onInvalidateActions", Params::new())
    }
}

/// Builder limits are optional, but when given they must be positive and
/// swap may not undercut memory.
fn validate_docker_builder(builder: &Params) -> Result<()> {
    validate_required_field(builder.get("name").and_then(Value::as_str), "name")?;

    let positive = |key: &str, message: &str| -> Result<Option<f64>> {
        match builder.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => match as_number(value) {
                Some(n) if n > 0.0 => Ok(Some(n)),
                _ => Err(Error::invalid_field(key, message)),
            },
        }
    };
    let memory = positive("memory", "Memory must be a positive number (in MB)")?;
    let swap = positive("memorySwap", "Memory swap must be a positive number (in MB)")?;
    positive("cpus", "CPUs must be a positive number")?;

    if let (Some(memory), Some(swap)) = (memory, swap) {
        if swap < memory {
            return Err(Error::invalid_field(
                "memorySwap",
                "Memory swap cannot be less than memory allocation",
            ));
        }
    }
    Ok(())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

resource!(
    /// `dockerBuilders.*` procedures.
    DockerBuilders
);

impl DockerBuilders {
    fn by_name(&self, procedure: &'static str, name: &str) -> Result<Value> {
        validate_required_field(Some(name), "name")?;
        self.client.post(procedure, bag([("name", json!(name))]))
    }

    pub fn list_docker_builders(&self) -> Result<Value> {
        self.client
            .get("dockerBuilders.listDockerBuilders", Params::new())
    }

    pub fn create_docker_builder(&self, builder: Params) -> Result<Value> {
        validate_docker_builder(&builder)?;
        self.client
            .post("dockerBuilders.createDockerBuilder", builder)
    }

    pub fn use_docker_builder(&self, name: &str) -> Result<Value> {
        self.by_name("dockerBuilders.useDockerBuilder", name)
    }

    pub fn stop_docker_builder(&self, name: &str) -> Result<Value> {
        self.by_name("dockerBuilders.stopDockerBuilder", name)
    }

    pub fn remove_docker_builder(&self, name: &str) -> Result<Value> {
        self.by_name("dockerBuilders.removeDockerBuilder", name)
    }
}

/// Page size the panel UI uses for action history.
pub const DEFAULT_ACTIONS_LIMIT: u32 = 8;

resource!(
    /// `actions.*` procedures: deploy and build history.
    Actions
);

impl Actions {
    pub fn list_actions(
        &self,
        project: &str,
        service: &str,
        action_type: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Value> {
        let mut params = service_target(project, service)?;
        params.insert(
            "limit".to_string(),
            json!(limit.unwrap_or(DEFAULT_ACTIONS_LIMIT)),
        );
        insert_opt(&mut params, "type", action_type);
        self.client.get("actions.listActions", params)
    }

    pub fn get_action(&self, action_id: &str) -> Result<Value> {
        validate_required_field(Some(action_id), "id")?;
        self.client
            .get("actions.getAction", bag([("id", json!(action_id))]))
    }

    pub fn kill_action(&self, action_id: &str) -> Result<Value> {
        validate_required_field(Some(action_id), "id")?;
        self.client
            .post("actions.killAction", bag([("id", json!(action_id))]))
    }
}

resource!(
    /// `git.*` procedures: per-service deploy keys.
    Git
);

impl Git {
    pub fn get_public_key(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .get("git.getPublicKey", service_target(project, service)?)
    }

    pub fn generate_key(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .post("git.generateKey", service_target(project, service)?)
    }
}

resource!(Templates);

impl Templates {
    /// Creates the services described by a template schema in one go.
    pub fn create_from_schema(&self, schema: Params) -> Result<Value> {
        self.client.post("templates.createFromSchema", schema)
    }
}

/// Switches for the panel's help links.
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenLinks {
    pub documentation: bool,
    pub discord: bool,
    pub feedback: bool,
    pub changelog: bool,
    pub other: bool,
}

/// Logo URLs; unset entries keep their current value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logos<'a> {
    pub light_logo_mark: Option<&'a str>,
    pub dark_logo_mark: Option<&'a str>,
    pub light_logo: Option<&'a str>,
    pub dark_logo: Option<&'a str>,
}

resource!(
    /// `branding.*` procedures.
    Branding
);

impl Branding {
    pub fn get_error_page_settings(&self) -> Result<Value> {
        self.client.get("branding.getErrorPageSettings", Params::new())
    }

    pub fn get_basic_settings(&self) -> Result<Value> {
        self.client.get("branding.getBasicSettings", Params::new())
    }

    pub fn get_logo_settings(&self) -> Result<Value> {
        self.client.get("branding.getLogoSettings", Params::new())
    }

    pub fn get_custom_code_settings(&self) -> Result<Value> {
        self.client.get("branding.getCustomCodeSettings", Params::new())
    }

    pub fn get_links_settings(&self) -> Result<Value> {
        self.client.get("branding.getLinksSettings", Params::new())
    }

    pub fn get_other_links_settings(&self) -> Result<Value> {
        self.client.get("branding.getOtherLinksSettings", Params::new())
    }

    /// Readable without a session; used by the login page.
    pub fn get_interface_settings_public(&self) -> Result<Value> {
        self.client
            .get("branding.getInterfaceSettingsPublic", Params::new())
    }

    pub fn set_error_page_settings(
        &self,
        hide_logo: bool,
        hide_links: bool,
        custom_css: Option<&str>,
    ) -> Result<Value> {
        let mut params = bag([
            ("hideLogo", json!(hide_logo)),
            ("hideLinks", json!(hide_links)),
        ]);
        insert_opt(&mut params, "customCss", custom_css);
        self.client.post("branding.setErrorPageSettings", params)
    }

    pub fn set_basic_settings(
        &self,
        hide_ip: bool,
        hide_notes: bool,
        server_name: &str,
        server_color: &str,
    ) -> Result<Value> {
        self.client.post(
            "branding.setBasicSettings",
            bag([
                ("hideIp", json!(hide_ip)),
                ("hideNotes", json!(hide_notes)),
                ("serverName", json!(server_name)),
                ("serverColor", json!(server_color)),
            ]),
        )
    }

    pub fn set_logo_settings(&self, logos: &Logos<'_>) -> Result<Value> {
        let mut params = Params::new();
        for (key, value) in [
            ("lightLogoMark", logos.light_logo_mark),
            ("darkLogoMark", logos.dark_logo_mark),
            ("lightLogo", logos.light_logo),
            ("darkLogo", logos.dark_logo),
        ] {
            if let Some(url) = value {
                validate_url(url)?;
            }
            insert_opt(&mut params, key, value);
        }
        self.client.post("branding.setLogoSettings", params)
    }

    pub fn set_custom_code_settings(&self, custom_code: Option<&str>) -> Result<Value> {
        let mut params = Params::new();
        insert_opt(&mut params, "customCode", custom_code);
        self.client.post("branding.setCustomCodeSettings", params)
    }

    pub fn set_links_settings(&self, hidden: HiddenLinks) -> Result<Value> {
        self.client.post(
            "branding.setLinksSettings",
            bag([
                ("hideDocumentationLink", json!(hidden.documentation)),
                ("hideDiscordLink", json!(hidden.discord)),
                ("hideFeedbackLink", json!(hidden.feedback)),
                ("hideChangelogLink", json!(hidden.changelog)),
                ("hideOtherLinks", json!(hidden.other)),
            ]),
        )
    }
}
