//! WordPress services.
//!
//! Besides the workspace procedures shared with box services, a WordPress
//! service exposes its site through WP-CLI style calls: users and roles,
//! themes, plugins, options and maintenance tasks.

use serde::Serialize;
use serde_json::{json, Value};

use super::{insert_opt, merge, service_target, to_params};
use crate::error::Result;
use crate::rpc::Params;
use crate::validation::{
    validate_email, validate_project_name, validate_required_field, validate_wordpress_stage,
};

/// Default `autoload` flag for new options.
const DEFAULT_AUTOLOAD: &str = "yes";

/// New site user. Field names are WordPress's own.
#[derive(Debug, Clone, Serialize)]
pub struct WordPressUser<'a> {
    pub user_login: &'a str,
    pub user_email: &'a str,
    pub user_pass: &'a str,
    pub role: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
}

code_service!(
    /// `services.wordpress.*` procedures.
    ServicesWordPress,
    "wordpress"
);

/// Service target plus one required string field.
fn target_with(project: &str, service: &str, key: &str, value: &str) -> Result<Params> {
    validate_required_field(Some(value), key)?;
    let mut params = service_target(project, service)?;
    params.insert(key.to_string(), json!(value));
    Ok(params)
}

impl ServicesWordPress {
    fn read(&self, procedure: &'static str, project: &str, service: &str) -> Result<Value> {
        self.client.get(procedure, service_target(project, service)?)
    }

    pub fn get_users(&self, project: &str, service: &str) -> Result<Value> {
        self.read("services.wordpress.getUsers", project, service)
    }

    pub fn get_roles(&self, project: &str, service: &str) -> Result<Value> {
        self.read("services.wordpress.getRoles", project, service)
    }

    pub fn get_maintenance_mode(&self, project: &str, service: &str) -> Result<Value> {
        self.read("services.wordpress.getMaintenanceMode", project, service)
    }

    pub fn get_themes(&self, project: &str, service: &str) -> Result<Value> {
        self.read("services.wordpress.getThemes", project, service)
    }

    /// Searches the public theme directory.
    pub fn search_theme(&self, project: &str, service: &str, search: &str) -> Result<Value> {
        self.client.get(
            "services.wordpress.searchTheme",
            target_with(project, service, "search", search)?,
        )
    }

    pub fn get_plugins(&self, project: &str, service: &str) -> Result<Value> {
        self.read("services.wordpress.getPlugins", project, service)
    }

    /// Searches the public plugin directory.
    pub fn search_plugin(&self, project: &str, service: &str, search: &str) -> Result<Value> {
        self.client.get(
            "services.wordpress.searchPlugin",
            target_with(project, service, "search", search)?,
        )
    }

    pub fn get_options(&self, project: &str, service: &str) -> Result<Value> {
        self.read("services.wordpress.getOptions", project, service)
    }

    /// Database services in `project` a WordPress site can use. `service`
    /// narrows the answer to one site.
    pub fn get_database_services(&self, project: &str, service: Option<&str>) -> Result<Value> {
        validate_project_name(project)?;
        let mut params = Params::new();
        params.insert("projectName".to_string(), json!(project));
        insert_opt(&mut params, "serviceName", service);
        self.client.get("services.wordpress.getDatabaseServices", params)
    }

    pub fn get_wp_config(&self, project: &str, service: &str) -> Result<Value> {
        self.read("services.wordpress.getWpConfig", project, service)
    }

    /// Profiler output for one request stage: `bootstrap`, `main_query` or
    /// `template`.
    pub fn get_profile(&self, project: &str, service: &str, stage: &str) -> Result<Value> {
        validate_wordpress_stage(stage)?;
        self.client.get(
            "services.wordpress.getProfile",
            target_with(project, service, "stage", stage)?,
        )
    }

    pub fn create_user(&self, project: &str, service: &str, user: &WordPressUser) -> Result<Value> {
        validate_required_field(Some(user.user_login), "user_login")?;
        validate_required_field(Some(user.user_pass), "user_pass")?;
        validate_required_field(Some(user.role), "role")?;
        validate_email(user.user_email)?;
        let target = service_target(project, service)?;
        self.client
            .post("services.wordpress.createUser", merge(target, to_params(user)?))
    }

    /// Applies `changes` (WordPress user fields) to the user with `id`.
    pub fn update_user(
        &self,
        project: &str,
        service: &str,
        id: u64,
        changes: Params,
    ) -> Result<Value> {
        let mut target = service_target(project, service)?;
        target.insert("ID".to_string(), json!(id));
        self.client
            .post("services.wordpress.updateUser", merge(target, changes))
    }

    /// Deletes a user; their content goes to `reassign` when given.
    pub fn delete_user(
        &self,
        project: &str,
        service: &str,
        id: u64,
        reassign: Option<u64>,
    ) -> Result<Value> {
        let mut params = service_target(project, service)?;
        params.insert("ID".to_string(), json!(id));
        insert_opt(&mut params, "reassign", reassign);
        self.client.post("services.wordpress.deleteUser", params)
    }

    /// `capabilities` maps capability names to whether the role has them.
    pub fn create_role(
        &self,
        project: &str,
        service: &str,
        role: &str,
        display_name: &str,
        capabilities: Params,
    ) -> Result<Value> {
        validate_required_field(Some(display_name), "display_name")?;
        let mut params = target_with(project, service, "role", role)?;
        params.insert("display_name".to_string(), json!(display_name));
        params.insert("capabilities".to_string(), Value::Object(capabilities));
        self.client.post("services.wordpress.createRole", params)
    }

    pub fn delete_role(&self, project: &str, service: &str, role: &str) -> Result<Value> {
        self.client.post(
            "services.wordpress.deleteRole",
            target_with(project, service, "role", role)?,
        )
    }

    pub fn update_maintenance_mode(
        &self,
        project: &str,
        service: &str,
        active: bool,
    ) -> Result<Value> {
        let mut params = service_target(project, service)?;
        params.insert("active".to_string(), json!(active));
        self.client
            .post("services.wordpress.updateMaintenanceMode", params)
    }

    pub fn activate_theme(&self, project: &str, service: &str, stylesheet: &str) -> Result<Value> {
        self.client.post(
            "services.wordpress.activateTheme",
            target_with(project, service, "stylesheet", stylesheet)?,
        )
    }

    pub fn install_theme(&self, project: &str, service: &str, slug: &str) -> Result<Value> {
        self.client.post(
            "services.wordpress.installTheme",
            target_with(project, service, "slug", slug)?,
        )
    }

    pub fn activate_plugin(&self, project: &str, service: &str, plugin: &str) -> Result<Value> {
        self.client.post(
            "services.wordpress.activatePlugin",
            target_with(project, service, "plugin", plugin)?,
        )
    }

    pub fn deactivate_plugin(&self, project: &str, service: &str, plugin: &str) -> Result<Value> {
        self.client.post(
            "services.wordpress.deactivatePlugin",
            target_with(project, service, "plugin", plugin)?,
        )
    }

    pub fn install_plugin(&self, project: &str, service: &str, slug: &str) -> Result<Value> {
        self.client.post(
            "services.wordpress.installPlugin",
            target_with(project, service, "slug", slug)?,
        )
    }

    /// Adds an option; `autoload` defaults to `yes`.
    pub fn create_option(
        &self,
        project: &str,
        service: &str,
        name: &str,
        value: &str,
        autoload: Option<&str>,
    ) -> Result<Value> {
        let mut params = target_with(project, service, "option_name", name)?;
        params.insert("option_value".to_string(), json!(value));
        params.insert(
            "autoload".to_string(),
            json!(autoload.unwrap_or(DEFAULT_AUTOLOAD)),
        );
        self.client.post("services.wordpress.createOption", params)
    }

    /// `autoload` is left unchanged when `None`.
    pub fn update_option(
        &self,
        project: &str,
        service: &str,
        name: &str,
        value: &str,
        autoload: Option<&str>,
    ) -> Result<Value> {
        let mut params = target_with(project, service, "option_name", name)?;
        params.insert("option_value".to_string(), json!(value));
        insert_opt(&mut params, "autoload", autoload);
        self.client.post("services.wordpress.updateOption", params)
    }

    pub fn delete_option(&self, project: &str, service: &str, name: &str) -> Result<Value> {
        self.client.post(
            "services.wordpress.deleteOption",
            target_with(project, service, "option_name", name)?,
        )
    }

    pub fn media_regenerate(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.wordpress.mediaRegenerate", project, service)
    }

    pub fn flush_cache(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.wordpress.flushCache", project, service)
    }

    pub fn delete_transient(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.wordpress.deleteTransient", project, service)
    }

    pub fn db_optimize(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.wordpress.dbOptimize", project, service)
    }

    /// Replaces `search` with `replace` across the site's database.
    pub fn search_replace(
        &self,
        project: &str,
        service: &str,
        search: &str,
        replace: &str,
    ) -> Result<Value> {
        let mut params = target_with(project, service, "search", search)?;
        params.insert("replace".to_string(), json!(replace));
        self.client.post("services.wordpress.searchReplace", params)
    }

    /// Reports what [`search_replace`](Self::search_replace) would change.
    pub fn search_replace_dry_run(
        &self,
        project: &str,
        service: &str,
        search: &str,
        replace: &str,
    ) -> Result<Value> {
        let mut params = target_with(project, service, "search", search)?;
        params.insert("replace".to_string(), json!(replace));
        self.client
            .post("services.wordpress.searchReplaceDryRun", params)
    }

    pub fn update_wp_core(&self, project: &str, service: &str) -> Result<Value> {
        self.action("services.wordpress.updateWpCore", project, service)
    }

    /// Replaces the contents of `wp-config.php`.
    pub fn update_wp_config(&self, project: &str, service: &str, value: &str) -> Result<Value> {
        let mut params = service_target(project, service)?;
        params.insert("value".to_string(), json!(value));
        self.client.post("services.wordpress.updateWpConfig", params)
    }
}
