//! Resource-call layer.
//!
//! One type per capability group. Each method validates its input, builds a
//! fresh parameter bag and issues exactly one call through the shared
//! [`HttpClient`]. Every resource is a cheap handle around an
//! `Arc<HttpClient>`, so configuration changes on the client apply to all
//! of them.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::rpc::Params;
use crate::validation::{
    validate_cpu_limit, validate_memory_limit, validate_project_name, validate_required_field,
    validate_service_name,
};

/// Declares a resource handle holding the shared client.
macro_rules! resource {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            client: std::sync::Arc<crate::client::HttpClient>,
        }

        impl $name {
            pub fn new(client: std::sync::Arc<crate::client::HttpClient>) -> Self {
                Self { client }
            }
        }
    };
}

/// Declares a resource for a code-hosting service type. Box and WordPress
/// services share these procedures under their own namespace.
macro_rules! code_service {
    ($(#[$meta:meta])* $name:ident, $namespace:literal) => {
        resource!($(#[$meta])* $name);

        impl $name {
            fn action(
                &self,
                procedure: &'static str,
                project: &str,
                service: &str,
            ) -> crate::error::Result<serde_json::Value> {
                let target = crate::resources::service_target(project, service)?;
                self.client.post(procedure, target)
            }

            fn with_list(
                &self,
                procedure: &'static str,
                target: (&str, &str),
                key: &str,
                items: Vec<serde_json::Value>,
            ) -> crate::error::Result<serde_json::Value> {
                let mut params = crate::resources::service_target(target.0, target.1)?;
                params.insert(key.to_string(), serde_json::Value::Array(items));
                self.client.post(procedure, params)
            }

            /// `None` leaves the section out of the payload.
            fn with_section(
                &self,
                procedure: &'static str,
                target: (&str, &str),
                key: &str,
                section: Option<crate::rpc::Params>,
            ) -> crate::error::Result<serde_json::Value> {
                let mut params = crate::resources::service_target(target.0, target.1)?;
                crate::resources::insert_opt(&mut params, key, section);
                self.client.post(procedure, params)
            }

            pub fn inspect_service(
                &self,
                project: &str,
                service: &str,
            ) -> crate::error::Result<serde_json::Value> {
                self.client.get(
                    concat!("services.", $namespace, ".inspectService"),
                    crate::resources::service_target(project, service)?,
                )
            }

            /// `service` must carry `projectName` and `serviceName`.
            pub fn create_service(
                &self,
                service: crate::rpc::Params,
            ) -> crate::error::Result<serde_json::Value> {
                crate::validation::validate_required(&service, &["projectName", "serviceName"])?;
                crate::validation::validate_project_name(crate::resources::expect_str(
                    &service,
                    "projectName",
                )?)?;
                self.client
                    .post(concat!("services.", $namespace, ".createService"), service)
            }

            /// Prepares the workspace, optionally from a git checkout.
            pub fn init_service(
                &self,
                project: &str,
                service: &str,
                git: Option<crate::rpc::Params>,
                private: bool,
            ) -> crate::error::Result<serde_json::Value> {
                let mut params = crate::resources::service_target(project, service)?;
                params.insert("private".to_string(), serde_json::Value::Bool(private));
                crate::resources::insert_opt(&mut params, "git", git);
                self.client
                    .post(concat!("services.", $namespace, ".initService"), params)
            }

            pub fn run_script(
                &self,
                project: &str,
                service: &str,
                name: &str,
                content: &str,
            ) -> crate::error::Result<serde_json::Value> {
                crate::validation::validate_required_field(Some(name), "name")?;
                let mut params = crate::resources::service_target(project, service)?;
                params.insert("name".to_string(), serde_json::json!(name));
                params.insert("content".to_string(), serde_json::json!(content));
                self.client
                    .post(concat!("services.", $namespace, ".runScript"), params)
            }

            pub fn update_scripts(
                &self,
                project: &str,
                service: &str,
                scripts: Vec<serde_json::Value>,
            ) -> crate::error::Result<serde_json::Value> {
                self.with_list(
                    concat!("services.", $namespace, ".updateScripts"),
                    (project, service),
                    "scripts",
                    scripts,
                )
            }

            pub fn destroy_service(
                &self,
                project: &str,
                service: &str,
            ) -> crate::error::Result<serde_json::Value> {
                self.action(concat!("services.", $namespace, ".destroyService"), project, service)
            }

            pub fn git_clone(
                &self,
                project: &str,
                service: &str,
                url: &str,
                branch: &str,
                private: bool,
            ) -> crate::error::Result<serde_json::Value> {
                crate::validation::validate_required_field(Some(url), "url")?;
                crate::validation::validate_required_field(Some(branch), "branch")?;
                let mut params = crate::resources::service_target(project, service)?;
                params.insert("url".to_string(), serde_json::json!(url));
                params.insert("branch".to_string(), serde_json::json!(branch));
                params.insert("private".to_string(), serde_json::Value::Bool(private));
                self.client
                    .post(concat!("services.", $namespace, ".gitClone"), params)
            }

            /// Commit identity used inside the workspace.
            pub fn update_git_config(
                &self,
                project: &str,
                service: &str,
                name: &str,
                email: &str,
            ) -> crate::error::Result<serde_json::Value> {
                crate::validation::validate_required_field(Some(name), "name")?;
                crate::validation::validate_email(email)?;
                let mut params = crate::resources::service_target(project, service)?;
                params.insert("name".to_string(), serde_json::json!(name));
                params.insert("email".to_string(), serde_json::json!(email));
                self.client
                    .post(concat!("services.", $namespace, ".updateGitConfig"), params)
            }

            pub fn rebuild_docker_image(
                &self,
                project: &str,
                service: &str,
            ) -> crate::error::Result<serde_json::Value> {
                self.action(
                    concat!("services.", $namespace, ".rebuildDockerImage"),
                    project,
                    service,
                )
            }

            pub fn update_redirects(
                &self,
                project: &str,
                service: &str,
                redirects: Vec<serde_json::Value>,
            ) -> crate::error::Result<serde_json::Value> {
                self.with_list(
                    concat!("services.", $namespace, ".updateRedirects"),
                    (project, service),
                    "redirects",
                    redirects,
                )
            }

            pub fn update_basic_auth(
                &self,
                project: &str,
                service: &str,
                users: Vec<serde_json::Value>,
            ) -> crate::error::Result<serde_json::Value> {
                self.with_list(
                    concat!("services.", $namespace, ".updateBasicAuth"),
                    (project, service),
                    "basicAuth",
                    users,
                )
            }

            pub fn update_ide(
                &self,
                project: &str,
                service: &str,
                ide: Option<crate::rpc::Params>,
            ) -> crate::error::Result<serde_json::Value> {
                self.with_section(
                    concat!("services.", $namespace, ".updateIde"),
                    (project, service),
                    "ide",
                    ide,
                )
            }

            pub fn update_php(
                &self,
                project: &str,
                service: &str,
                php: Option<crate::rpc::Params>,
            ) -> crate::error::Result<serde_json::Value> {
                self.with_section(
                    concat!("services.", $namespace, ".updatePhp"),
                    (project, service),
                    "php",
                    php,
                )
            }

            pub fn update_nginx(
                &self,
                project: &str,
                service: &str,
                nginx: Option<crate::rpc::Params>,
            ) -> crate::error::Result<serde_json::Value> {
                self.with_section(
                    concat!("services.", $namespace, ".updateNginx"),
                    (project, service),
                    "nginx",
                    nginx,
                )
            }

            pub fn update_env(
                &self,
                project: &str,
                service: &str,
                env: Option<crate::rpc::Params>,
            ) -> crate::error::Result<serde_json::Value> {
                self.with_section(
                    concat!("services.", $namespace, ".updateEnv"),
                    (project, service),
                    "env",
                    env,
                )
            }

            pub fn start_service(
                &self,
                project: &str,
                service: &str,
            ) -> crate::error::Result<serde_json::Value> {
                self.action(concat!("services.", $namespace, ".startService"), project, service)
            }

            pub fn stop_service(
                &self,
                project: &str,
                service: &str,
            ) -> crate::error::Result<serde_json::Value> {
                self.action(concat!("services.", $namespace, ".stopService"), project, service)
            }

            pub fn restart_service(
                &self,
                project: &str,
                service: &str,
            ) -> crate::error::Result<serde_json::Value> {
                self.action(concat!("services.", $namespace, ".restartService"), project, service)
            }

            /// String limits must use the panel's notation, e.g. `512M`.
            pub fn update_resources(
                &self,
                project: &str,
                service: &str,
                resources: crate::rpc::Params,
            ) -> crate::error::Result<serde_json::Value> {
                crate::resources::check_resource_limits(&resources)?;
                let mut params = crate::resources::service_target(project, service)?;
                params.insert("resources".to_string(), serde_json::Value::Object(resources));
                self.client
                    .post(concat!("services.", $namespace, ".updateResources"), params)
            }
        }
    };
}

pub mod app;
pub mod auth;
pub mod backups;
pub mod boxes;
pub mod compose;
pub mod databases;
pub mod licenses;
pub mod mounts;
pub mod networking;
pub mod notifications;
pub mod projects;
pub mod services;
pub mod storage;
pub mod system;
pub mod wordpress;

pub use app::ServicesApp;
pub use auth::{Auth, TwoFactor, Users};
pub use backups::{
    validate_database_backup, validate_restore, validate_volume_backup, DatabaseBackups,
    VolumeBackups,
};
pub use boxes::ServicesBox;
pub use compose::{ComposeGitSource, ServicesCompose};
pub use databases::{
    DatabaseService, Engine, MariaDb, Mongo, MySql, PhpMyAdminEngine, Postgres, Redis,
    ServicesMariaDb, ServicesMongo, ServicesMySql, ServicesPostgres, ServicesRedis,
};
pub use licenses::{LemonLicense, PortalLicense};
pub use mounts::{validate_mount, MountType, Mounts};
pub use networking::{
    validate_port_mapping, Certificates, CloudflareTunnel, Domains, Middlewares, Ports, Traefik,
};
pub use notifications::{validate_notification_channel, Notifications, TargetType, EVENT_TYPES};
pub use projects::Projects;
pub use services::{Services, ServicesCommon};
pub use storage::{
    RemoteLogin, S3Config, S3Subtype, StorageProvidersCommon, StorageProvidersDropbox,
    StorageProvidersFtp, StorageProvidersGoogle, StorageProvidersLocal, StorageProvidersS3,
    StorageProvidersSftp,
};
pub use system::{
    Actions, Branding, Cluster, DockerBuilders, Git, HiddenLinks, Logos, Monitor, PanelSettings,
    Server, Setup, SetupRequest, Subscription, Templates, Update, DEFAULT_ACTIONS_LIMIT,
};
pub use wordpress::{ServicesWordPress, WordPressUser};

/// Bag from literal entries, in order.
pub(crate) fn bag<const N: usize>(entries: [(&str, Value); N]) -> Params {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// `{projectName, serviceName}` after checking both.
pub(crate) fn service_target(project: &str, service: &str) -> Result<Params> {
    validate_project_name(project)?;
    validate_required_field(Some(service), "serviceName")?;
    Ok(bag([
        ("projectName", Value::from(project)),
        ("serviceName", Value::from(service)),
    ]))
}

/// Like [`service_target`], but the service name must also be an
/// identifier.
pub(crate) fn strict_service_target(project: &str, service: &str) -> Result<Params> {
    validate_project_name(project)?;
    validate_service_name(service)?;
    Ok(bag([
        ("projectName", Value::from(project)),
        ("serviceName", Value::from(service)),
    ]))
}

/// Appends `extra` to `base`; keys present in both take the value from
/// `extra`.
pub(crate) fn merge(mut base: Params, extra: Params) -> Params {
    base.extend(extra);
    base
}

pub(crate) fn insert_opt<T: Into<Value>>(params: &mut Params, key: &str, value: Option<T>) {
    if let Some(value) = value {
        params.insert(key.to_string(), value.into());
    }
}

/// Serializes a typed payload into a bag. Non-object payloads are a bug in
/// the caller's type and surface as `Error::Generic`.
pub(crate) fn to_params<T: Serialize>(payload: &T) -> Result<Params> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(params)) => Ok(params),
        Ok(other) => Err(Error::Generic(format!(
            "expected an object payload, got {other}"
        ))),
        Err(e) => Err(Error::Generic(format!("failed to encode payload: {e}"))),
    }
}

pub(crate) fn str_field<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

/// A present key whose value must be a string.
pub(crate) fn expect_str<'a>(params: &'a Params, key: &str) -> Result<&'a str> {
    str_field(params, key)
        .ok_or_else(|| Error::invalid_field(key, format!("{key} must be a string")))
}

/// Memory and CPU limits given as strings must use the panel's notation.
pub(crate) fn check_resource_limits(params: &Params) -> Result<()> {
    for key in ["memoryLimit", "memoryReservation"] {
        if let Some(memory) = str_field(params, key) {
            validate_memory_limit(memory)?;
        }
    }
    for key in ["cpuLimit", "cpuReservation"] {
        if let Some(cpu) = str_field(params, key) {
            validate_cpu_limit(cpu)?;
        }
    }
    // resources may also be nested under a `resources` object
    if let Some(nested) = params.get("resources").and_then(Value::as_object) {
        check_resource_limits(nested)?;
    }
    Ok(())
}
