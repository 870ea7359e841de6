//! The `Easypanel` facade and its capability registry.
//!
//! Every capability is built on first use and then reused, so two lookups
//! of the same name hand back the same handle. All handles share the
//! facade's one [`HttpClient`]; reconfiguring the facade reconfigures them.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::client::HttpClient;
use crate::config::{ClientConfig, ConfigError, Settings};
use crate::error::{Error, Result};
use crate::http::{Transport, UreqTransport};
use crate::resources::{
    Actions, Auth, Branding, Certificates, CloudflareTunnel, Cluster, DatabaseBackups,
    DockerBuilders, Domains, Git, LemonLicense, Middlewares, Monitor, Mounts, Notifications,
    PanelSettings, PortalLicense, Ports, Projects, Server, Services, ServicesApp, ServicesBox,
    ServicesCommon, ServicesCompose, ServicesMariaDb, ServicesMongo, ServicesMySql,
    ServicesPostgres, ServicesRedis, ServicesWordPress, Setup, StorageProvidersCommon,
    StorageProvidersDropbox, StorageProvidersFtp, StorageProvidersGoogle, StorageProvidersLocal,
    StorageProvidersS3, StorageProvidersSftp, Subscription, Templates, Traefik, TwoFactor, Update,
    Users, VolumeBackups,
};

/// Generates the capability enum, the borrowed resource enum, the lazy
/// slots and one accessor per capability from a single table.
macro_rules! capabilities {
    ($($variant:ident => $name:literal, $accessor:ident: $ty:ty;)*) => {
        /// Name of a capability group, as used by [`Easypanel::resolve`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Capability {
            $($variant,)*
        }

        impl Capability {
            pub const ALL: &'static [Capability] = &[$(Capability::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(Capability::$variant => $name,)*
                }
            }
        }

        impl FromStr for Capability {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($name => Ok(Capability::$variant),)*
                    _ => Err(Error::Generic(format!("Service '{s}' does not exist."))),
                }
            }
        }

        /// A resolved capability handle, borrowed from the facade.
        #[derive(Debug, Clone, Copy)]
        pub enum Resource<'a> {
            $($variant(&'a $ty),)*
        }

        impl Resource<'_> {
            pub fn capability(&self) -> Capability {
                match self {
                    $(Resource::$variant(_) => Capability::$variant,)*
                }
            }
        }

        #[derive(Default)]
        struct Slots {
            $($accessor: OnceLock<$ty>,)*
        }

        impl Easypanel {
            $(
                pub fn $accessor(&self) -> &$ty {
                    self.slots
                        .$accessor
                        .get_or_init(|| <$ty>::new(Arc::clone(&self.client)))
                }
            )*

            pub fn resolve_capability(&self, capability: Capability) -> Resource<'_> {
                match capability {
                    $(Capability::$variant => Resource::$variant(self.$accessor()),)*
                }
            }
        }
    };
}

capabilities! {
    Auth => "auth", auth: Auth;
    Projects => "projects", projects: Projects;
    Services => "services", services: Services;
    Monitor => "monitor", monitor: Monitor;
    Settings => "settings", settings: PanelSettings;
    Users => "users", users: Users;
    Certificates => "certificates", certificates: Certificates;
    Domains => "domains", domains: Domains;
    Templates => "templates", templates: Templates;
    Actions => "actions", actions: Actions;
    Branding => "branding", branding: Branding;
    Cluster => "cluster", cluster: Cluster;
    Git => "git", git: Git;
    Traefik => "traefik", traefik: Traefik;
    CloudflareTunnel => "cloudflareTunnel", cloudflare_tunnel: CloudflareTunnel;
    Notifications => "notifications", notifications: Notifications;
    Middlewares => "middlewares", middlewares: Middlewares;
    DockerBuilders => "dockerBuilders", docker_builders: DockerBuilders;
    Mounts => "mounts", mounts: Mounts;
    Ports => "ports", ports: Ports;
    TwoFactor => "twoFactor", two_factor: TwoFactor;
    Setup => "setup", setup: Setup;
    Update => "update", update: Update;
    Subscription => "subscription", subscription: Subscription;
    Server => "server", server: Server;
    ServicesApp => "servicesApp", services_app: ServicesApp;
    ServicesMySql => "servicesMySql", services_mysql: ServicesMySql;
    ServicesMariaDb => "servicesMariaDb", services_mariadb: ServicesMariaDb;
    ServicesMongo => "servicesMongo", services_mongo: ServicesMongo;
    ServicesPostgres => "servicesPostgres", services_postgres: ServicesPostgres;
    ServicesRedis => "servicesRedis", services_redis: ServicesRedis;
    ServicesWordPress => "servicesWordPress", services_wordpress: ServicesWordPress;
    ServicesBox => "servicesBox", services_box: ServicesBox;
    ServicesCompose => "servicesCompose", services_compose: ServicesCompose;
    ServicesCommon => "servicesCommon", services_common: ServicesCommon;
    StorageProvidersCommon => "storageProvidersCommon",
        storage_providers_common: StorageProvidersCommon;
    StorageProvidersDropbox => "storageProvidersDropbox",
        storage_providers_dropbox: StorageProvidersDropbox;
    StorageProvidersFtp => "storageProvidersFtp", storage_providers_ftp: StorageProvidersFtp;
    StorageProvidersGoogle => "storageProvidersGoogle",
        storage_providers_google: StorageProvidersGoogle;
    StorageProvidersLocal => "storageProvidersLocal",
        storage_providers_local: StorageProvidersLocal;
    StorageProvidersS3 => "storageProvidersS3", storage_providers_s3: StorageProvidersS3;
    StorageProvidersSftp => "storageProvidersSftp", storage_providers_sftp: StorageProvidersSftp;
    VolumeBackups => "volumeBackups", volume_backups: VolumeBackups;
    DatabaseBackups => "databaseBackups", database_backups: DatabaseBackups;
    PortalLicense => "portalLicense", portal_license: PortalLicense;
    LemonLicense => "lemonLicense", lemon_license: LemonLicense;
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Entry point: one configured client plus lazily built capability handles.
pub struct Easypanel {
    client: Arc<HttpClient>,
    slots: Slots,
}

impl Easypanel {
    /// Facade over the ureq transport with the default timeout.
    pub fn new(base_url: &str, auth_token: &str) -> Self {
        Self::from_client(HttpClient::new(ClientConfig::new(base_url, auth_token)))
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self::from_client(HttpClient::with_transport(config, transport))
    }

    pub fn from_settings(settings: &Settings) -> std::result::Result<Self, ConfigError> {
        let config = settings.client_config()?;
        debug!(
            base_url = config.base_url(),
            timeout_secs = config.timeout_secs(),
            verify_ssl = settings.verify_ssl,
            "configuring easypanel client"
        );
        Ok(Self::with_transport(
            config,
            UreqTransport::with_tls_verification(settings.verify_ssl),
        ))
    }

    /// Shorthand for [`Settings::from_env`] followed by
    /// [`Easypanel::from_settings`].
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::from_settings(&Settings::from_env()?)
    }

    fn from_client(client: HttpClient) -> Self {
        Self {
            client: Arc::new(client),
            slots: Slots::default(),
        }
    }

    /// The shared client, for procedures without a typed wrapper.
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    pub fn set_base_url(&self, base_url: &str) -> &Self {
        self.client.set_base_url(base_url);
        self
    }

    pub fn set_auth_token(&self, token: &str) -> &Self {
        self.client.set_auth_token(token);
        self
    }

    pub fn set_timeout(&self, seconds: u64) -> &Self {
        self.client.set_timeout(seconds);
        self
    }

    /// Looks a capability up by its camelCase name.
    pub fn resolve(&self, name: &str) -> Result<Resource<'_>> {
        let capability = name.parse::<Capability>()?;
        Ok(self.resolve_capability(capability))
    }
}

impl fmt::Debug for Easypanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Easypanel")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
