//! Database services.
//!
//! The five engines expose the same procedure set under their own
//! namespace (`services.mysql.*`, `services.postgres.*`, ...). They differ
//! in the verbs MySQL uses for updates and removal, in the field that names
//! a new service, and in the admin UI each one bundles.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{json, Value};

use super::{bag, check_resource_limits, merge, service_target, str_field};
use crate::client::HttpClient;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::rpc::{Endpoint, Params};
use crate::validation::{validate_project_name, validate_required_field};

/// Per-engine wire differences.
pub trait Engine: Send + Sync + 'static {
    /// Segment after `services.` in every procedure name.
    const NAMESPACE: &'static str;
    /// Field of the create payload that names the service.
    const NAME_FIELD: &'static str = "serviceName";
    /// Verb for `updateResources`, `exposeService` and friends.
    const UPDATE_METHOD: HttpMethod = HttpMethod::Post;
    /// Verb for `destroyService`.
    const DESTROY_METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Copy)]
pub struct MySql;

#[derive(Debug, Clone, Copy)]
pub struct MariaDb;

#[derive(Debug, Clone, Copy)]
pub struct Postgres;

#[derive(Debug, Clone, Copy)]
pub struct Mongo;

#[derive(Debug, Clone, Copy)]
pub struct Redis;

impl Engine for MySql {
    const NAMESPACE: &'static str = "mysql";
    const NAME_FIELD: &'static str = "name";
    const UPDATE_METHOD: HttpMethod = HttpMethod::Patch;
    const DESTROY_METHOD: HttpMethod = HttpMethod::Delete;
}

impl Engine for MariaDb {
    const NAMESPACE: &'static str = "mariadb";
}

impl Engine for Postgres {
    const NAMESPACE: &'static str = "postgres";
}

impl Engine for Mongo {
    const NAMESPACE: &'static str = "mongo";
}

impl Engine for Redis {
    const NAMESPACE: &'static str = "redis";
}

pub type ServicesMySql = DatabaseService<MySql>;
pub type ServicesMariaDb = DatabaseService<MariaDb>;
pub type ServicesPostgres = DatabaseService<Postgres>;
pub type ServicesMongo = DatabaseService<Mongo>;
pub type ServicesRedis = DatabaseService<Redis>;

/// Handle for one database engine's procedures.
pub struct DatabaseService<E: Engine> {
    client: Arc<HttpClient>,
    engine: PhantomData<E>,
}

impl<E: Engine> Clone for DatabaseService<E> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<E: Engine> fmt::Debug for DatabaseService<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseService")
            .field("engine", &E::NAMESPACE)
            .finish_non_exhaustive()
    }
}

impl<E: Engine> DatabaseService<E> {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            engine: PhantomData,
        }
    }

    fn endpoint(procedure: &str) -> Endpoint {
        Endpoint::from(format!("services.{}.{procedure}", E::NAMESPACE))
    }

    fn send(&self, method: HttpMethod, procedure: &str, params: Params) -> Result<Value> {
        self.client.call(method, Self::endpoint(procedure), params)
    }

    fn action(&self, procedure: &str, project: &str, service: &str) -> Result<Value> {
        self.send(HttpMethod::Post, procedure, service_target(project, service)?)
    }

    fn update(&self, procedure: &str, project: &str, service: &str, data: Params) -> Result<Value> {
        let target = service_target(project, service)?;
        self.send(E::UPDATE_METHOD, procedure, merge(target, data))
    }

    pub fn inspect_service(&self, project: &str, service: &str) -> Result<Value> {
        self.send(HttpMethod::Get, "inspectService", service_target(project, service)?)
    }

    /// `service` must name the new service (`name` for MySQL, `serviceName`
    /// for the other engines).
    pub fn create_service(&self, project: &str, service: Params) -> Result<Value> {
        validate_project_name(project)?;
        validate_required_field(str_field(&service, E::NAME_FIELD), E::NAME_FIELD)?;
        self.send(
            HttpMethod::Post,
            "createService",
            merge(bag([("projectName", json!(project))]), service),
        )
    }

    /// Publishes the database on `exposed_port`; `0` removes the mapping.
    pub fn expose_service(&self, project: &str, service: &str, exposed_port: u16) -> Result<Value> {
        let mut params = service_target(project, service)?;
        params.insert("exposedPort".to_string(), json!(exposed_port));
        self.send(E::UPDATE_METHOD, "exposeService", params)
    }

    pub fn update_resources(
        &self,
        project: &str,
        service: &str,
        resources: Params,
    ) -> Result<Value> {
        check_resource_limits(&resources)?;
        self.update("updateResources", project, service, resources)
    }

    pub fn update_advanced(&self, project: &str, service: &str, advanced: Params) -> Result<Value> {
        self.update("updateAdvanced", project, service, advanced)
    }

    pub fn update_credentials(
        &self,
        project: &str,
        service: &str,
        credentials: Params,
    ) -> Result<Value> {
        self.update("updateCredentials", project, service, credentials)
    }

    pub fn enable_service(&self, project: &str, service: &str) -> Result<Value> {
        self.action("enableService", project, service)
    }

    pub fn disable_service(&self, project: &str, service: &str) -> Result<Value> {
        self.action("disableService", project, service)
    }

    pub fn destroy_service(&self, project: &str, service: &str) -> Result<Value> {
        self.send(E::DESTROY_METHOD, "destroyService", service_target(project, service)?)
    }

    pub fn enable_db_gate(&self, project: &str, service: &str) -> Result<Value> {
        self.action("enableDbGate", project, service)
    }

    pub fn disable_db_gate(&self, project: &str, service: &str) -> Result<Value> {
        self.action("disableDbGate", project, service)
    }
}

/// Engines that bundle phpMyAdmin.
pub trait PhpMyAdminEngine: Engine {}

impl PhpMyAdminEngine for MySql {}
impl PhpMyAdminEngine for MariaDb {}

impl<E: PhpMyAdminEngine> DatabaseService<E> {
    pub fn enable_php_my_admin(&self, project: &str, service: &str) -> Result<Value> {
        self.action("enablePhpMyAdmin", project, service)
    }

    pub fn disable_php_my_admin(&self, project: &str, service: &str) -> Result<Value> {
        self.action("disablePhpMyAdmin", project, service)
    }
}

impl DatabaseService<Postgres> {
    pub fn enable_pg_web(&self, project: &str, service: &str) -> Result<Value> {
        self.action("enablePgWeb", project, service)
    }

    pub fn disable_pg_web(&self, project: &str, service: &str) -> Result<Value> {
        self.action("disablePgWeb", project, service)
    }
}

impl DatabaseService<Mongo> {
    pub fn enable_mongo_express(&self, project: &str, service: &str) -> Result<Value> {
        self.action("enableMongoExpress", project, service)
    }

    pub fn disable_mongo_express(&self, project: &str, service: &str) -> Result<Value> {
        self.action("disableMongoExpress", project, service)
    }
}

impl DatabaseService<Redis> {
    pub fn enable_redis_commander(&self, project: &str, service: &str) -> Result<Value> {
        self.action("enableRedisCommander", project, service)
    }

    pub fn disable_redis_commander(&self, project: &str, service: &str) -> Result<Value> {
        self.action("disableRedisCommander", project, service)
    }
}
