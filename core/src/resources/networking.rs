//! Domains, certificates, port mappings and the routing layer in front of
//! services (Traefik, middlewares, Cloudflare tunnels).

use serde_json::{json, Value};

use super::{bag, merge, str_field, strict_service_target};
use crate::error::{Error, Result};
use crate::rpc::Params;
use crate::validation::{
    validate_domain_name, validate_one_of, validate_port_value, validate_project_name,
    validate_required, validate_required_field, validate_service_name,
};

resource!(
    /// `domains.*` procedures.
    Domains
);

impl Domains {
    pub fn get_primary_domain(&self) -> Result<Value> {
        self.client.get("domains.getPrimaryDomain", Params::new())
    }

    pub fn list_domains(&self) -> Result<Value> {
        self.client.get("domains.listDomains", Params::new())
    }

    /// `domain` must carry a `name`.
    pub fn create_domain(&self, domain: Params) -> Result<Value> {
        validate_required_field(str_field(&domain, "name"), "name")?;
        self.client.post("domains.createDomain", domain)
    }

    pub fn update_domain(&self, domain_id: &str, changes: Params) -> Result<Value> {
        validate_required_field(Some(domain_id), "domainId")?;
        self.client.patch(
            "domains.updateDomain",
            merge(bag([("domainId", json!(domain_id))]), changes),
        )
    }

    pub fn delete_domain(&self, domain_id: &str) -> Result<Value> {
        validate_required_field(Some(domain_id), "domainId")?;
        self.client
            .delete("domains.deleteDomain", bag([("domainId", json!(domain_id))]))
    }

    pub fn set_primary_domain(&self, domain_name: &str) -> Result<Value> {
        validate_required_field(Some(domain_name), "domainName")?;
        self.client.post(
            "domains.setPrimaryDomain",
            bag([("domainName", json!(domain_name))]),
        )
    }
}

resource!(
    /// `certificates.*` procedures.
    Certificates
);

impl Certificates {
    pub fn list_certificates(&self) -> Result<Value> {
        self.client.get("certificates.listCertificates", Params::new())
    }

    pub fn remove_certificate(&self, certificate_id: &str) -> Result<Value> {
        validate_required_field(Some(certificate_id), "certificateId")?;
        self.client.delete(
            "certificates.removeCertificate",
            bag([("certificateId", json!(certificate_id))]),
        )
    }
}

/// Checks a `{published, target, protocol?}` mapping.
///
/// Both ports must be integers in range. Published ports below 1024 are
/// refused except 80 and 443.
pub fn validate_port_mapping(values: &Params) -> Result<()> {
    validate_required(values, &["published", "target"])?;
    let published = validate_port_value(&values["published"], "published")?;
    validate_port_value(&values["target"], "target")?;

    if let Some(protocol) = values.get("protocol") {
        let protocol = protocol.as_str().unwrap_or_default();
        validate_one_of(protocol, &["tcp", "udp"], "protocol")?;
    }
    if published < 1024 && published != 80 && published != 443 {
        return Err(Error::invalid_field(
            "published",
            "Published ports below 1024 are restricted (except 80 and 443)",
        ));
    }
    Ok(())
}

resource!(
    /// `ports.*` procedures.
    Ports
);

impl Ports {
    pub fn list_ports(&self, project: &str, service: &str) -> Result<Value> {
        self.client.get("ports.listPorts", strict_service_target(project, service)?)
    }

    pub fn create_port(&self, project: &str, service: &str, values: Params) -> Result<Value> {
        let mut params = strict_service_target(project, service)?;
        validate_port_mapping(&values)?;
        params.insert("values".to_string(), Value::Object(values));
        self.client.post("ports.createPort", params)
    }

    /// Replaces the mapping at `index` in the service's port list.
    pub fn update_port(
        &self,
        project: &str,
        service: &str,
        index: usize,
        values: Params,
    ) -> Result<Value> {
        let mut params = strict_service_target(project, service)?;
        validate_port_mapping(&values)?;
        params.insert("index".to_string(), json!(index));
        params.insert("values".to_string(), Value::Object(values));
        self.client.post("ports.updatePort", params)
    }

    pub fn delete_port(&self, project: &str, service: &str, index: usize) -> Result<Value> {
        let mut params = strict_service_target(project, service)?;
        params.insert("index".to_string(), json!(index));
        self.client.post("ports.deletePort", params)
    }

    pub fn delete_all_ports(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .post("ports.deleteAllPorts", strict_service_target(project, service)?)
    }
}

resource!(
    /// `middlewares.*` procedures. Middleware payloads depend on their type
    /// and are passed through untouched.
    Middlewares
);

impl Middlewares {
    pub fn list_middlewares(&self) -> Result<Value> {
        self.client.get("middlewares.listMiddlewares", Params::new())
    }

    pub fn create_middleware(&self, middleware: Params) -> Result<Value> {
        self.client.post("middlewares.createMiddleware", middleware)
    }

    pub fn update_middleware(&self, middleware: Params) -> Result<Value> {
        self.client.post("middlewares.updateMiddleware", middleware)
    }

    pub fn destroy_middleware(&self, id: &str) -> Result<Value> {
        validate_required_field(Some(id), "id")?;
        self.client
            .post("middlewares.destroyMiddleware", bag([("id", json!(id))]))
    }
}

resource!(
    /// `traefik.*` procedures.
    Traefik
);

impl Traefik {
    pub fn get_env(&self) -> Result<Value> {
        self.client.get("traefik.getEnv", Params::new())
    }

    pub fn get_custom_config(&self) -> Result<Value> {
        self.client.get("traefik.getCustomConfig", Params::new())
    }

    pub fn get_dashboard(&self) -> Result<Value> {
        self.client.get("traefik.getDashboard", Params::new())
    }

    pub fn restart(&self) -> Result<Value> {
        self.client.post("traefik.restart", Params::new())
    }

    pub fn set_env(&self, env: &str) -> Result<Value> {
        self.client.post("traefik.setEnv", bag([("env", json!(env))]))
    }

    pub fn set_custom_config(&self, config: &str) -> Result<Value> {
        self.client
            .post("traefik.setCustomConfig", bag([("config", json!(config))]))
    }
}

const TUNNEL_RULE_FIELDS: [&str; 8] = [
    "projectName",
    "serviceName",
    "subdomain",
    "domain",
    "path",
    "internalProtocol",
    "internalPort",
    "zoneId",
];

fn validate_tunnel_rule(rule: &Params, extra_required: &[&str]) -> Result<()> {
    let required: Vec<&str> = extra_required
        .iter()
        .chain(TUNNEL_RULE_FIELDS.iter())
        .copied()
        .collect();
    validate_required(rule, &required)?;
    validate_project_name(str_field(rule, "projectName").unwrap_or_default())?;
    validate_service_name(str_field(rule, "serviceName").unwrap_or_default())?;
    validate_domain_name(str_field(rule, "domain").unwrap_or_default())?;
    validate_port_value(&rule["internalPort"], "internalPort")?;
    validate_one_of(
        str_field(rule, "internalProtocol").unwrap_or_default(),
        &["http", "https"],
        "internalProtocol",
    )
}

resource!(
    /// `cloudflareTunnel.*` procedures.
    CloudflareTunnel
);

impl CloudflareTunnel {
    pub fn get_config(&self) -> Result<Value> {
        self.client.get("cloudflareTunnel.getConfig", Params::new())
    }

    pub fn list_zones(&self) -> Result<Value> {
        self.client.get("cloudflareTunnel.listZones", Params::new())
    }

    pub fn list_accounts(&self, api_token: &str) -> Result<Value> {
        validate_required_field(Some(api_token), "apiToken")?;
        self.client.get(
            "cloudflareTunnel.listAccounts",
            bag([("apiToken", json!(api_token))]),
        )
    }

    pub fn list_tunnels(&self, api_token: &str, account_id: &str) -> Result<Value> {
        validate_required_field(Some(api_token), "apiToken")?;
        validate_required_field(Some(account_id), "accountId")?;
        self.client.get(
            "cloudflareTunnel.listTunnels",
            bag([
                ("apiToken", json!(api_token)),
                ("accountId", json!(account_id)),
            ]),
        )
    }

    pub fn get_tunnel_rules(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .get("cloudflareTunnel.getTunnelRules", strict_service_target(project, service)?)
    }

    /// Credentials present in `config` must not be blank.
    pub fn set_config(&self, config: Params) -> Result<Value> {
        for field in ["apiToken", "accountId", "tunnelId"] {
            if let Some(value) = config.get(field) {
                if !value.is_null() {
                    validate_required_field(value.as_str(), field)?;
                }
            }
        }
        self.client.post("cloudflareTunnel.setConfig", config)
    }

    pub fn create_tunnel_rule(&self, rule: Params) -> Result<Value> {
        validate_tunnel_rule(&rule, &[])?;
        self.client.post("cloudflareTunnel.createTunnelRule", rule)
    }

    /// Like `create_tunnel_rule`, plus the rule `id` and its `dnsRecordId`.
    pub fn update_tunnel_rule(&self, rule: Params) -> Result<Value> {
        validate_tunnel_rule(&rule, &["id", "dnsRecordId"])?;
        self.client.post("cloudflareTunnel.updateTunnelRule", rule)
    }

    pub fn delete_tunnel_rule(&self, rule_id: &str) -> Result<Value> {
        validate_required_field(Some(rule_id), "id")?;
        self.client
            .post("cloudflareTunnel.deleteTunnelRule", bag([("id", json!(rule_id))]))
    }

    pub fn start_tunnel(&self) -> Result<Value> {
        self.client.post("cloudflareTunnel.startTunnel", Params::new())
    }

    pub fn stop_tunnel(&self) -> Result<Value> {
        self.client.post("cloudflareTunnel.stopTunnel", Params::new())
    }
}
