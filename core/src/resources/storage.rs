//! Backup storage providers.
//!
//! Provider payloads are sent as flat bags like every other write. Typed
//! request structs are serialized first and then checked for blank fields,
//! so a provider definition is validated exactly as it will appear on the
//! wire.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};

use super::{bag, insert_opt, to_params};
use crate::error::{Error, Result};
use crate::rpc::Params;
use crate::validation::{validate_required, validate_required_field};

/// Flavour of S3-compatible storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum S3Subtype {
    Other,
    Aws,
    Backblaze,
    DigitalOcean,
    Wasabi,
}

impl S3Subtype {
    pub const ALL: [S3Subtype; 5] = [
        S3Subtype::Other,
        S3Subtype::Aws,
        S3Subtype::Backblaze,
        S3Subtype::DigitalOcean,
        S3Subtype::Wasabi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            S3Subtype::Other => "other",
            S3Subtype::Aws => "aws",
            S3Subtype::Backblaze => "backblaze",
            S3Subtype::DigitalOcean => "digital-ocean",
            S3Subtype::Wasabi => "wasabi",
        }
    }
}

impl fmt::Display for S3Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for S3Subtype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        S3Subtype::ALL
            .into_iter()
            .find(|subtype| subtype.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<_> = S3Subtype::ALL.iter().map(|s| s.as_str()).collect();
                Error::invalid_field(
                    "subtype",
                    format!("Invalid subtype \"{s}\". Valid subtypes are: {}", valid.join(", ")),
                )
            })
    }
}

/// Bucket credentials for an S3-compatible provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Config<'a> {
    pub name: &'a str,
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub bucket: &'a str,
    pub region: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<&'a str>,
}

const S3_FIELDS: [&str; 5] = ["name", "accessKeyId", "secretAccessKey", "bucket", "region"];

/// Login for FTP and SFTP servers.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteLogin<'a> {
    pub name: &'a str,
    pub host: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

const LOGIN_FIELDS: [&str; 4] = ["name", "host", "username", "password"];

/// `{id, ...payload}` with `id` checked.
fn with_id(id: &str, payload: Params) -> Result<Params> {
    validate_required_field(Some(id), "id")?;
    let mut params = bag([("id", json!(id))]);
    params.extend(payload);
    Ok(params)
}

fn id_only(id: &str) -> Result<Params> {
    validate_required_field(Some(id), "id")?;
    Ok(bag([("id", json!(id))]))
}

resource!(
    /// `storageProviders.common.*` procedures.
    StorageProvidersCommon
);

impl StorageProvidersCommon {
    pub fn list(&self) -> Result<Value> {
        self.client.get("storageProviders.common.list", Params::new())
    }

    pub fn list_options(&self) -> Result<Value> {
        self.client
            .get("storageProviders.common.listOptions", Params::new())
    }
}

resource!(
    /// `storageProviders.local.*` procedures.
    StorageProvidersLocal
);

impl StorageProvidersLocal {
    fn payload(name: &str, path: &str) -> Result<Params> {
        validate_required_field(Some(name), "name")?;
        validate_required_field(Some(path), "path")?;
        Ok(bag([("name", json!(name)), ("path", json!(path))]))
    }

    pub fn create_provider(&self, name: &str, path: &str) -> Result<Value> {
        self.client.post(
            "storageProviders.local.createProvider",
            Self::payload(name, path)?,
        )
    }

    pub fn update_provider(&self, id: &str, name: &str, path: &str) -> Result<Value> {
        let params = with_id(id, Self::payload(name, path)?)?;
        self.client
            .post("storageProviders.local.updateProvider", params)
    }

    pub fn delete_provider(&self, id: &str) -> Result<Value> {
        self.client
            .post("storageProviders.local.deleteProvider", id_only(id)?)
    }
}

resource!(
    /// `storageProviders.s3.*` procedures.
    StorageProvidersS3
);

impl StorageProvidersS3 {
    pub fn create_provider(&self, subtype: S3Subtype, config: &S3Config<'_>) -> Result<Value> {
        let mut params = bag([("subtype", json!(subtype))]);
        params.extend(to_params(config)?);
        validate_required(&params, &S3_FIELDS)?;
        self.client.post("storageProviders.s3.createProvider", params)
    }

    /// The subtype of an existing provider cannot change.
    pub fn update_provider(&self, id: &str, config: &S3Config<'_>) -> Result<Value> {
        let params = with_id(id, to_params(config)?)?;
        validate_required(&params, &S3_FIELDS)?;
        self.client.post("storageProviders.s3.updateProvider", params)
    }

    pub fn delete_provider(&self, id: &str) -> Result<Value> {
        self.client
            .post("storageProviders.s3.deleteProvider", id_only(id)?)
    }
}

resource!(
    /// `storageProviders.sftp.*` procedures.
    StorageProvidersSftp
);

impl StorageProvidersSftp {
    pub fn create_provider(&self, login: &RemoteLogin<'_>) -> Result<Value> {
        let params = to_params(login)?;
        validate_required(&params, &LOGIN_FIELDS)?;
        self.client
            .post("storageProviders.sftp.createProvider", params)
    }

    pub fn update_provider(&self, id: &str, login: &RemoteLogin<'_>) -> Result<Value> {
        let params = with_id(id, to_params(login)?)?;
        validate_required(&params, &LOGIN_FIELDS)?;
        self.client
            .post("storageProviders.sftp.updateProvider", params)
    }

    pub fn delete_provider(&self, id: &str) -> Result<Value> {
        self.client
            .post("storageProviders.sftp.deleteProvider", id_only(id)?)
    }
}

resource!(
    /// `storageProviders.ftp.*` procedures. Unlike SFTP, creation needs an
    /// explicit port.
    StorageProvidersFtp
);

impl StorageProvidersFtp {
    pub fn create_provider(&self, login: &RemoteLogin<'_>) -> Result<Value> {
        let params = to_params(login)?;
        validate_required(&params, &["name", "host", "username", "password", "port"])?;
        self.client
            .post("storageProviders.ftp.createProvider", params)
    }

    pub fn update_provider(&self, id: &str, login: &RemoteLogin<'_>) -> Result<Value> {
        let params = with_id(id, to_params(login)?)?;
        validate_required(&params, &LOGIN_FIELDS)?;
        self.client
            .post("storageProviders.ftp.updateProvider", params)
    }

    pub fn delete_provider(&self, id: &str) -> Result<Value> {
        self.client
            .post("storageProviders.ftp.deleteProvider", id_only(id)?)
    }
}

/// Providers authorised through an OAuth flow share one procedure set.
macro_rules! oauth_provider {
    ($(#[$meta:meta])* $name:ident, $namespace:literal) => {
        resource!($(#[$meta])* $name);

        impl $name {
            /// Creates the provider; the panel then walks the user through
            /// the authorisation flow.
            pub fn create_provider(&self, name: &str) -> Result<Value> {
                validate_required_field(Some(name), "name")?;
                self.client.post(
                    concat!("storageProviders.", $namespace, ".createProvider"),
                    bag([("name", json!(name))]),
                )
            }

            pub fn update_provider(&self, id: &str, name: Option<&str>) -> Result<Value> {
                let mut params = id_only(id)?;
                insert_opt(&mut params, "name", name);
                self.client.post(
                    concat!("storageProviders.", $namespace, ".updateProvider"),
                    params,
                )
            }

            pub fn delete_provider(&self, id: &str) -> Result<Value> {
                self.client.post(
                    concat!("storageProviders.", $namespace, ".deleteProvider"),
                    id_only(id)?,
                )
            }

            /// Revokes the stored authorisation but keeps the provider.
            pub fn disconnect_provider(&self, id: &str) -> Result<Value> {
                self.client.post(
                    concat!("storageProviders.", $namespace, ".disconnectProvider"),
                    id_only(id)?,
                )
            }
        }
    };
}

oauth_provider!(
    /// `storageProviders.dropbox.*` procedures.
    StorageProvidersDropbox,
    "dropbox"
);

oauth_provider!(
    /// `storageProviders.google.*` procedures.
    StorageProvidersGoogle,
    "google"
);
