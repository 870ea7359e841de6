//! Service mounts: bind mounts, named volumes and inline files.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use super::{str_field, strict_service_target};
use crate::error::{Error, Result};
use crate::rpc::Params;
use crate::validation::{validate_absolute_path, validate_required, validate_volume_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountType {
    Bind,
    Volume,
    File,
}

impl MountType {
    pub const ALL: [MountType; 3] = [MountType::Bind, MountType::Volume, MountType::File];

    pub fn as_str(self) -> &'static str {
        match self {
            MountType::Bind => "bind",
            MountType::Volume => "volume",
            MountType::File => "file",
        }
    }
}

impl fmt::Display for MountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MountType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                Error::invalid_field("type", "Mount type must be one of: bind, volume, file")
            })
    }
}

/// Checks a mount definition against the rules of its `type`.
///
/// - `bind`: absolute `hostPath` and `mountPath`.
/// - `volume`: identifier-format `name` and absolute `mountPath`.
/// - `file`: string `content` (may be empty) and absolute `mountPath`.
pub fn validate_mount(values: &Params) -> Result<MountType> {
    let kind = match values.get("type") {
        None | Some(Value::Null) => {
            return Err(Error::invalid_field("type", "Mount type is required"))
        }
        Some(kind) => kind.as_str().unwrap_or_default().parse::<MountType>()?,
    };

    match kind {
        MountType::Bind => {
            validate_required(values, &["hostPath", "mountPath"])?;
            validate_absolute_path(str_field(values, "hostPath").unwrap_or_default(), "hostPath")?;
        }
        MountType::Volume => {
            validate_required(values, &["name", "mountPath"])?;
            validate_volume_name(str_field(values, "name").unwrap_or_default())?;
        }
        MountType::File => {
            if !values.get("content").is_some_and(Value::is_string) {
                return Err(Error::invalid_field(
                    "content",
                    "File content is required (can be empty string)",
                ));
            }
            validate_required(values, &["mountPath"])?;
        }
    }
    validate_absolute_path(str_field(values, "mountPath").unwrap_or_default(), "mountPath")?;
    Ok(kind)
}

resource!(
    /// `mounts.*` procedures.
    Mounts
);

impl Mounts {
    pub fn list_mounts(&self, project: &str, service: &str) -> Result<Value> {
        self.client.get("mounts.listMounts", strict_service_target(project, service)?)
    }

    pub fn create_mount(&self, project: &str, service: &str, values: Params) -> Result<Value> {
        let mut params = strict_service_target(project, service)?;
        validate_mount(&values)?;
        params.insert("values".to_string(), Value::Object(values));
        self.client.post("mounts.createMount", params)
    }

    pub fn update_mount(
        &self,
        project: &str,
        service: &str,
        index: usize,
        values: Params,
    ) -> Result<Value> {
        let mut params = strict_service_target(project, service)?;
        validate_mount(&values)?;
        params.insert("index".to_string(), json!(index));
        params.insert("values".to_string(), Value::Object(values));
        self.client.post("mounts.updateMount", params)
    }

    pub fn delete_mount(&self, project: &str, service: &str, index: usize) -> Result<Value> {
        let mut params = strict_service_target(project, service)?;
        params.insert("index".to_string(), json!(index));
        self.client.post("mounts.deleteMount", params)
    }
}
