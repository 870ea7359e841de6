//! Scheduled volume and database backups.

use serde_json::{json, Value};

use super::{bag, str_field, strict_service_target};
use crate::error::{Error, Result};
use crate::rpc::Params;
use crate::validation::{
    validate_database_name, validate_project_name, validate_required, validate_required_field,
    validate_schedule, validate_service_name, validate_storage_path,
};

/// Rules shared by both backup kinds once the required keys are present.
fn validate_backup_common(backup: &Params) -> Result<()> {
    validate_project_name(str_field(backup, "projectName").unwrap_or_default())?;
    validate_service_name(str_field(backup, "serviceName").unwrap_or_default())?;
    validate_schedule(str_field(backup, "schedule").unwrap_or_default())?;
    if !backup.get("enabled").is_some_and(Value::is_boolean) {
        return Err(Error::invalid_field(
            "enabled",
            "Enabled must be a boolean value",
        ));
    }
    // provider ids may be numeric
    if !backup
        .get("storageProviderId")
        .is_some_and(|id| id.is_string() || id.is_number())
    {
        return Err(Error::invalid_field(
            "storageProviderId",
            "Storage provider id must be a string or a number",
        ));
    }
    validate_required_field(str_field(backup, "storageProviderPath"), "storageProviderPath")
}

pub fn validate_volume_backup(backup: &Params) -> Result<()> {
    validate_required(
        backup,
        &[
            "storageProviderId",
            "storageProviderPath",
            "enabled",
            "schedule",
            "volumeName",
            "projectName",
            "serviceName",
        ],
    )?;
    validate_backup_common(backup)?;
    validate_storage_path(
        str_field(backup, "storageProviderPath").unwrap_or_default(),
        "storageProviderPath",
    )
}

pub fn validate_database_backup(backup: &Params) -> Result<()> {
    validate_required(
        backup,
        &[
            "projectName",
            "serviceName",
            "enabled",
            "schedule",
            "databaseName",
            "storageProviderId",
            "storageProviderPath",
        ],
    )?;
    validate_backup_common(backup)?;
    validate_database_name(str_field(backup, "databaseName").unwrap_or_default())
}

pub fn validate_restore(restore: &Params) -> Result<()> {
    validate_required(
        restore,
        &["projectName", "serviceName", "storageProviderId", "path", "databaseName"],
    )?;
    validate_project_name(str_field(restore, "projectName").unwrap_or_default())?;
    validate_service_name(str_field(restore, "serviceName").unwrap_or_default())
}

resource!(
    /// `volumeBackups.*` procedures.
    VolumeBackups
);

impl VolumeBackups {
    pub fn list_volume_mounts(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .get("volumeBackups.listVolumeMounts", strict_service_target(project, service)?)
    }

    pub fn list_volume_backups(&self, project: &str, service: &str) -> Result<Value> {
        self.client
            .get("volumeBackups.listVolumeBackups", strict_service_target(project, service)?)
    }

    pub fn create_volume_backup(&self, backup: Params) -> Result<Value> {
        validate_volume_backup(&backup)?;
        self.client.post("volumeBackups.createVolumeBackup", backup)
    }

    pub fn update_volume_backup(&self, backup: Params) -> Result<Value> {
        validate_required_field(str_field(&backup, "id"), "id")?;
        validate_volume_backup(&backup)?;
        self.client.post("volumeBackups.updateVolumeBackup", backup)
    }

    pub fn destroy_volume_backup(&self, backup_id: &str) -> Result<Value> {
        validate_required_field(Some(backup_id), "id")?;
        self.client
            .post("volumeBackups.destroyVolumeBackup", bag([("id", json!(backup_id))]))
    }

    /// Triggers the backup now, outside its schedule.
    pub fn run_volume_backup(&self, backup_id: &str) -> Result<Value> {
        validate_required_field(Some(backup_id), "id")?;
        self.client
            .post("volumeBackups.runVolumeBackup", bag([("id", json!(backup_id))]))
    }
}

resource!(
    /// `databaseBackups.*` procedures.
    DatabaseBackups
);

impl DatabaseBackups {
    pub fn list_database_backups(&self, project: &str, service: &str) -> Result<Value> {
        self.client.get(
            "databaseBackups.listDatabaseBackups",
            strict_service_target(project, service)?,
        )
    }

    pub fn get_service_databases(&self, project: &str, service: &str) -> Result<Value> {
        self.client.get(
            "databaseBackups.getServiceDatabases",
            strict_service_target(project, service)?,
        )
    }

    pub fn create_database_backup(&self, backup: Params) -> Result<Value> {
        validate_database_backup(&backup)?;
        self.client.post("databaseBackups.createDatabaseBackup", backup)
    }

    pub fn update_database_backup(&self, backup: Params) -> Result<Value> {
        validate_required_field(str_field(&backup, "id"), "id")?;
        validate_database_backup(&backup)?;
        self.client
            .post("databaseBackups.updateDatabaseBackup", backup)
    }

    pub fn delete_database_backup(&self, backup_id: &str) -> Result<Value> {
        validate_required_field(Some(backup_id), "id")?;
        self.client.post(
            "databaseBackups.deleteDatabaseBackup",
            bag([("id", json!(backup_id))]),
        )
    }

    pub fn run_database_backup(&self, backup_id: &str) -> Result<Value> {
        validate_required_field(Some(backup_id), "id")?;
        self.client
            .post("databaseBackups.runDatabaseBackup", bag([("id", json!(backup_id))]))
    }

    pub fn restore_database_backup(&self, restore: Params) -> Result<Value> {
        validate_restore(&restore)?;
        self.client
            .post("databaseBackups.restoreDatabaseBackup", restore)
    }
}
