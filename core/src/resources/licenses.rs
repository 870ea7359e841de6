//! License activation for the two supported license vendors.

use serde_json::{json, Value};

use super::bag;
use crate::error::Result;
use crate::rpc::Params;
use crate::validation::validate_required_field;

resource!(
    /// `portalLicense.*` procedures.
    PortalLicense
);

impl PortalLicense {
    pub fn get_license_payload(&self) -> Result<Value> {
        self.client
            .get("portalLicense.getLicensePayload", Params::new())
    }

    pub fn activate(&self) -> Result<Value> {
        self.client.post("portalLicense.activate", Params::new())
    }

    pub fn deactivate(&self) -> Result<Value> {
        self.client.post("portalLicense.deactivate", Params::new())
    }
}

resource!(
    /// `lemonLicense.*` procedures.
    LemonLicense
);

impl LemonLicense {
    pub fn get_license_payload(&self) -> Result<Value> {
        self.client
            .get("lemonLicense.getLicensePayload", Params::new())
    }

    pub fn activate_by_order(&self, order_id: &str, identifier: &str) -> Result<Value> {
        validate_required_field(Some(order_id), "orderId")?;
        validate_required_field(Some(identifier), "identifier")?;
        self.client.post(
            "lemonLicense.activateByOrder",
            bag([
                ("orderId", json!(order_id)),
                ("identifier", json!(identifier)),
            ]),
        )
    }

    pub fn activate(&self, license_key: &str) -> Result<Value> {
        validate_required_field(Some(license_key), "licenseKey")?;
        self.client.post(
            "lemonLicense.activate",
            bag([("licenseKey", json!(license_key))]),
        )
    }

    pub fn deactivate(&self) -> Result<Value> {
        self.client.post("lemonLicense.deactivate", Params::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{last_call, recording_client};

    #[test]
    fn blank_license_key_is_rejected() {
        let (transport, client) = recording_client();
        let err = LemonLicense::new(client).activate("").unwrap_err();
        assert_eq!(err.message(), "Required field 'licenseKey' is missing or empty");
        assert!(err.field_errors().unwrap().contains_key("licenseKey"));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn activation_without_input_posts_empty_object() {
        let (transport, client) = recording_client();
        PortalLicense::new(client).activate().unwrap();
        let request = transport.last_request();
        assert_eq!(request.body.as_deref(), Some("{}"));
        assert_eq!(last_call(&transport).0, "portalLicense.activate");
    }
}
