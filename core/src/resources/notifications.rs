//! Notification channels and the events they subscribe to.

use std::str::FromStr;

use serde_json::{json, Map, Value};

use super::{bag, str_field};
use crate::error::{Error, Result};
use crate::rpc::Params;
use crate::validation::{
    validate_email, validate_port_value, validate_required, validate_required_field, validate_url,
};

/// Delivery mechanism named by a channel target's `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Discord,
    Telegram,
    Slack,
    Smtp,
    Webhook,
}

impl FromStr for TargetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "discord" => Ok(TargetType::Discord),
            "telegram" => Ok(TargetType::Telegram),
            "slack" => Ok(TargetType::Slack),
            "smtp" => Ok(TargetType::Smtp),
            "webhook" => Ok(TargetType::Webhook),
            _ => Err(Error::invalid_field(
                "target.type",
                "Invalid target type. Must be one of: discord, telegram, slack, smtp, webhook",
            )),
        }
    }
}

pub const EVENT_TYPES: [&str; 5] = [
    "updateAvailable",
    "dockerCleanup",
    "diskLoad",
    "appDeploy",
    "databaseBackup",
];

/// Checks `name`, `target` and `events` of a channel definition.
pub fn validate_notification_channel(channel: &Params) -> Result<()> {
    validate_required(channel, &["name", "target", "events"])?;
    let target = channel["target"]
        .as_object()
        .ok_or_else(|| Error::invalid_field("target", "Target must be an object"))?;
    validate_target(target)?;
    let events = channel["events"]
        .as_object()
        .ok_or_else(|| Error::invalid_field("events", "Events must be an object"))?;
    validate_events(events)
}

fn validate_target(target: &Map<String, Value>) -> Result<TargetType> {
    let kind = match target.get("type") {
        None | Some(Value::Null) => {
            return Err(Error::invalid_field("target.type", "Target type is required"))
        }
        Some(kind) => kind.as_str().unwrap_or_default().parse::<TargetType>()?,
    };

    match kind {
        TargetType::Discord | TargetType::Slack | TargetType::Webhook => {
            let url = str_field(target, "url");
            validate_required_field(url, "url")?;
            validate_url(url.unwrap_or_default())?;
        }
        TargetType::Telegram => validate_required(target, &["access_token", "chat_id"])?,
        TargetType::Smtp => {
            validate_required(target, &["host", "port", "username", "password", "recipients"])?;
            validate_port_value(&target["port"], "port")?;
            let recipients = target["recipients"].as_array().ok_or_else(|| {
                Error::invalid_field(
                    "recipients",
                    "Recipients must be an array of email addresses",
                )
            })?;
            for recipient in recipients {
                validate_email(recipient.as_str().unwrap_or_default())?;
            }
        }
    }
    Ok(kind)
}

fn validate_events(events: &Map<String, Value>) -> Result<()> {
    for (event, config) in events {
        if !EVENT_TYPES.contains(&event.as_str()) {
            return Err(Error::invalid_field(
                "events",
                format!("Invalid event type: {event}"),
            ));
        }
        let config = config.as_object().ok_or_else(|| {
            Error::invalid_field(
                "events",
                format!("Event configuration for {event} must be an object"),
            )
        })?;
        let Some(enabled) = config.get("enabled").and_then(Value::as_bool) else {
            return Err(Error::invalid_field(
                "events",
                format!("Event {event} must have a boolean 'enabled' field"),
            ));
        };
        if event == "diskLoad" && enabled {
            if !config.get("min").is_some_and(is_numeric) {
                return Err(Error::invalid_field(
                    "events",
                    "DiskLoad event requires a numeric \"min\" field",
                ));
            }
            let schedule = config.get("schedule").and_then(Value::as_str).unwrap_or_default();
            if schedule.trim().is_empty() {
                return Err(Error::invalid_field(
                    "events",
                    "DiskLoad event requires a \"schedule\" field",
                ));
            }
        }
    }
    Ok(())
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

resource!(
    /// `notifications.*` procedures.
    Notifications
);

impl Notifications {
    pub fn list_notification_channels(&self) -> Result<Value> {
        self.client
            .get("notifications.listNotificationChannels", Params::new())
    }

    pub fn send_test_notification(&self, channel: Params) -> Result<Value> {
        validate_notification_channel(&channel)?;
        self.client
            .post("notifications.sendTestNotification", channel)
    }

    pub fn create_notification_channel(&self, channel: Params) -> Result<Value> {
        validate_notification_channel(&channel)?;
        self.client
            .post("notifications.createNotificationChannel", channel)
    }

    pub fn update_notification_channel(&self, channel: Params) -> Result<Value> {
        validate_required_field(str_field(&channel, "id"), "id")?;
        validate_notification_channel(&channel)?;
        self.client
            .post("notifications.updateNotificationChannel", channel)
    }

    pub fn destroy_notification_channel(&self, channel_id: &str) -> Result<Value> {
        validate_required_field(Some(channel_id), "id")?;
        self.client.post(
            "notifications.destroyNotificationChannel",
            bag([("id", json!(channel_id))]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bag as json_bag, last_call, recording_client};

    fn channel(target: Value, events: Value) -> Params {
        json_bag(json!({"name": "ops", "target": target, "events": events}))
    }

    fn deploy_events() -> Value {
        json!({"appDeploy": {"enabled": true}})
    }

    #[test]
    fn url_targets_need_a_valid_url() {
        for kind in ["discord", "slack", "webhook"] {
            let ok = channel(
                json!({"type": kind, "url": "https://hooks.example.com/x"}),
                deploy_events(),
            );
            assert!(validate_notification_channel(&ok).is_ok(), "{kind}");
            let bad = channel(json!({"type": kind, "url": "nope"}), deploy_events());
            assert!(validate_notification_channel(&bad).is_err(), "{kind}");
            let missing = channel(json!({"type": kind}), deploy_events());
            assert!(validate_notification_channel(&missing).is_err(), "{kind}");
        }
    }

    #[test]
    fn telegram_needs_token_and_chat() {
        let ok = channel(
            json!({"type": "telegram", "access_token": "t", "chat_id": "c"}),
            deploy_events(),
        );
        assert!(validate_notification_channel(&ok).is_ok());
        let missing = channel(json!({"type": "telegram"}), deploy_events());
        let err = validate_notification_channel(&missing).unwrap_err();
        assert_eq!(err.message(), "Missing required fields: access_token, chat_id");
    }

    #[test]
    fn smtp_checks_port_and_recipients() {
        let smtp = |port: Value, recipients: Value| {
            channel(
                json!({
                    "type": "smtp", "host": "mail.example.com", "port": port,
                    "username": "u", "password": "p", "recipients": recipients
                }),
                deploy_events(),
            )
        };
        let ops = || json!(["ops@example.com"]);
        assert!(validate_notification_channel(&smtp(json!(587), ops())).is_ok());
        assert!(validate_notification_channel(&smtp(json!(70000), ops())).is_err());
        let bad_recipient = smtp(json!(587), json!(["not-an-email"]));
        assert!(validate_notification_channel(&bad_recipient).is_err());
        let bare_string = smtp(json!(587), json!("ops@example.com"));
        assert!(validate_notification_channel(&bare_string).is_err());
    }

    #[test]
    fn unknown_target_type_is_rejected() {
        let err = validate_notification_channel(&channel(json!({"type": "pager"}), deploy_events()))
            .unwrap_err();
        assert!(err.message().starts_with("Invalid target type"));
    }

    #[test]
    fn events_are_checked() {
        let target = json!({"type": "webhook", "url": "https://example.com/hook"});
        assert!(validate_notification_channel(&channel(
            target.clone(),
            json!({"reboot": {"enabled": true}})
        ))
        .is_err());
        assert!(validate_notification_channel(&channel(
            target.clone(),
            json!({"appDeploy": {"enabled": "yes"}})
        ))
        .is_err());
        assert!(validate_notification_channel(&channel(
            target.clone(),
            json!({"diskLoad": {"enabled": true, "min": 80}})
        ))
        .is_err());
        assert!(validate_notification_channel(&channel(
            target.clone(),
            json!({"diskLoad": {"enabled": true, "min": "80", "schedule": "*/5 * * * *"}})
        ))
        .is_ok());
        assert!(validate_notification_channel(&channel(
            target,
            json!({"diskLoad": {"enabled": false}})
        ))
        .is_ok());
    }

    #[test]
    fn invalid_channel_is_never_sent() {
        let (transport, client) = recording_client();
        let notifications = Notifications::new(client);
        assert!(notifications
            .create_notification_channel(channel(json!({"type": "slack"}), deploy_events()))
            .is_err());
        assert!(transport.requests().is_empty());

        let mut valid = channel(
            json!({"type": "slack", "url": "https://hooks.slack.com/x"}),
            deploy_events(),
        );
        assert!(notifications.update_notification_channel(valid.clone()).is_err());
        valid.insert("id".to_string(), json!("ch1"));
        notifications.update_notification_channel(valid).unwrap();
        assert_eq!(last_call(&transport).0, "notifications.updateNotificationChannel");
    }
}
