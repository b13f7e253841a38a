// MIT License - Copyright (c) 2026 Peter Wright
// Classified event -> outbound effects

use tracing::{info, warn};

use crate::codes::CodeTable;
use crate::constants::{
    PING, QUALIFIER_NEW_EVENT, QUALIFIER_RESTORE, STATUS_ALARM, STATUS_ARMED, STATUS_DISARMED,
};
use crate::event::Classification;
use crate::telegram::Telegram;

/// Notification priority. `High` asks the notifier for repeat-until-acknowledged delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Normal,
    High,
}

/// Value carried in a telemetry message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Telemetry {
    /// Alarm state on the status topic: 10 armed, 50 disarmed, 99 alarm.
    Status(u8),
    /// Liveness on the ping topic.
    Ping(u8),
}

/// One side effect decided for a telegram. Executed by the collaborators in
/// [`effects`](crate::effects), never by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEffect {
    Notify {
        priority: Priority,
        title: String,
        body: String,
    },
    WebhookCall {
        url: String,
    },
    TelemetryPublish {
        topic: String,
        value: Telemetry,
    },
}

/// Where the effects go: webhook URLs, telemetry topics and the notification title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTargets {
    /// Called on disarm (residents are home).
    pub activate_home_url: String,
    /// Called on arm.
    pub deactivate_home_url: String,
    pub status_topic: String,
    pub ping_topic: String,
    pub notify_title: String,
}

pub const DISARMED_TEXT: &str = "The alarm has been DISARMed";
pub const ARMED_TEXT: &str = "The alarm has been ARMed";
pub const TEST_REPORT_TEXT: &str = "Periodic or manual test report";
pub const STARTUP_TEXT: &str = "Server starting up...";

/// Decide the effects for a classified telegram.
///
/// Pure apart from logging: the same inputs always give the same list.
pub fn dispatch(
    classification: Classification,
    telegram: &Telegram,
    codes: &CodeTable,
    targets: &DispatchTargets,
) -> Vec<OutboundEffect> {
    match classification {
        Classification::ArmDisarm(qualifier) => {
            info!("Open / Close event detected: qualifier {}", qualifier);
            if qualifier == QUALIFIER_NEW_EVENT {
                info!("disarm");
                vec![
                    notify(targets, Priority::Normal, DISARMED_TEXT.to_string()),
                    OutboundEffect::WebhookCall {
                        url: targets.activate_home_url.clone(),
                    },
                    status(targets, STATUS_DISARMED),
                ]
            } else {
                if qualifier != QUALIFIER_RESTORE {
                    warn!(
                        "Unexpected qualifier {:?} on open/close event {}, treating as arm",
                        qualifier,
                        telegram.event_code()
                    );
                }
                info!("arm");
                vec![
                    notify(targets, Priority::Normal, ARMED_TEXT.to_string()),
                    OutboundEffect::WebhookCall {
                        url: targets.deactivate_home_url.clone(),
                    },
                    status(targets, STATUS_ARMED),
                ]
            }
        }
        Classification::AlarmCondition(_) => {
            let text = alarm_text(telegram, codes);
            info!("{}", text);
            vec![
                notify(targets, Priority::High, text),
                status(targets, STATUS_ALARM),
            ]
        }
        Classification::PeriodicTest => {
            info!("{}", TEST_REPORT_TEXT);
            vec![
                notify(targets, Priority::Normal, TEST_REPORT_TEXT.to_string()),
                OutboundEffect::TelemetryPublish {
                    topic: targets.ping_topic.clone(),
                    value: Telemetry::Ping(PING),
                },
            ]
        }
        Classification::NoAction => Vec::new(),
    }
}

/// Effects announcing that the receiver is up.
pub fn startup(targets: &DispatchTargets) -> Vec<OutboundEffect> {
    vec![notify(targets, Priority::Normal, STARTUP_TEXT.to_string())]
}

/// Alarm message text, falling back to the bare code when the table has no entry.
fn alarm_text(telegram: &Telegram, codes: &CodeTable) -> String {
    let code = telegram.event_code();
    match codes.lookup(code) {
        Ok(entry) => format!(
            "ALARM condition detected: {} -> {} ({})",
            code, entry.event, entry.description
        ),
        Err(e) => {
            warn!("{} in [{}]; sending alarm without description", e, telegram);
            format!("ALARM condition detected: {}", code)
        }
    }
}

fn notify(targets: &DispatchTargets, priority: Priority, body: String) -> OutboundEffect {
    OutboundEffect::Notify {
        priority,
        title: targets.notify_title.clone(),
        body,
    }
}

fn status(targets: &DispatchTargets, value: u8) -> OutboundEffect {
    OutboundEffect::TelemetryPublish {
        topic: targets.status_topic.clone(),
        value: Telemetry::Status(value),
    }
}
