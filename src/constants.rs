// MIT License - Copyright (c) 2026 Peter Wright
// Contact ID protocol constants

/// Protocol framing bytes.
pub const FRAME_OPEN: u8 = b'['; // Start of datagram
pub const FRAME_CLOSE: u8 = b']'; // End of datagram
pub const ACK: u8 = 0x06; // Acknowledge, written once per datagram

/// Width of the hex checksum that precedes the closing bracket.
pub const CHECKSUM_LEN: usize = 4;

/// Message-type marker for Contact ID over this transport, preceded by a space.
pub const CID_MARKER: &str = " 18";

/// Field widths following the marker: qualifier, event code, group, sensor.
pub const QUALIFIER_LEN: usize = 1;
pub const EVENT_CODE_LEN: usize = 3;
pub const GROUP_LEN: usize = 2;
pub const SENSOR_LEN: usize = 3;

/// Bytes that must follow [`CID_MARKER`] for the fixed fields to fit.
pub const FIXED_FIELDS_LEN: usize = QUALIFIER_LEN + EVENT_CODE_LEN + GROUP_LEN + SENSOR_LEN;

/// Qualifier values. Only `NEW_EVENT` selects the disarm path; anything else arms.
pub const QUALIFIER_NEW_EVENT: char = '1'; // Open / disarm
pub const QUALIFIER_RESTORE: char = '3'; // Close / arm

// The three code sets below are spelled out again as patterns in
// `event::classify_code`. Change both together; `event` tests check they agree.

/// Open/close reports (arm or disarm, direction given by the qualifier).
pub const ARM_DISARM_CODES: [u16; 7] = [400, 401, 402, 403, 404, 407, 409];

/// Alarm conditions that raise a high-priority notification.
pub const ALARM_CODES: [u16; 27] = [
    101, 110, 111, 112, 113, 114, 117, 120, 122, 123, 129, 130, 131, 132, 133, 134, 136, 137,
    139, 140, 141, 142, 144, 145, 146, 147, 150,
];

/// Manual and periodic test reports.
pub const TEST_REPORT_CODES: [u16; 2] = [601, 602];

/// Telemetry status values published on the status topic.
pub const STATUS_ARMED: u8 = 10;
pub const STATUS_DISARMED: u8 = 50;
pub const STATUS_ALARM: u8 = 99;

/// Telemetry value published on the ping topic for a test report.
pub const PING: u8 = 1;

/// Default cap on a single datagram; longer input is cut and dropped as malformed.
pub const DEFAULT_MAX_DATAGRAM_LEN: usize = 1024;

/// Read buffer size for the per-connection loop.
pub const READ_BUF_LEN: usize = 4096;
