// MIT License - Copyright (c) 2026 Peter Wright
// Contact ID telegram decoding

use std::fmt;

use crate::checksum::{fletcher16, to_wire};
use crate::constants::{
    CHECKSUM_LEN, CID_MARKER, EVENT_CODE_LEN, FIXED_FIELDS_LEN, FRAME_CLOSE, FRAME_OPEN,
    GROUP_LEN, QUALIFIER_LEN, SENSOR_LEN,
};
use crate::error::ParseError;

/// One decoded Contact ID message.
///
/// Only [`parse`] builds these, so a `Telegram` always carries a verified
/// checksum and a body that fits the fixed layout:
///
/// ```text
/// [<subscriber> 18<q:1><event:3><group:2><sensor:3><trailer>CCCC]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telegram {
    subscriber_id: String,
    qualifier: char,
    event_code: String,
    group: String,
    sensor: String,
    trailer: String,
    checksum: String,
}

impl Telegram {
    /// Account / panel identity, trimmed.
    pub fn subscriber_id(&self) -> &str {
        &self.subscriber_id
    }

    /// Event qualifier: `1` new event (disarm side), `3` restore (arm side).
    pub fn qualifier(&self) -> char {
        self.qualifier
    }

    /// Three-character event code as transmitted.
    pub fn event_code(&self) -> &str {
        &self.event_code
    }

    /// Event code as a number, if it is all digits.
    pub fn event_code_value(&self) -> Option<u16> {
        if self.event_code.bytes().all(|b| b.is_ascii_digit()) {
            self.event_code.parse().ok()
        } else {
            None
        }
    }

    /// Group / partition, two characters.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Zone / sensor, three characters.
    pub fn sensor(&self) -> &str {
        &self.sensor
    }

    /// Whatever follows the sensor field inside the body (usually empty).
    pub fn trailer(&self) -> &str {
        &self.trailer
    }

    /// The four hex characters transmitted before the closing bracket.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

impl fmt::Display for Telegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subscriber={} qualifier={} event={} group={} sensor={}",
            self.subscriber_id, self.qualifier, self.event_code, self.group, self.sensor
        )
    }
}

/// Decode and validate one raw datagram.
///
/// Order matters: framing, then checksum over the raw body bytes, and only
/// then the field layout. Nothing past a failed checksum is inspected.
pub fn parse(raw: &[u8]) -> Result<Telegram, ParseError> {
    let (body, transmitted) = split_frame(raw)?;

    let expected = fletcher16(body);
    let actual = parse_checksum(transmitted)?;
    if expected != actual {
        return Err(ParseError::ChecksumMismatch { expected, actual });
    }

    let body = std::str::from_utf8(body)
        .map_err(|_| ParseError::grammar("body is not valid UTF-8"))?;
    let mut telegram = parse_body(body)?;
    telegram.checksum = to_wire(actual);
    Ok(telegram)
}

/// Wrap a body in brackets with its checksum, as a panel would send it.
pub fn frame_body(body: &str) -> String {
    format!("[{}{}]", body, to_wire(fletcher16(body.as_bytes())))
}

/// Split `[body CCCC]` into body bytes and the checksum field.
fn split_frame(raw: &[u8]) -> Result<(&[u8], &[u8]), ParseError> {
    let raw = raw.trim_ascii();

    if raw.first() != Some(&FRAME_OPEN) {
        return Err(ParseError::framing("missing opening bracket"));
    }
    if raw.len() < 2 || raw.last() != Some(&FRAME_CLOSE) {
        return Err(ParseError::framing("missing closing bracket"));
    }

    let inner = &raw[1..raw.len() - 1];
    if inner.len() < CHECKSUM_LEN {
        return Err(ParseError::framing(format!(
            "{} bytes between brackets, need at least {} for the checksum",
            inner.len(),
            CHECKSUM_LEN
        )));
    }

    Ok(inner.split_at(inner.len() - CHECKSUM_LEN))
}

fn parse_checksum(field: &[u8]) -> Result<u16, ParseError> {
    if !field.iter().all(u8::is_ascii_hexdigit) {
        return Err(ParseError::framing(format!(
            "checksum field {:?} is not {} hex digits",
            String::from_utf8_lossy(field),
            CHECKSUM_LEN
        )));
    }
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| u16::from_str_radix(s, 16).ok())
        .ok_or_else(|| ParseError::framing("unreadable checksum field"))
}

/// Apply the fixed layout to a checksum-verified body.
///
/// The subscriber is free text, so the marker is taken as the last `" 18"`
/// that still leaves room for the fixed fields.
fn parse_body(body: &str) -> Result<Telegram, ParseError> {
    let marker_pos = body
        .rmatch_indices(CID_MARKER)
        .map(|(pos, _)| pos)
        .find(|&pos| body.len() - pos - CID_MARKER.len() >= FIXED_FIELDS_LEN)
        .ok_or_else(|| {
            ParseError::grammar(format!(
                "no '{}' marker followed by {} field characters",
                CID_MARKER.trim_start(),
                FIXED_FIELDS_LEN
            ))
        })?;

    // A blank account is accepted and trims to ""; a missing one is not
    if marker_pos == 0 {
        return Err(ParseError::grammar("no subscriber field before marker"));
    }
    let subscriber_id = body[..marker_pos].trim();

    let mut cursor = marker_pos + CID_MARKER.len();
    let qualifier = take_field(body, &mut cursor, QUALIFIER_LEN, "qualifier")?;
    let event_code = take_field(body, &mut cursor, EVENT_CODE_LEN, "event code")?.to_string();
    let group = take_field(body, &mut cursor, GROUP_LEN, "group")?.to_string();
    let sensor = take_field(body, &mut cursor, SENSOR_LEN, "sensor")?.to_string();

    let qualifier = qualifier
        .chars()
        .next()
        .ok_or_else(|| ParseError::grammar("missing qualifier"))?;
    let trailer = body
        .get(cursor..)
        .ok_or_else(|| ParseError::grammar("trailer starts inside a character"))?
        .to_string();

    Ok(Telegram {
        subscriber_id: subscriber_id.to_string(),
        qualifier,
        event_code,
        group,
        sensor,
        trailer,
        checksum: String::new(),
    })
}

/// Slice the next fixed-width field and advance the cursor.
fn take_field<'a>(
    body: &'a str,
    cursor: &mut usize,
    len: usize,
    name: &str,
) -> Result<&'a str, ParseError> {
    let field = body.get(*cursor..*cursor + len).ok_or_else(|| {
        ParseError::grammar(format!("{} field is not {} characters", name, len))
    })?;
    *cursor += len;
    Ok(field)
}
