//! Core inventory types for headtrack.
//!
//! This module defines the data structures representing a tracked machine
//! head and the column values submitted when one is registered or edited.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp format used for the last-modified field of every record.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Spreadsheet column headers, in persisted and exported order.
pub const COLUMNS: [&str; 11] = [
    "Sr#",
    "Machine Type",
    "Brand",
    "Model",
    "Serial Number",
    "Head Number",
    "Current Location",
    "Handed Over to",
    "Accessories",
    "Previous Location",
    "TimeStamp",
];

/// One physical machine head.
///
/// Serialized field names match the spreadsheet column headers, so a
/// database file written by headtrack is directly readable as the exported
/// sheet's row layout. All fields are free text; `head_number` is the
/// operator-facing identifier and the (unenforced) natural key used by
/// lookup, move, edit, and remove.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRecord {
    /// Sequence number, assigned as `count + 1` at creation time.
    #[serde(rename = "Sr#", default)]
    pub sequence_number: String,

    /// Kind of machine (e.g. "Embroidery", "Overlock").
    #[serde(rename = "Machine Type", default)]
    pub machine_type: String,

    /// Manufacturer.
    #[serde(rename = "Brand", default)]
    pub brand: String,

    /// Model designation.
    #[serde(rename = "Model", default)]
    pub model: String,

    /// Manufacturer serial number.
    #[serde(rename = "Serial Number", default)]
    pub serial_number: String,

    /// Operator-facing head identifier; the natural lookup key.
    #[serde(rename = "Head Number", default)]
    pub head_number: String,

    /// Where the machine is right now.
    #[serde(rename = "Current Location", default)]
    pub current_location: String,

    /// Who received the machine on its last move.
    #[serde(rename = "Handed Over to", default)]
    pub handed_over_to: String,

    /// Accessories that accompanied the machine on its last move.
    #[serde(rename = "Accessories", default)]
    pub accessories: String,

    /// Location the machine occupied before its last move.
    #[serde(rename = "Previous Location", default)]
    pub previous_location: String,

    /// Last-modified time, `YYYY-MM-DD HH:MM:SS` local time.
    #[serde(rename = "TimeStamp", default)]
    pub timestamp: String,
}

impl MachineRecord {
    /// Build a new record from submitted column values.
    ///
    /// `sequence_number` and `timestamp` are system-assigned: the caller
    /// supplies the position-derived sequence number and the timestamp is
    /// set to the current local time.
    #[must_use]
    pub fn create(fields: MachineFields, sequence_number: String) -> Self {
        Self {
            sequence_number,
            machine_type: fields.machine_type,
            brand: fields.brand,
            model: fields.model,
            serial_number: fields.serial_number,
            head_number: fields.head_number,
            current_location: fields.current_location,
            handed_over_to: fields.handed_over_to,
            accessories: fields.accessories,
            previous_location: fields.previous_location,
            timestamp: now_stamp(),
        }
    }

    /// Case-insensitive head-number comparison.
    #[must_use]
    pub fn matches_head_number(&self, head_number: &str) -> bool {
        self.head_number.to_lowercase() == head_number.to_lowercase()
    }

    /// Refresh the last-modified timestamp to the current local time.
    pub fn touch(&mut self) {
        self.timestamp = now_stamp();
    }

    /// Field values in [`COLUMNS`] order, for export and page rendering.
    #[must_use]
    pub fn values(&self) -> [&str; 11] {
        [
            &self.sequence_number,
            &self.machine_type,
            &self.brand,
            &self.model,
            &self.serial_number,
            &self.head_number,
            &self.current_location,
            &self.handed_over_to,
            &self.accessories,
            &self.previous_location,
            &self.timestamp,
        ]
    }
}

/// Column values submitted when registering or editing a machine.
///
/// Covers every column except the system-assigned sequence number and
/// timestamp. Serialized names match the form field names the inventory
/// page posts, which are the column headers themselves. A missing or empty
/// field deserializes to `""`; on edit that means "leave the existing
/// value untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineFields {
    /// Kind of machine.
    #[serde(rename = "Machine Type", default)]
    pub machine_type: String,
    /// Manufacturer.
    #[serde(rename = "Brand", default)]
    pub brand: String,
    /// Model designation.
    #[serde(rename = "Model", default)]
    pub model: String,
    /// Manufacturer serial number.
    #[serde(rename = "Serial Number", default)]
    pub serial_number: String,
    /// Operator-facing head identifier.
    #[serde(rename = "Head Number", default)]
    pub head_number: String,
    /// Where the machine is right now.
    #[serde(rename = "Current Location", default)]
    pub current_location: String,
    /// Who currently holds the machine.
    #[serde(rename = "Handed Over to", default)]
    pub handed_over_to: String,
    /// Accessories accompanying the machine.
    #[serde(rename = "Accessories", default)]
    pub accessories: String,
    /// Location before the last move.
    #[serde(rename = "Previous Location", default)]
    pub previous_location: String,
}

/// Current local time formatted as [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn now_stamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
