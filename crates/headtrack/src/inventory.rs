//! Inventory operations for headtrack.
//!
//! Every operation here works over the full record list: lookups scan the
//! snapshot a caller already loaded, and mutations run inside
//! [`Store::update`] so the load-mutate-save cycle is serialized and the
//! whole file is rewritten once per request.
//!
//! Head-number matching is case-insensitive everywhere, including remove.
//! Edit and remove report success even when nothing matched; move reports
//! not-found and leaves the file untouched.

use tracing::info;

use crate::error::{Error, Result};
use crate::record::{MachineFields, MachineRecord};
use crate::store::Store;

/// A location/custody change request for one machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveRequest {
    /// Head number of the machine being moved.
    pub head_number: String,
    /// Where the machine is going.
    pub new_location: String,
    /// Who received the machine.
    pub handed_over_to: String,
    /// Accessories that went with it.
    pub accessories: String,
}

/// Case-insensitive substring filters for a partial export.
///
/// All four filters must match; an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportFilter {
    /// Substring of the head number.
    pub head_number: String,
    /// Substring of the current location.
    pub location: String,
    /// Substring of the serial number.
    pub serial_number: String,
    /// Substring of the model.
    pub model: String,
}

impl ExportFilter {
    /// Check a record against all four filters.
    #[must_use]
    pub fn matches(&self, record: &MachineRecord) -> bool {
        contains_ci(&record.head_number, &self.head_number)
            && contains_ci(&record.current_location, &self.location)
            && contains_ci(&record.serial_number, &self.serial_number)
            && contains_ci(&record.model, &self.model)
    }
}

/// Case-insensitive substring test; an empty needle always matches.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Find the first record matching the head number, case-insensitively.
#[must_use]
pub fn find<'a>(records: &'a [MachineRecord], head_number: &str) -> Option<&'a MachineRecord> {
    records
        .iter()
        .find(|record| record.matches_head_number(head_number))
}

/// Register a new machine.
///
/// The sequence number is assigned as the pre-insert record count plus
/// one, rendered as a string; the timestamp is set to now. No head-number
/// uniqueness check is performed. Returns the created record.
///
/// # Errors
///
/// Returns an error if the store cannot be saved.
pub fn add(store: &Store, fields: MachineFields) -> Result<MachineRecord> {
    let record = store.update(|records| {
        let sequence_number = (records.len() + 1).to_string();
        let record = MachineRecord::create(fields, sequence_number);
        records.push(record.clone());
        Ok(record)
    })?;

    info!("Registered machine head {}", record.head_number);
    Ok(record)
}

/// Edit the first record matching the head number.
///
/// Each non-empty field in `updates` overwrites the corresponding
/// attribute; empty fields leave the existing value untouched. The
/// timestamp is refreshed. When nothing matches, the unchanged inventory
/// is still written back and the call still succeeds.
///
/// # Errors
///
/// Returns an error if the store cannot be saved.
pub fn edit(store: &Store, head_number: &str, updates: &MachineFields) -> Result<()> {
    store.update(|records| {
        if let Some(record) = records
            .iter_mut()
            .find(|record| record.matches_head_number(head_number))
        {
            apply_updates(record, updates);
            record.touch();
        }
        Ok(())
    })
}

/// Overwrite each attribute for which a non-empty update was provided.
fn apply_updates(record: &mut MachineRecord, updates: &MachineFields) {
    let pairs: [(&mut String, &String); 9] = [
        (&mut record.machine_type, &updates.machine_type),
        (&mut record.brand, &updates.brand),
        (&mut record.model, &updates.model),
        (&mut record.serial_number, &updates.serial_number),
        (&mut record.head_number, &updates.head_number),
        (&mut record.current_location, &updates.current_location),
        (&mut record.handed_over_to, &updates.handed_over_to),
        (&mut record.accessories, &updates.accessories),
        (&mut record.previous_location, &updates.previous_location),
    ];
    for (field, update) in pairs {
        if !update.is_empty() {
            field.clone_from(update);
        }
    }
}

/// Record a change of location and custody for one machine.
///
/// The first case-insensitive match gets its previous location set to the
/// old current location, the new location and custody fields written
/// unconditionally (empty values included), and its timestamp refreshed.
///
/// # Errors
///
/// Returns [`Error::MachineNotFound`] if no record matches — in that case
/// nothing is written back — or an error if the store cannot be saved.
pub fn move_machine(store: &Store, request: &MoveRequest) -> Result<()> {
    store.update(|records| {
        let record = records
            .iter_mut()
            .find(|record| record.matches_head_number(&request.head_number))
            .ok_or_else(|| Error::machine_not_found(&request.head_number))?;

        record.previous_location = std::mem::take(&mut record.current_location);
        record.current_location = request.new_location.clone();
        record.handed_over_to = request.handed_over_to.clone();
        record.accessories = request.accessories.clone();
        record.touch();

        info!(
            "Moved machine head {} to {}",
            record.head_number, record.current_location
        );
        Ok(())
    })
}

/// Remove every record matching the head number, case-insensitively.
///
/// The inventory is written back unconditionally and the call succeeds
/// even when zero records were removed. Returns the number removed.
///
/// # Errors
///
/// Returns an error if the store cannot be saved.
pub fn remove(store: &Store, head_number: &str) -> Result<usize> {
    store.update(|records| {
        let before = records.len();
        records.retain(|record| !record.matches_head_number(head_number));
        let removed = before - records.len();

        if removed > 0 {
            info!("Removed {removed} record(s) for machine head {head_number}");
        }
        Ok(removed)
    })
}

/// Select the records matching an export filter.
#[must_use]
pub fn filter(records: &[MachineRecord], filter: &ExportFilter) -> Vec<MachineRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}
