//! Directory entry to contact mapping.

use tracing::debug;

use xavyo_contacts::{
    AuthenticatedUser, Contact, ContactsError, ContactsResult, PrimaryEmail, StorageType,
};

use crate::config::TeamDirectoryConfig;
use crate::entry::RawEntry;

/// The entry's identifier value; entries without one cannot be addressed.
fn entry_uid<'a>(config: &TeamDirectoryConfig, entry: &'a RawEntry) -> ContactsResult<&'a str> {
    entry
        .first(&config.uid_field)
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| ContactsError::EntryMissingUid {
            dn: entry.dn().to_string(),
            attribute: config.uid_field.clone(),
        })
}

fn uid_or_skip<'a>(config: &TeamDirectoryConfig, entry: &'a RawEntry) -> Option<&'a str> {
    match entry_uid(config, entry) {
        Ok(uid) => Some(uid),
        Err(e) => {
            debug!(error = %e, "Skipping directory entry");
            None
        }
    }
}

/// Whether values of `attribute` must be usable addresses.
fn requires_address(config: &TeamDirectoryConfig, attribute: &str) -> bool {
    config.skip_empty_email
        && !config.email_field.is_empty()
        && attribute.eq_ignore_ascii_case(&config.email_field)
}

/// The value of `attribute` a contact field takes.
///
/// The server matches `(<email>=*@*)` against any value of a multi-valued
/// attribute, so the e-mail attribute yields its first value holding an `@`
/// rather than its first value.
fn attribute_value<'a>(
    config: &TeamDirectoryConfig,
    entry: &'a RawEntry,
    attribute: &str,
) -> Option<&'a str> {
    let mut values = entry.get(attribute)?.iter().map(String::as_str);
    if requires_address(config, attribute) {
        values.find(|value| value.contains('@'))
    } else {
        values.next()
    }
}

fn has_usable_address(config: &TeamDirectoryConfig, entry: &RawEntry) -> bool {
    if !requires_address(config, &config.email_field) {
        return true;
    }
    let usable = attribute_value(config, entry, &config.email_field).is_some();
    if !usable {
        debug!(dn = entry.dn(), "Skipping directory entry without a usable address");
    }
    usable
}

/// Build the full contact record for a single-contact fetch.
///
/// Mappings apply in configured order and a field, once filled, is never
/// overwritten by a later mapping.
pub fn map_entry(
    config: &TeamDirectoryConfig,
    entry: &RawEntry,
    user: &AuthenticatedUser,
) -> Option<Contact> {
    let uid = uid_or_skip(config, entry)?;
    if !has_usable_address(config, entry) {
        return None;
    }

    let mut contact = Contact::new(uid, StorageType::Team);
    contact.id_user = Some(user.id);
    contact.read_only = true;
    contact.global = true;
    contact.use_friendly_name = true;
    contact.primary_email = Some(PrimaryEmail::Business);

    for mapping in &config.contact_map {
        let Some(value) = attribute_value(config, entry, &mapping.attribute) else {
            continue;
        };
        let target = contact.field_mut(mapping.field);
        if target.is_empty() {
            *target = value.to_string();
        }
    }

    contact.view_email = contact.preferred_email().to_string();
    contact.its_me = user.is_own_address(&contact.view_email, config.own_address);

    Some(contact)
}

/// Build the reduced record used for contact list rows.
pub fn map_list_entry(
    config: &TeamDirectoryConfig,
    entry: &RawEntry,
    user: &AuthenticatedUser,
) -> Option<Contact> {
    let uid = uid_or_skip(config, entry)?;
    if !has_usable_address(config, entry) {
        return None;
    }

    let mut contact = Contact::new(uid, StorageType::Team);
    contact.full_name = entry.first(&config.name_field).unwrap_or_default().to_string();
    contact.view_email = attribute_value(config, entry, &config.email_field)
        .unwrap_or_default()
        .to_string();
    contact.its_me = user.is_own_address(&contact.view_email, config.own_address);

    Some(contact)
}
