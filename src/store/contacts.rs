//! Contact records in the session cache.
//!
//! Deleting a contact cascades: its id is removed from every task's
//! assignees in the same write.

use super::DataStore;
use crate::contacts::assign_colors;
use crate::error::JoinResult;
use crate::types::{CollectionKind, Contact};
use tracing::{debug, info};

impl DataStore {
    /// Create a contact with its badge color fixed at creation.
    pub async fn create_contact(&mut self, mut contact: Contact) -> JoinResult<Contact> {
        if contact.color.is_none() {
            let mut all = self.get_contacts();
            all.push(contact.clone());
            assign_colors(&mut all);
            contact.color = all.pop().and_then(|c| c.color);
        }

        let mut contacts = self.contacts();
        let key = self
            .new_key(CollectionKind::Contacts, &contact, |k| contacts.contains_key(k))
            .await;
        contact.id = key.clone();
        contacts.insert(key, contact.clone());
        self.update_contacts(contacts)?;
        info!(contact_id = %contact.id, "Contact created");
        Ok(contact)
    }

    /// Edit name, email and phone of a contact. Its color is kept.
    ///
    /// Returns `false` when no contact has this id.
    pub fn edit_contact(
        &mut self,
        contact_id: &str,
        name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> JoinResult<bool> {
        let mut contacts = self.contacts();
        let Some(contact) = contacts.get_mut(contact_id) else {
            debug!(contact_id = %contact_id, "Edit of unknown contact ignored");
            return Ok(false);
        };
        contact.name = name.trim().to_string();
        contact.email = email.trim().to_string();
        contact.phone = phone.map(str::trim).filter(|p| !p.is_empty()).map(str::to_string);
        self.update_contacts(contacts)?;
        Ok(true)
    }

    /// Delete a contact and unassign it from every task.
    ///
    /// Returns `false` when no contact has this id.
    pub fn delete_contact(&mut self, contact_id: &str) -> JoinResult<bool> {
        let mut next = self.cache.clone();
        let removed = next
            .contacts
            .as_mut()
            .and_then(|contacts| contacts.remove(contact_id));
        if removed.is_none() {
            debug!(contact_id = %contact_id, "Delete of unknown contact ignored");
            return Ok(false);
        }

        let mut unassigned = 0;
        for task in next.tasks.iter_mut().flat_map(|tasks| tasks.values_mut()) {
            let before = task.assigned_to.len();
            task.assigned_to.retain(|id| id != contact_id);
            unassigned += before - task.assigned_to.len();
        }

        self.commit(next)?;
        info!(contact_id = %contact_id, unassigned, "Contact deleted");
        Ok(true)
    }
}
