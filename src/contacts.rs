//! Contact directory helpers: badge colors, initials, grouping and lookup.

use crate::types::Contact;
use std::collections::{BTreeMap, HashSet};

/// Theme colors handed out to contacts, in assignment order.
pub const PALETTE: [&str; 15] = [
    "#FF7A00", "#FF5EB3", "#6E52FF", "#9327FF", "#00BEE8", "#1FD7C1", "#FF745E", "#FFA35E",
    "#FC71FF", "#FFC701", "#0038FF", "#C3FF2B", "#FFE62B", "#FF4646", "#FFBB2B",
];

/// Initials shown when a name has no letters to take.
pub const FALLBACK_INITIALS: &str = "?";

/// Give every contact without a color one from [`PALETTE`].
///
/// Contacts are walked in slice order. A contact at position `i` takes the first
/// palette color not already in use, searching from slot `i`; once every color
/// is taken it falls back to slot `i` (wrapping). Existing colors are never
/// touched, so calling this again is a no-op.
///
/// Returns the number of contacts that were colored.
pub fn assign_colors(contacts: &mut [Contact]) -> usize {
    let mut used: HashSet<String> = contacts
        .iter()
        .filter_map(|c| c.color.as_ref())
        .map(|c| c.to_uppercase())
        .collect();

    let mut assigned = 0;
    for (i, contact) in contacts.iter_mut().enumerate() {
        if contact.color.as_deref().is_some_and(|c| !c.trim().is_empty()) {
            continue;
        }
        let start = i % PALETTE.len();
        let color = (0..PALETTE.len())
            .map(|offset| PALETTE[(start + offset) % PALETTE.len()])
            .find(|candidate| !used.contains(*candidate))
            .unwrap_or(PALETTE[start]);
        used.insert(color.to_string());
        contact.color = Some(color.to_string());
        assigned += 1;
    }
    assigned
}

/// Two-letter badge text for a name.
///
/// First letter of the first and last word; the first two letters for a
/// single word; [`FALLBACK_INITIALS`] for an empty name.
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let letters: String = match words.as_slice() {
        [] => return FALLBACK_INITIALS.to_string(),
        [only] => only.chars().take(2).collect(),
        [first, .., last] => first.chars().take(1).chain(last.chars().take(1)).collect(),
    };
    letters.to_uppercase()
}

/// Group contacts by the uppercase first letter of their name, sorted by name
/// within each group.
pub fn group_by_letter(contacts: &[Contact]) -> BTreeMap<char, Vec<Contact>> {
    let mut groups: BTreeMap<char, Vec<Contact>> = BTreeMap::new();
    for contact in contacts {
        let letter = contact
            .name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('#');
        groups.entry(letter).or_default().push(contact.clone());
    }
    for group in groups.values_mut() {
        group.sort_by_key(|c| c.name.to_lowercase());
    }
    groups
}

/// Contacts whose name contains `query`, case-insensitively. A blank query keeps all.
pub fn filter_by_name<'a>(contacts: &'a [Contact], query: &str) -> Vec<&'a Contact> {
    let needle = query.trim().to_lowercase();
    contacts
        .iter()
        .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle))
        .collect()
}

/// Look up a contact by id.
pub fn find<'a>(contacts: &'a [Contact], id: &str) -> Option<&'a Contact> {
    contacts.iter().find(|c| c.id == id)
}

/// Resolve assignee ids to contacts, skipping ids that no longer exist.
pub fn resolve_assignees<'a>(contacts: &'a [Contact], ids: &[String]) -> Vec<&'a Contact> {
    ids.iter().filter_map(|id| find(contacts, id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: &str, name: &str, color: Option<&str>) -> Contact {
        Contact {
            id: id.into(),
            name: name.into(),
            email: format!("{}@example.com", id),
            phone: None,
            color: color.map(str::to_string),
        }
    }

    #[test]
    fn initials_cover_word_counts() {
        assert_eq!(initials("Anton Mayer"), "AM");
        assert_eq!(initials("anja maria schulz"), "AS");
        assert_eq!(initials("Eva"), "EV");
        assert_eq!(initials("E"), "E");
        assert_eq!(initials("   "), FALLBACK_INITIALS);
    }

    #[test]
    fn assign_colors_skips_colored_contacts() {
        let mut contacts = vec![
            contact("c1", "Anton", None),
            contact("c2", "Benedikt", Some("#FF7A00")),
            contact("c3", "Clara", None),
        ];
        let assigned = assign_colors(&mut contacts);
        assert_eq!(assigned, 2);
        assert_eq!(contacts[1].color.as_deref(), Some("#FF7A00"));
        // Slot 0 is taken by c2, so c1 moves on to the next free slot.
        assert_eq!(contacts[0].color.as_deref(), Some(PALETTE[1]));
        assert_eq!(contacts[2].color.as_deref(), Some(PALETTE[2]));
    }

    #[test]
    fn assign_colors_is_idempotent() {
        let mut contacts: Vec<Contact> = (0..20)
            .map(|i| contact(&format!("c{}", i), "Name", None))
            .collect();
        assign_colors(&mut contacts);
        let first: Vec<_> = contacts.iter().map(|c| c.color.clone()).collect();
        assert_eq!(assign_colors(&mut contacts), 0);
        let second: Vec<_> = contacts.iter().map(|c| c.color.clone()).collect();
        assert_eq!(first, second);
        // More contacts than colors wraps around the palette.
        assert_eq!(contacts[15].color.as_deref(), Some(PALETTE[0]));
    }

    #[test]
    fn group_by_letter_sorts_within_group() {
        let contacts = vec![
            contact("c1", "berta", None),
            contact("c2", "Anna", None),
            contact("c3", "Bernd", None),
        ];
        let groups = group_by_letter(&contacts);
        let keys: Vec<char> = groups.keys().copied().collect();
        assert_eq!(keys, vec!['A', 'B']);
        let b: Vec<&str> = groups[&'B'].iter().map(|c| c.name.as_str()).collect();
        assert_eq!(b, vec!["Bernd", "berta"]);
    }

    #[test]
    fn resolve_assignees_skips_unknown_ids() {
        let contacts = vec![contact("c1", "Anna", None)];
        let ids = vec!["c1".to_string(), "gone".to_string()];
        let resolved = resolve_assignees(&contacts, &ids);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "c1");
    }

    #[test]
    fn filter_by_name_is_case_insensitive() {
        let contacts = vec![contact("c1", "Anna Berg", None), contact("c2", "Tom", None)];
        assert_eq!(filter_by_name(&contacts, "BERG").len(), 1);
        assert_eq!(filter_by_name(&contacts, "").len(), 2);
    }
}
