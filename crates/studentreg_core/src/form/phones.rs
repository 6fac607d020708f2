//! Phone number sub-editor scoped to one form session.

use super::{FormError, FormResult};

/// Ordered, uncommitted phone numbers. Duplicates and empty values are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneList {
    entries: Vec<String>,
}

impl PhoneList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(entries: Vec<String>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, phone: impl Into<String>) {
        self.entries.push(phone.into());
    }

    /// Replaces the value at `index` in place.
    pub fn edit(&mut self, index: usize, phone: impl Into<String>) -> FormResult<()> {
        let len = self.entries.len();
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(FormError::PhoneIndexOutOfRange { index, len })?;
        *slot = phone.into();
        Ok(())
    }

    /// Removes and returns the value at `index`, shifting later entries left.
    pub fn remove(&mut self, index: usize) -> FormResult<String> {
        if index >= self.entries.len() {
            return Err(FormError::PhoneIndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::PhoneList;
    use crate::form::FormError;

    #[test]
    fn push_edit_remove_leaves_no_residue() {
        let mut phones = PhoneList::new();
        phones.push("555-1000");
        phones.edit(0, "555-2000").unwrap();
        assert_eq!(phones.as_slice(), ["555-2000"]);

        assert_eq!(phones.remove(0).unwrap(), "555-2000");
        assert!(phones.is_empty());
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let mut phones = PhoneList::new();
        phones.push("1");
        phones.push("2");
        phones.push("1");
        phones.remove(0).unwrap();
        assert_eq!(phones.as_slice(), ["2", "1"]);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut phones = PhoneList::from_vec(vec!["1".to_string()]);
        assert_eq!(
            phones.edit(1, "x").unwrap_err(),
            FormError::PhoneIndexOutOfRange { index: 1, len: 1 }
        );
        assert!(phones.remove(3).is_err());
        assert_eq!(phones.as_slice(), ["1"]);
    }
}
