use std::collections::HashMap;

use na::Matrix3;

use crate::errors::{ElasticError, Result};

/// Inverse stretch and rotation of the undistorted environment of one primitive site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceEntry {
    pub strain_inv: Matrix3<f64>,
    pub rotation_inv: Matrix3<f64>,
}

/// Per-site reference frames, saved from a reference configuration and applied to later ones.
#[derive(Debug, Clone, Default)]
pub struct ReferenceState {
    entries: HashMap<usize, ReferenceEntry>,
}

impl ReferenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the entry for `site` unless one already exists. Returns whether it was stored.
    pub fn save(&mut self, site: usize, entry: ReferenceEntry) -> bool {
        if self.entries.contains_key(&site) {
            return false;
        }
        self.entries.insert(site, entry);
        true
    }

    pub fn get(&self, site: usize) -> Result<&ReferenceEntry> {
        self.entries
            .get(&site)
            .ok_or(ElasticError::MissingReference { site })
    }

    pub fn contains(&self, site: usize) -> bool {
        self.entries.contains_key(&site)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_saved_entry_wins() {
        let mut reference = ReferenceState::new();
        let first = ReferenceEntry {
            strain_inv: Matrix3::identity(),
            rotation_inv: Matrix3::identity(),
        };
        let second = ReferenceEntry {
            strain_inv: Matrix3::identity() * 2.0,
            rotation_inv: Matrix3::identity(),
        };

        assert!(reference.save(3, first));
        assert!(!reference.save(3, second));
        assert_eq!(reference.get(3).unwrap(), &first);
        assert_eq!(reference.len(), 1);
    }

    #[test]
    fn missing_site_is_an_error() {
        let reference = ReferenceState::new();
        assert!(matches!(
            reference.get(7),
            Err(ElasticError::MissingReference { site: 7 })
        ));
    }
}
