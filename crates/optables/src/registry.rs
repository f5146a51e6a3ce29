// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Canonical class and vector-type registries.
//!
//! Both registries hand out small integer ids in first-seen order. Id 0 is
//! reserved for the `INVALID` sentinel, so the first entry gets id 1 and the
//! `LAST` sentinel is `len() + 1`.

use std::collections::HashMap;
use std::hash::Hash;

use opclass::{BaseType, Category, ResolvedType};

/// Key of the class registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassKey {
    pub category: Category,
    pub base_type: BaseType,
}

impl ClassKey {
    /// Inverse of [`RegistryKey::label`]: `Icls_FStdArith` -> (StdArith, Float).
    pub fn parse_label(label: &str, prefix: &str) -> Option<Self> {
        let rest = label.strip_prefix(prefix)?.strip_prefix('_')?;
        let mut chars = rest.chars();
        let base_type = chars.next().and_then(|c| match c {
            'I' => Some(BaseType::Integer),
            'F' => Some(BaseType::Float),
            'D' => Some(BaseType::Decimal),
            _ => None,
        })?;
        let category = Category::from_name(chars.as_str())?;
        Some(Self {
            category,
            base_type,
        })
    }
}

/// A registry key with a canonical label.
pub trait RegistryKey: Copy + Eq + Hash {
    fn label(&self, prefix: &str) -> String;
}

impl RegistryKey for ClassKey {
    /// `<prefix>_<base letter><category>`
    fn label(&self, prefix: &str) -> String {
        format!("{prefix}_{}{}", self.base_type.letter(), self.category.name())
    }
}

impl RegistryKey for ResolvedType {
    fn label(&self, prefix: &str) -> String {
        ResolvedType::label(self, prefix)
    }
}

/// A label already owned by a different key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub label: String,
    /// Id of the first-seen entry, which is kept.
    pub existing_id: u32,
}

/// First-seen-order interner.
#[derive(Debug, Clone)]
pub struct Interner<K> {
    prefix: String,
    entries: Vec<K>,
    labels: Vec<String>,
    by_key: HashMap<K, u32>,
    by_label: HashMap<String, u32>,
}

impl<K: RegistryKey> Interner<K> {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: Vec::new(),
            labels: Vec::new(),
            by_key: HashMap::new(),
            by_label: HashMap::new(),
        }
    }

    /// Return the id of `key`, registering it if it is new.
    ///
    /// # Errors
    ///
    /// [`Conflict`] if a different key already produced the same label. The
    /// first-seen entry is kept and its id is carried in the error.
    pub fn intern(&mut self, key: K) -> Result<u32, Conflict> {
        if let Some(&id) = self.by_key.get(&key) {
            return Ok(id);
        }

        let label = key.label(&self.prefix);
        if let Some(&existing_id) = self.by_label.get(&label) {
            return Err(Conflict {
                label,
                existing_id,
            });
        }

        self.entries.push(key);
        let id = self.entries.len() as u32;
        self.by_key.insert(key, id);
        self.by_label.insert(label.clone(), id);
        self.labels.push(label);
        Ok(id)
    }

    pub fn id(&self, key: &K) -> Option<u32> {
        self.by_key.get(key).copied()
    }

    /// Key registered under `id`.
    pub fn get(&self, id: u32) -> Option<&K> {
        (id as usize)
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
    }

    /// Number of distinct keys, sentinels excluded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id of the `LAST` sentinel.
    pub fn last_id(&self) -> u32 {
        self.entries.len() as u32 + 1
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Entry labels in id order, sentinels excluded.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Entry labels in id order, bracketed by the `INVALID` and `LAST` sentinels.
    pub fn labels_with_sentinels(&self) -> Vec<String> {
        std::iter::once(format!("{}_INVALID", self.prefix))
            .chain(self.labels.iter().cloned())
            .chain(std::iter::once(format!("{}_LAST", self.prefix)))
            .collect()
    }

    pub fn keys(&self) -> &[K] {
        &self.entries
    }
}

/// Class and vector-type registries of one generation run.
#[derive(Debug, Clone)]
pub struct Registry {
    pub classes: Interner<ClassKey>,
    pub vtypes: Interner<ResolvedType>,
}

impl Registry {
    pub fn new(class_prefix: &str, vtype_prefix: &str) -> Self {
        Self {
            classes: Interner::new(class_prefix),
            vtypes: Interner::new(vtype_prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(category: Category, base_type: BaseType) -> ClassKey {
        ClassKey {
            category,
            base_type,
        }
    }

    fn vtype(base_type: BaseType, bit_width: u32, lane_count: u32) -> ResolvedType {
        ResolvedType {
            base_type,
            bit_width,
            lane_count,
        }
    }

    #[test]
    fn ids_in_first_seen_order() {
        let mut classes = Interner::new("Icls");
        assert_eq!(classes.intern(class(Category::StdArith, BaseType::Float)), Ok(1));
        assert_eq!(classes.intern(class(Category::Shuffle, BaseType::Integer)), Ok(2));
        assert_eq!(classes.intern(class(Category::StdArith, BaseType::Float)), Ok(1));
        assert_eq!(classes.len(), 2);
        assert_eq!(classes.last_id(), 3);
        assert_eq!(classes.labels(), ["Icls_FStdArith", "Icls_IShuffle"]);
    }

    #[test]
    fn same_category_different_type_is_distinct() {
        let mut classes = Interner::new("Icls");
        let float = classes.intern(class(Category::StdArith, BaseType::Float));
        let int = classes.intern(class(Category::StdArith, BaseType::Integer));
        assert_ne!(float, int);
    }

    #[test]
    fn vtype_dedup() {
        let mut vtypes = Interner::new("Aty");
        let a = vtypes.intern(vtype(BaseType::Float, 32, 4)).unwrap();
        let b = vtypes.intern(vtype(BaseType::Integer, 32, 4)).unwrap();
        let c = vtypes.intern(vtype(BaseType::Float, 32, 4)).unwrap();
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(vtypes.labels(), ["Aty_F32x4", "Aty_I32x4"]);
        assert_eq!(vtypes.get(a), Some(&vtype(BaseType::Float, 32, 4)));
        assert_eq!(vtypes.get(0), None);
    }

    #[test]
    fn sentinels_bracket_labels() {
        let mut classes = Interner::new("Icls");
        classes.intern(class(Category::Count, BaseType::Integer)).unwrap();
        assert_eq!(
            classes.labels_with_sentinels(),
            ["Icls_INVALID", "Icls_ICount", "Icls_LAST"]
        );
    }

    #[test]
    fn label_collision_keeps_first_entry() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        struct Lossy(u32);

        impl RegistryKey for Lossy {
            fn label(&self, prefix: &str) -> String {
                format!("{prefix}_{}", self.0 / 10)
            }
        }

        let mut interner = Interner::new("T");
        assert_eq!(interner.intern(Lossy(11)), Ok(1));
        assert_eq!(
            interner.intern(Lossy(12)),
            Err(Conflict {
                label: "T_1".into(),
                existing_id: 1,
            })
        );
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn class_label_round_trip() {
        for category in Category::ALL {
            for base_type in [BaseType::Integer, BaseType::Float, BaseType::Decimal] {
                let key = class(category, base_type);
                assert_eq!(ClassKey::parse_label(&key.label("Icls"), "Icls"), Some(key));
            }
        }
        assert_eq!(ClassKey::parse_label("Icls_XStdArith", "Icls"), None);
        assert_eq!(ClassKey::parse_label("Icls_FNope", "Icls"), None);
        assert_eq!(ClassKey::parse_label("Aty_FStdArith", "Icls"), None);
    }
}
