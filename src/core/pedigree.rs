//! Fixed-shape ancestor tree for a dog.
//!
//! The tree always has 15 slots in breadth-first heap order: slot 0 is the
//! dog itself, the father of slot `i` sits at `2i + 1` and the mother at
//! `2i + 2`. Unknown ancestors become placeholders and are never descended.

use crate::domain::model::{Color, Dog, Sex};
use chrono::NaiveDate;

/// Ancestor generations below the dog itself.
pub const PEDIGREE_DEPTH: usize = 3;
/// 1 + 2 + 4 + 8.
pub const PEDIGREE_SLOTS: usize = (1 << (PEDIGREE_DEPTH + 1)) - 1;
pub const NO_DATA_LABEL: &str = "no data available";

/// Position of a slot in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotPosition(usize);

impl SlotPosition {
    pub const SUBJECT: SlotPosition = SlotPosition(0);

    pub fn new(index: usize) -> Option<Self> {
        (index < PEDIGREE_SLOTS).then_some(Self(index))
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// 0 for the dog, 1 for parents, 2 for grandparents, 3 for great-grandparents.
    pub fn generation(self) -> usize {
        (usize::BITS - (self.0 + 1).leading_zeros() - 1) as usize
    }

    pub fn father(self) -> Option<Self> {
        Self::new(2 * self.0 + 1)
    }

    pub fn mother(self) -> Option<Self> {
        Self::new(2 * self.0 + 2)
    }

    /// Sire (`true`) or dam (`false`) line steps from the dog down to this slot.
    fn lineage(self) -> Vec<bool> {
        let mut steps = Vec::with_capacity(PEDIGREE_DEPTH);
        let mut index = self.0;
        while index > 0 {
            steps.push(index % 2 == 1);
            index = (index - 1) / 2;
        }
        steps.reverse();
        steps
    }

    /// Human-readable relation, e.g. "Father's mother".
    pub fn relation_label(self) -> String {
        let steps = self.lineage();
        if steps.is_empty() {
            return "Self".to_string();
        }
        let words: Vec<&str> = steps
            .iter()
            .map(|is_father| if *is_father { "father" } else { "mother" })
            .collect();
        let mut label = words.join("'s ");
        if let Some(first) = label.get_mut(..1) {
            first.make_ascii_uppercase();
        }
        label
    }
}

/// The data a present pedigree node exposes.
#[derive(Debug, Clone, PartialEq)]
pub struct PedigreeNode {
    pub id: String,
    pub display_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub sex: Option<Sex>,
    pub color: Option<Color>,
}

impl From<&Dog> for PedigreeNode {
    fn from(dog: &Dog) -> Self {
        Self {
            id: dog.id.clone(),
            display_name: dog.display_name().to_string(),
            date_of_birth: dog.date_of_birth,
            date_of_death: dog.date_of_death,
            sex: dog.sex,
            color: dog.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PedigreeSlot {
    Known(PedigreeNode),
    Missing { label: String },
}

impl PedigreeSlot {
    pub fn node(&self) -> Option<&PedigreeNode> {
        match self {
            PedigreeSlot::Known(node) => Some(node),
            PedigreeSlot::Missing { .. } => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, PedigreeSlot::Known(_))
    }

    /// Display name of a known node, otherwise the placeholder label.
    pub fn label(&self) -> &str {
        match self {
            PedigreeSlot::Known(node) => &node.display_name,
            PedigreeSlot::Missing { label } => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PedigreeEntry {
    pub position: SlotPosition,
    pub relation: String,
    pub slot: PedigreeSlot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PedigreeTree {
    entries: Vec<PedigreeEntry>,
}

impl PedigreeTree {
    pub fn get(&self, position: SlotPosition) -> &PedigreeEntry {
        &self.entries[position.index()]
    }

    pub fn subject(&self) -> &PedigreeEntry {
        self.get(SlotPosition::SUBJECT)
    }

    /// Slots of one generation, sire line first.
    pub fn generation(&self, generation: usize) -> &[PedigreeEntry] {
        if generation > PEDIGREE_DEPTH {
            return &[];
        }
        let start = (1 << generation) - 1;
        let end = (1 << (generation + 1)) - 1;
        &self.entries[start..end]
    }

    pub fn known_count(&self) -> usize {
        self.entries.iter().filter(|e| e.slot.is_known()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PedigreeEntry> {
        self.entries.iter()
    }
}

/// Walks the inline parent references of `dog` into the fixed 15-slot tree.
///
/// Ancestors beyond the third generation are ignored.
pub fn resolve_pedigree(dog: &Dog) -> PedigreeTree {
    let mut sources: Vec<Option<&Dog>> = Vec::with_capacity(PEDIGREE_SLOTS);
    sources.push(Some(dog));
    for index in 1..PEDIGREE_SLOTS {
        let child = sources[(index - 1) / 2];
        let parent = if index % 2 == 1 {
            child.and_then(|d| d.father.as_deref())
        } else {
            child.and_then(|d| d.mother.as_deref())
        };
        sources.push(parent);
    }

    let entries = sources
        .into_iter()
        .enumerate()
        .map(|(index, source)| {
            let position = SlotPosition(index);
            let slot = match source {
                Some(dog) => PedigreeSlot::Known(PedigreeNode::from(dog)),
                None => PedigreeSlot::Missing {
                    label: NO_DATA_LABEL.to_string(),
                },
            };
            PedigreeEntry {
                position,
                relation: position.relation_label(),
                slot,
            }
        })
        .collect();

    PedigreeTree { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog(name: &str) -> Dog {
        Dog {
            id: name.to_lowercase(),
            full_kennel_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn with_parents(mut child: Dog, father: Option<Dog>, mother: Option<Dog>) -> Dog {
        child.father = father.map(Box::new);
        child.mother = mother.map(Box::new);
        child
    }

    fn pos(index: usize) -> SlotPosition {
        SlotPosition::new(index).unwrap()
    }

    #[test]
    fn test_orphan_yields_full_tree() {
        let tree = resolve_pedigree(&Dog::default());

        assert_eq!(tree.len(), PEDIGREE_SLOTS);
        assert_eq!(tree.known_count(), 1);
        assert_eq!(tree.subject().slot.label(), "Unknown");
        assert!(tree.iter().skip(1).all(|e| e.slot.label() == NO_DATA_LABEL));
        assert_eq!(tree.generation(3).len(), 8);
        assert!(tree.generation(4).is_empty());
    }

    #[test]
    fn test_display_name_fallback() {
        let father = Dog {
            given_name: Some("Rex".to_string()),
            ..Default::default()
        };
        let tree = resolve_pedigree(&with_parents(dog("Pup"), Some(father), Some(Dog::default())));

        assert_eq!(tree.get(pos(1)).slot.label(), "Rex");
        assert_eq!(tree.get(pos(2)).slot.label(), "Unknown");
        assert!(tree.get(pos(2)).slot.is_known());
    }

    #[test]
    fn test_pedigree_gap_on_sire_line() {
        let bella = dog("Bella");
        let subject = with_parents(dog("Pup"), None, Some(bella));
        let tree = resolve_pedigree(&subject);

        // Father (1) and his line (3, 4, 7..=10) are placeholders.
        for index in [1, 3, 4, 7, 8, 9, 10] {
            assert!(!tree.get(pos(index)).slot.is_known(), "slot {index}");
        }
        assert_eq!(tree.get(pos(2)).slot.label(), "Bella");
        assert!(!tree.get(pos(5)).slot.is_known());
        assert!(!tree.get(pos(6)).slot.is_known());
        assert_eq!(tree.known_count(), 2);
    }

    #[test]
    fn test_ancestors_beyond_depth_are_ignored() {
        let great_great = dog("Too Old");
        let great = with_parents(dog("Great"), Some(great_great), None);
        let grand = with_parents(dog("Grand"), Some(great), None);
        let father = with_parents(dog("Father"), Some(grand), None);
        let tree = resolve_pedigree(&with_parents(dog("Pup"), Some(father), None));

        assert_eq!(tree.len(), PEDIGREE_SLOTS);
        assert_eq!(tree.get(pos(7)).slot.label(), "Great");
        assert!(tree.iter().all(|e| e.slot.label() != "Too Old"));
    }

    #[test]
    fn test_positions_and_relations() {
        assert_eq!(pos(0).generation(), 0);
        assert_eq!(pos(2).generation(), 1);
        assert_eq!(pos(6).generation(), 2);
        assert_eq!(pos(14).generation(), 3);
        assert_eq!(pos(6).father(), Some(pos(13)));
        assert_eq!(pos(2).mother(), Some(pos(6)));
        assert_eq!(pos(7).father(), None);

        assert_eq!(pos(0).relation_label(), "Self");
        assert_eq!(pos(4).relation_label(), "Father's mother");
        assert_eq!(pos(11).relation_label(), "Mother's father's father");
        assert_eq!(SlotPosition::new(15), None);
    }
}
