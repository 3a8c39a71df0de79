use std::collections::HashSet;

use itertools::Itertools;

use crate::entity::{EdgeMark, Entity, EntityError, EntityRecord};

/// Reasons a puzzle file cannot be loaded.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum PuzzleError {
    /// Not a JSON array of records.
    #[display("malformed puzzle JSON: {_0}")]
    Json(serde_json::Error),
    /// One record could not be understood.
    #[display("record {index}: {source}")]
    #[from(ignore)]
    Entity {
        /// Position of the record in the array.
        index: usize,
        /// What was wrong with it.
        source: EntityError,
    },
}

/// An ordered collection of placed entities.
///
/// Solving and deduction borrow [`Self::entities`] as an immutable snapshot; the editing methods here are the only way the collection changes.
/// Like a builder, editing methods mutate in place and return `&mut Self` so they can be chained.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Puzzle {
    entities: Vec<Entity>,
}

impl Puzzle {
    /// A puzzle holding `entities` in the given order.
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// The entities, in drawing order once placed through [`Self::place`].
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Whether there is nothing to solve.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Parse a JSON array of puzzle records.
    pub fn from_json(json: &str) -> Result<Self, PuzzleError> {
        let records: Vec<EntityRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Convert decoded records, failing on the first one that is invalid.
    pub fn from_records(records: Vec<EntityRecord>) -> Result<Self, PuzzleError> {
        let entities = records.into_iter()
            .enumerate()
            .map(|(index, record)| Entity::try_from(record).map_err(|source| PuzzleError::Entity { index, source }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(entities))
    }

    /// The on-disk form of every entity.
    pub fn to_records(&self) -> Vec<EntityRecord> {
        self.entities.iter().map(EntityRecord::from).collect()
    }

    /// Serialize as a JSON array of records.
    pub fn to_json(&self) -> Result<String, PuzzleError> {
        Ok(serde_json::to_string(&self.to_records())?)
    }

    /// Place `entity`, replacing whatever shares its location and layer.
    ///
    /// Entities are kept ordered by z-index; placement order breaks ties.
    pub fn place(&mut self, entity: Entity) -> &mut Self {
        let slot = entity.slot();
        self.entities.retain(|existing| existing.slot() != slot);
        self.entities.push(entity);
        self.entities.sort_by_key(|e| e.capabilities().z_index);

        self
    }

    /// Remove every line and cross, keeping the puzzle itself.
    pub fn wipe_hints(&mut self) -> &mut Self {
        self.entities.retain(|e| !matches!(e, Entity::LineHint { .. }));
        self
    }

    /// Remove every entity.
    pub fn clear(&mut self) -> &mut Self {
        self.entities.clear();
        self
    }

    /// Place every mark not already present, returning how many were new.
    ///
    /// A mark on an edge already carrying the opposite style replaces it.
    pub fn merge_marks(&mut self, marks: &[EdgeMark]) -> usize {
        let existing: HashSet<EdgeMark> = self.entities.iter()
            .filter_map(|e| match e {
                Entity::LineHint { mark, .. } => Some(*mark),
                _ => None,
            })
            .collect();

        let fresh = marks.iter()
            .filter(|mark| !existing.contains(mark))
            .unique()
            .copied()
            .collect_vec();

        for mark in &fresh {
            self.place(Entity::hint(*mark));
        }

        fresh.len()
    }
}

impl From<Vec<Entity>> for Puzzle {
    fn from(entities: Vec<Entity>) -> Self {
        Self::new(entities)
    }
}
