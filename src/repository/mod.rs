//! The relational repository collaborator contract
//!
//! The engine consumes persistence through this narrow contract and never
//! caches entity state across requests. Criteria are an OR-list of AND
//! condition maps, mirroring how the engine builds existence lookups and
//! search filters.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::field::FieldValue;
use crate::core::query::SortOrder;
use crate::core::record::Record;

/// How a single field is matched inside a condition
#[derive(Debug, Clone, PartialEq)]
pub enum MatchRule {
    /// Exact match, tolerant of string-form ids
    Equals(FieldValue),
    /// Case-insensitive substring match
    Contains(String),
}

impl MatchRule {
    fn matches(&self, value: Option<&FieldValue>) -> bool {
        match (self, value) {
            (MatchRule::Equals(expected), Some(actual)) => expected.loosely_equals(actual),
            (MatchRule::Equals(expected), None) => expected.is_null(),
            (MatchRule::Contains(needle), Some(actual)) => actual.contains_ci(needle),
            (MatchRule::Contains(_), None) => false,
        }
    }
}

/// An AND-combination of field matches
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    pub matches: IndexMap<String, MatchRule>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, rule: MatchRule) -> Self {
        self.matches.insert(field.to_string(), rule);
        self
    }

    pub fn matches_record(&self, record: &Record) -> bool {
        self.matches
            .iter()
            .all(|(field, rule)| rule.matches(record.get(field)))
    }
}

/// An OR-combination of conditions
///
/// An empty criteria set means "no filtering": it matches every record for
/// collection reads; the engine never issues a single-record lookup with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub any_of: Vec<Condition>,
}

impl Criteria {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.any_of.is_empty()
    }

    pub fn any_of(conditions: Vec<Condition>) -> Self {
        Self { any_of: conditions }
    }

    /// Criteria matching one record by identity
    pub fn by_id(id: Uuid) -> Self {
        Self::any_of(vec![
            Condition::new().with("id", MatchRule::Equals(FieldValue::Uuid(id))),
        ])
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.any_of.is_empty() || self.any_of.iter().any(|c| c.matches_record(record))
    }
}

/// Build the OR'd case-insensitive contains filter for a collection search
///
/// Empty when no term or no findable fields are given, meaning no filtering.
pub fn search_criteria(findable_fields: &[String], search_term: Option<&str>) -> Criteria {
    let term = match search_term {
        Some(t) if !t.is_empty() => t,
        _ => return Criteria::empty(),
    };
    Criteria::any_of(
        findable_fields
            .iter()
            .map(|field| Condition::new().with(field, MatchRule::Contains(term.to_string())))
            .collect(),
    )
}

/// A collection read: filter, projection, ordering and window
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub criteria: Criteria,
    /// Empty selection means all columns
    pub select: Vec<String>,
    pub order: Option<(String, SortOrder)>,
    pub take: Option<usize>,
    pub skip: Option<usize>,
}

/// Acknowledgment returned by `update`; not the updated record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateAck {
    pub affected: u64,
}

/// Acknowledgment returned by `delete`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteAck {
    pub affected: u64,
}

/// The persistence collaborator the engine is generated against
///
/// Implementations own identity assignment and are safe for concurrent use.
/// Uniqueness races between an application-level existence check and the
/// subsequent insert are the implementation's to close (a storage-level
/// uniqueness constraint, or a single serialization point).
#[async_trait]
pub trait Repository: Send + Sync {
    /// The canonical entity name routes are derived from
    fn entity_name(&self) -> &str;

    /// Column-existence introspection by field name
    fn has_column(&self, field: &str) -> bool;

    /// First record matching the criteria, with field projection applied
    async fn find_one(&self, criteria: &Criteria, select: &[String]) -> Result<Option<Record>>;

    /// Matching records plus the total match count before windowing
    async fn find_and_count(&self, query: &FindQuery) -> Result<(Vec<Record>, usize)>;

    /// Instantiate a record with assigned identity; does not persist
    async fn create(&self, payload: Record) -> Result<Record>;

    /// Persist a record, enforcing any declared uniqueness constraints
    async fn save(&self, record: Record) -> Result<Record>;

    /// Apply a partial update by id
    async fn update(&self, id: &Uuid, payload: Record) -> Result<UpdateAck>;

    /// Delete by id
    async fn delete(&self, id: &Uuid) -> Result<DeleteAck>;
}
