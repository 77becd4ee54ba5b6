//! Docket Storage Layer
//!
//! SQLite-backed implementation of the `SegmentStore` and `FactStore`
//! seams, plus per-case HNSW vector indexes for fact similarity.
//!
//! # Isolation
//!
//! This is the enforcement point for tenant isolation. Every write
//! compares the caller's authorized case against the entity's owning
//! case and refuses on mismatch; every read filters on `case_id` in SQL.
//! An upstream programming mistake therefore cannot read or write across
//! cases.
//!
//! # Thread Safety
//!
//! SQLite connections are not `Sync`; callers that share a store across
//! tasks wrap it in `Arc<Mutex<_>>` (the orchestrator does exactly that).

#![warn(missing_docs)]

pub mod embedding;
pub mod vector_index;

use docket_domain::traits::{FactStore, SegmentStore};
use docket_domain::{
    CaseId, DocumentType, EntityKind, ExtractedEntity, Fact, FactCategory, FactId, IdRange,
    PageRange, ProductionId, Segment, SegmentId,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::error;
use vector_index::CaseVectorIndexes;

pub use embedding::{cosine_similarity, EmbeddingModel, EmbeddingError, HashEmbedder};

/// Default embedding dimension (matches [`HashEmbedder`] defaults used by
/// the pipeline)
pub const DEFAULT_DIMENSION: usize = 128;

/// Errors from storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The caller's authorized case does not own the entity.
    /// Always fatal to the offending call; never downgraded.
    #[error("Isolation violation: authorized case {authorized} does not own entity in case {owner}")]
    IsolationViolation {
        /// Case the caller is authorized for
        authorized: CaseId,
        /// Case that owns the entity
        owner: CaseId,
    },

    /// Stored data failed to decode
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Vector index error
    #[error("Vector index error: {0}")]
    Index(#[from] vector_index::VectorIndexError),
}

/// SQLite + per-case HNSW store for segments and facts
pub struct SqliteStore {
    conn: Connection,
    indexes: CaseVectorIndexes,
}

impl SqliteStore {
    /// Open (or create) a store at `path` with the given embedding
    /// dimension. Use `:memory:` for tests. Vector indexes are rebuilt
    /// from the facts table on open.
    pub fn new<P: AsRef<Path>>(path: P, dimension: usize) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self {
            conn,
            indexes: CaseVectorIndexes::new(dimension),
        };
        store.initialize_schema()?;
        store.rebuild_indexes()?;
        Ok(store)
    }

    /// Open an in-memory store with the default dimension
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:", DEFAULT_DIMENSION)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Reload every fact embedding into its case's index
    fn rebuild_indexes(&mut self) -> Result<(), StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, case_id, embedding FROM facts")?;
        let rows = stmt.query_map([], |row| {
            let id: Vec<u8> = row.get(0)?;
            let case: Vec<u8> = row.get(1)?;
            let embedding: Vec<u8> = row.get(2)?;
            Ok((id, case, embedding))
        })?;

        for row in rows {
            let (id, case, embedding) = row?;
            let fact_id = FactId::from_value(u128_from_bytes(&id)?);
            let case_id = CaseId::from_value(u128_from_bytes(&case)?);
            let vector = decode_embedding(&embedding);
            if vector.len() == self.indexes.dimension() {
                self.indexes.add(case_id, fact_id, &vector)?;
            }
        }
        Ok(())
    }

    fn load_fact(&self, authorized: CaseId, id: FactId) -> Result<Option<Fact>, StoreError> {
        let fact = self
            .conn
            .query_row(
                "SELECT id, case_id, segment_id, text, category, confidence,
                        span_start, span_end, entities, embedding
                 FROM facts WHERE id = ?1 AND case_id = ?2",
                params![id_bytes(id.value()), id_bytes(authorized.value())],
                fact_from_row,
            )
            .optional()?;
        Ok(fact)
    }
}

impl SegmentStore for SqliteStore {
    type Error = StoreError;

    fn persist_segment(
        &mut self,
        authorized: CaseId,
        segment: Segment,
    ) -> Result<SegmentId, Self::Error> {
        if segment.case_id != authorized {
            error!(
                %authorized,
                owner = %segment.case_id,
                "refusing segment write across case boundary"
            );
            return Err(StoreError::IsolationViolation {
                authorized,
                owner: segment.case_id,
            });
        }

        self.conn.execute(
            "INSERT INTO segments (id, case_id, production_id, ordinal, page_start, page_end,
                                   document_type, title, id_range_first, id_range_last, confidence)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                id_bytes(segment.id.value()),
                id_bytes(segment.case_id.value()),
                id_bytes(segment.production_id.value()),
                segment.ordinal,
                segment.pages.start,
                segment.pages.end,
                segment.document_type.as_str(),
                segment.title,
                segment.id_range.first,
                segment.id_range.last,
                segment.confidence,
            ],
        )?;

        Ok(segment.id)
    }

    fn segments_for_production(
        &self,
        authorized: CaseId,
        production_id: ProductionId,
    ) -> Result<Vec<Segment>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, case_id, production_id, ordinal, page_start, page_end,
                    document_type, title, id_range_first, id_range_last, confidence
             FROM segments WHERE case_id = ?1 AND production_id = ?2
             ORDER BY ordinal",
        )?;

        let segments = stmt
            .query_map(
                params![id_bytes(authorized.value()), id_bytes(production_id.value())],
                segment_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(segments)
    }

    fn get_segment(
        &self,
        authorized: CaseId,
        id: SegmentId,
    ) -> Result<Option<Segment>, Self::Error> {
        let segment = self
            .conn
            .query_row(
                "SELECT id, case_id, production_id, ordinal, page_start, page_end,
                        document_type, title, id_range_first, id_range_last, confidence
                 FROM segments WHERE id = ?1 AND case_id = ?2",
                params![id_bytes(id.value()), id_bytes(authorized.value())],
                segment_from_row,
            )
            .optional()?;
        Ok(segment)
    }
}

impl FactStore for SqliteStore {
    type Error = StoreError;

    fn persist_fact(&mut self, authorized: CaseId, fact: Fact) -> Result<(), Self::Error> {
        if fact.case_id != authorized {
            error!(
                %authorized,
                owner = %fact.case_id,
                "refusing fact write across case boundary"
            );
            return Err(StoreError::IsolationViolation {
                authorized,
                owner: fact.case_id,
            });
        }
        fact.validate().map_err(StoreError::InvalidData)?;

        let entities = encode_entities(&fact.entities);
        self.conn.execute(
            "INSERT INTO facts (id, case_id, segment_id, text, category, confidence,
                                span_start, span_end, entities, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id_bytes(fact.id.value()),
                id_bytes(fact.case_id.value()),
                id_bytes(fact.segment_id.value()),
                fact.text,
                fact.category.as_str(),
                fact.confidence,
                fact.source_span.0 as i64,
                fact.source_span.1 as i64,
                entities,
                encode_embedding(&fact.embedding),
            ],
        )?;

        if fact.embedding.len() == self.indexes.dimension() {
            self.indexes.add(fact.case_id, fact.id, &fact.embedding)?;
        }
        Ok(())
    }

    fn facts_for_segment(
        &self,
        authorized: CaseId,
        segment_id: SegmentId,
    ) -> Result<Vec<Fact>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, case_id, segment_id, text, category, confidence,
                    span_start, span_end, entities, embedding
             FROM facts WHERE case_id = ?1 AND segment_id = ?2
             ORDER BY id",
        )?;

        let facts = stmt
            .query_map(
                params![id_bytes(authorized.value()), id_bytes(segment_id.value())],
                fact_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(facts)
    }

    fn facts_for_case(&self, authorized: CaseId) -> Result<Vec<Fact>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, case_id, segment_id, text, category, confidence,
                    span_start, span_end, entities, embedding
             FROM facts WHERE case_id = ?1 ORDER BY id",
        )?;

        let facts = stmt
            .query_map(params![id_bytes(authorized.value())], fact_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(facts)
    }

    fn search_similar(
        &self,
        authorized: CaseId,
        query: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<(Fact, f32)>, Self::Error> {
        let neighbours = self.indexes.search(authorized, query, limit)?;

        let mut results = Vec::new();
        for (fact_id, similarity) in neighbours {
            if similarity < threshold {
                continue;
            }
            // The SQL lookup re-applies the case filter
            if let Some(fact) = self.load_fact(authorized, fact_id)? {
                results.push((fact, similarity));
            }
        }
        results.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(results)
    }
}

fn id_bytes(value: u128) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

fn u128_from_bytes(bytes: &[u8]) -> Result<u128, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "expected 16 id bytes, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(u128::from_be_bytes(arr))
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn encode_entities(entities: &[ExtractedEntity]) -> String {
    let values: Vec<serde_json::Value> = entities
        .iter()
        .map(|e| {
            serde_json::json!({
                "kind": e.kind.as_str(),
                "text": e.text,
            })
        })
        .collect();
    serde_json::Value::Array(values).to_string()
}

fn decode_entities(json: &str) -> Result<Vec<ExtractedEntity>, StoreError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| StoreError::InvalidData(format!("entity payload: {}", e)))?;
    let array = value
        .as_array()
        .ok_or_else(|| StoreError::InvalidData("entity payload is not an array".to_string()))?;

    let mut entities = Vec::with_capacity(array.len());
    for item in array {
        let kind = item
            .get("kind")
            .and_then(|v| v.as_str())
            .and_then(EntityKind::parse)
            .ok_or_else(|| StoreError::InvalidData("entity kind missing or unknown".to_string()))?;
        let text = item
            .get("text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| StoreError::InvalidData("entity text missing".to_string()))?
            .to_string();
        entities.push(ExtractedEntity { kind, text });
    }
    Ok(entities)
}

fn conversion_err(idx: usize, e: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Blob, Box::new(e))
}

fn segment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Segment> {
    let id: Vec<u8> = row.get(0)?;
    let case: Vec<u8> = row.get(1)?;
    let production: Vec<u8> = row.get(2)?;

    let pages = PageRange::new(row.get(4)?, row.get(5)?)
        .map_err(|e| conversion_err(4, StoreError::InvalidData(e)))?;
    let document_type: String = row.get(6)?;

    Ok(Segment {
        id: SegmentId::from_value(u128_from_bytes(&id).map_err(|e| conversion_err(0, e))?),
        case_id: CaseId::from_value(u128_from_bytes(&case).map_err(|e| conversion_err(1, e))?),
        production_id: ProductionId::from_value(
            u128_from_bytes(&production).map_err(|e| conversion_err(2, e))?,
        ),
        ordinal: row.get(3)?,
        pages,
        document_type: DocumentType::parse(&document_type),
        title: row.get(7)?,
        id_range: IdRange {
            first: row.get(8)?,
            last: row.get(9)?,
        },
        confidence: row.get(10)?,
    })
}

fn fact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Fact> {
    let id: Vec<u8> = row.get(0)?;
    let case: Vec<u8> = row.get(1)?;
    let segment: Vec<u8> = row.get(2)?;
    let category: String = row.get(4)?;
    let entities_json: String = row.get(8)?;
    let embedding_bytes: Vec<u8> = row.get(9)?;

    Ok(Fact {
        id: FactId::from_value(u128_from_bytes(&id).map_err(|e| conversion_err(0, e))?),
        case_id: CaseId::from_value(u128_from_bytes(&case).map_err(|e| conversion_err(1, e))?),
        segment_id: SegmentId::from_value(
            u128_from_bytes(&segment).map_err(|e| conversion_err(2, e))?,
        ),
        text: row.get(3)?,
        category: FactCategory::parse(&category),
        confidence: row.get(5)?,
        source_span: (
            row.get::<_, i64>(6)? as usize,
            row.get::<_, i64>(7)? as usize,
        ),
        entities: decode_entities(&entities_json).map_err(|e| conversion_err(8, e))?,
        embedding: decode_embedding(&embedding_bytes),
    })
}
