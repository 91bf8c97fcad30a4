//! Core type definitions shared across the fusion pipeline.

/// Identifier of a source record (the text of its ID element).
pub type RecordId = String;

/// Opaque key of one provenance entry; every merged value carries one.
pub type ProvenanceKey = String;

/// Cluster number. Numbering is not sequential once clusters are merged.
pub type ClusterId = u32;

/// Slash-separated attribute path relative to a record element, e.g. `director/name`.
pub type AttributePath = String;

/// Element name of a single contributed value in merged documents.
pub const VALUE: &str = "value";

/// Attribute name carrying the provenance key on merged values and list elements.
pub const PROVENANCE: &str = "provenance";

/// Separator between member IDs in a merged record ID.
pub const ID_SEPARATOR: &str = "---";

/// Provenance marker attached to synthetic averaged values.
pub const AVERAGE_PROVENANCE: &str = "average value";

/// Provenance field holding the source name (trust lookups).
pub const SOURCE_FIELD: &str = "source";

/// Provenance field holding the ingestion date (recency lookups).
pub const DATE_FIELD: &str = "date";
