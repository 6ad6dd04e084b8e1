//! In-memory registry of uploaded documents.
//!
//! Holds the raw PDF bytes for the browser viewer and, once an analysis
//! finishes, the structured result for that document. At most five
//! documents at a time; nothing is persisted — a restart starts empty.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registry capacity.
pub const MAX_DOCUMENTS: usize = 5;

// ═══════════════════════════════════════════
// Document kind
// ═══════════════════════════════════════════

/// What kind of financial document was uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Kid,
    AnnualReport,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kid => "kid",
            Self::AnnualReport => "annual_report",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "kid" => Some(Self::Kid),
            "annual_report" => Some(Self::AnnualReport),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════

struct StoredDocument {
    id: Uuid,
    name: String,
    kind: DocumentKind,
    uploaded_at: DateTime<Utc>,
    bytes: Vec<u8>,
    result: Option<serde_json::Value>,
}

/// Listing entry: everything but the raw bytes and the full result.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub name: String,
    pub kind: DocumentKind,
    pub uploaded_at: DateTime<Utc>,
    pub size_bytes: usize,
    pub has_result: bool,
}

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Document limit reached ({MAX_DOCUMENTS}). Remove a document before uploading another.")]
    Full,
    #[error("Document not found: {0}")]
    NotFound(Uuid),
    #[error("Internal lock error")]
    LockPoisoned,
}

/// The registry. Insertion order is preserved for listings.
pub struct DocumentRegistry {
    docs: Mutex<Vec<StoredDocument>>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self {
            docs: Mutex::new(Vec::new()),
        }
    }

    /// Register an upload. Fails when the registry is at capacity.
    pub fn insert(
        &self,
        name: &str,
        kind: DocumentKind,
        bytes: Vec<u8>,
    ) -> Result<Uuid, RegistryError> {
        let mut docs = self.docs.lock().map_err(|_| RegistryError::LockPoisoned)?;
        if docs.len() >= MAX_DOCUMENTS {
            return Err(RegistryError::Full);
        }

        let id = Uuid::new_v4();
        docs.push(StoredDocument {
            id,
            name: name.to_string(),
            kind,
            uploaded_at: Utc::now(),
            bytes,
            result: None,
        });
        Ok(id)
    }

    pub fn summaries(&self) -> Vec<DocumentSummary> {
        let Ok(docs) = self.docs.lock() else {
            return Vec::new();
        };
        docs.iter()
            .map(|d| DocumentSummary {
                id: d.id,
                name: d.name.clone(),
                kind: d.kind,
                uploaded_at: d.uploaded_at,
                size_bytes: d.bytes.len(),
                has_result: d.result.is_some(),
            })
            .collect()
    }

    /// File name and raw bytes, for serving to the viewer.
    pub fn file(&self, id: Uuid) -> Result<(String, Vec<u8>), RegistryError> {
        let docs = self.docs.lock().map_err(|_| RegistryError::LockPoisoned)?;
        docs.iter()
            .find(|d| d.id == id)
            .map(|d| (d.name.clone(), d.bytes.clone()))
            .ok_or(RegistryError::NotFound(id))
    }

    /// Attach the finished analysis result to a document.
    pub fn set_result(&self, id: Uuid, result: serde_json::Value) -> Result<(), RegistryError> {
        let mut docs = self.docs.lock().map_err(|_| RegistryError::LockPoisoned)?;
        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        doc.result = Some(result);
        Ok(())
    }

    pub fn result(&self, id: Uuid) -> Result<Option<serde_json::Value>, RegistryError> {
        let docs = self.docs.lock().map_err(|_| RegistryError::LockPoisoned)?;
        docs.iter()
            .find(|d| d.id == id)
            .map(|d| d.result.clone())
            .ok_or(RegistryError::NotFound(id))
    }

    pub fn remove(&self, id: Uuid) -> Result<(), RegistryError> {
        let mut docs = self.docs.lock().map_err(|_| RegistryError::LockPoisoned)?;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(RegistryError::NotFound(id));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.docs.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
