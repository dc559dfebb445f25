//! External interface modules: imagery service, uploads, disk, documents

pub mod session;
pub mod catalog;
pub mod geojson;
pub mod workspace;
pub mod document;

// Re-export main types
pub use session::{BackendConfig, BackendSession, ImageryBackend, RenderOperation, RenderRequest};
pub use catalog::{CatalogQuery, SceneCollection, SceneItem};
pub use geojson::{parse_geometry, VectorGeometry};
pub use workspace::{Workspace, REPORT_PREFIX, SENTINEL_FILE};
pub use document::{Document, DocumentEngine, HtmlDocumentEngine, ImageBlock, Section};
