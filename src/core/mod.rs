//! Core report pipeline modules

pub mod aoi;
pub mod time_window;
pub mod selector;
pub mod indices;
pub mod renderer;
pub mod report;
pub mod orchestrator;

// Re-export main types
pub use aoi::{AoiResolver, DEFAULT_POINT_BUFFER_KM};
pub use time_window::{resolve as resolve_window, resolve_today, LookbackPeriod};
pub use selector::{SceneSelector, SelectorParams};
pub use indices::{band_pair, IndexEngine, INDEX_PRODUCTS};
pub use renderer::{style_for, MapRenderer, RendererParams};
pub use report::{ReportAssembler, REPORT_TITLE};
pub use orchestrator::{AoiInput, RunOrchestrator, RunRequest, RunState};
