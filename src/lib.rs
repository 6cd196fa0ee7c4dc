//! settei_core - Rust backend for the Settei character-creation helper
//!
//! Modules:
//! - catalog: Character catalog loading (JSON, with fallback path)
//! - image_store: Persistent avatar image cache
//! - completion: Persistent set of completed character ids
//! - html_text: HTML fragment to plain text conversion
//! - panel: Character list panel model (ordering, filtering, rendering)
//! - infobox: Wiki infobox markup builder and source-link templates
//! - form_filler: Host form adapter and fill-plan generation
//! - config: Helper configuration (paths, host field ids)

pub mod catalog;
pub mod completion;
pub mod config;
pub mod form_filler;
pub mod html_text;
pub mod image_store;
pub mod infobox;
pub mod panel;

// Re-export key types for convenience
pub use catalog::{Catalog, CharacterRecord};

pub use completion::CompletionTracker;

pub use config::{HelperConfig, HostFields};

pub use form_filler::{AvatarPayload, FillPlan, FormFiller, HostForm, PlanWriter};

pub use html_text::{html_to_text, HtmlToText};

pub use image_store::ImageStore;

pub use infobox::{build_infobox, source_url, Gender, DEFAULT_SOURCE_URL_TEMPLATE};

pub use panel::{Panel, PanelRow};
