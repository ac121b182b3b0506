#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod graph;
pub mod html;
pub mod layout;
pub mod layout_dump;
pub mod pipeline;
pub mod render;
pub mod summary;
pub mod text;
pub mod text_metrics;
pub mod theme;
pub mod viewer;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, PhaseArrangement, RenderConfig, load_config};
pub use document::{GraphDocument, load_document};
pub use error::LoadError;
pub use graph::{EdgeKind, NodeKey, StateEdge, StateGraph, StateNode};
pub use html::render_html;
pub use layout::{Layout, Point, compute_layout};
pub use pipeline::{OutputFormat, RenderOutcome, render_file};
pub use render::render_svg;
pub use theme::Theme;
