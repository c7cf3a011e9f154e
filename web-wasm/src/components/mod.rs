//! UIコンポーネント

pub mod header;
pub mod image_viewer;
pub mod settings_panel;
pub mod stage_indicator;
pub mod step_controls;
pub mod text_editor;
pub mod upload_area;
