//! Export configuration.

use crate::scene::AppState;
use thiserror::Error;

/// Scale factors offered for export.
pub const EXPORT_SCALES: [u32; 3] = [1, 2, 3];

/// Padding around the drawing, in canvas pixels.
pub const DEFAULT_EXPORT_PADDING: f64 = 10.0;

/// Project name used when none is given.
pub const DEFAULT_PROJECT_NAME: &str = "export";

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Unsupported export scale {0} (expected one of 1, 2, 3)")]
    UnsupportedScale(u32),
}

/// Where annotation text goes in the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationLayout {
    /// A separate page listing one numbered line per element.
    #[default]
    Appendix,
    /// Descriptions written on the drawing page next to each shape.
    Inline,
}

/// Snapshot of the settings used for one export.
///
/// The scale is private so it can only hold one of [`EXPORT_SCALES`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub project_name: String,
    pub export_background: bool,
    pub export_dark_mode: bool,
    export_scale: u32,
    pub export_embed_scene: bool,
    pub export_with_annotations: bool,
    pub export_selection_only: bool,
    pub view_background_color: String,
    pub padding: f64,
    pub annotation_layout: AnnotationLayout,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            export_background: true,
            export_dark_mode: false,
            export_scale: 1,
            export_embed_scene: false,
            export_with_annotations: false,
            export_selection_only: false,
            view_background_color: "#ffffff".to_string(),
            padding: DEFAULT_EXPORT_PADDING,
            annotation_layout: AnnotationLayout::default(),
        }
    }
}

impl ExportConfig {
    /// Build a configuration from the editor's app state.
    ///
    /// Annotations start disabled regardless of the app state. An
    /// unsupported scale in the app state falls back to 1.
    pub fn from_app_state(app_state: &AppState) -> Self {
        let export_scale = if EXPORT_SCALES.contains(&app_state.export_scale) {
            app_state.export_scale
        } else {
            log::warn!(
                "Ignoring unsupported export scale {} from scene",
                app_state.export_scale
            );
            1
        };

        let mut config = Self {
            export_background: app_state.export_background,
            export_dark_mode: app_state.export_with_dark_mode,
            export_scale,
            export_embed_scene: app_state.export_embed_scene,
            view_background_color: app_state.view_background_color.clone(),
            ..Self::default()
        };
        if let Some(name) = &app_state.name {
            config.set_project_name(name);
        }
        config
    }

    /// Enable or disable the annotation page.
    pub fn with_annotations(mut self, enabled: bool) -> Self {
        self.export_with_annotations = enabled;
        self
    }

    /// Choose where annotation text goes.
    pub fn with_annotation_layout(mut self, layout: AnnotationLayout) -> Self {
        self.annotation_layout = layout;
        self
    }

    /// Attach the scene to the exported document.
    pub fn with_embed_scene(mut self, enabled: bool) -> Self {
        self.export_embed_scene = enabled;
        self
    }

    /// Current export scale.
    pub fn export_scale(&self) -> u32 {
        self.export_scale
    }

    /// Change the export scale; only [`EXPORT_SCALES`] are accepted.
    pub fn set_export_scale(&mut self, scale: u32) -> Result<(), ConfigError> {
        if !EXPORT_SCALES.contains(&scale) {
            return Err(ConfigError::UnsupportedScale(scale));
        }
        self.export_scale = scale;
        Ok(())
    }

    /// Change the project name; blank names fall back to the default.
    pub fn set_project_name(&mut self, name: &str) {
        let name = name.trim();
        self.project_name = if name.is_empty() {
            DEFAULT_PROJECT_NAME.to_string()
        } else {
            name.to_string()
        };
    }

    /// Name of the PDF file this export produces.
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.project_name)
    }

    /// App state carrying these settings, for scene embedding.
    pub fn to_app_state(&self) -> AppState {
        AppState {
            view_background_color: self.view_background_color.clone(),
            export_background: self.export_background,
            export_with_dark_mode: self.export_dark_mode,
            export_scale: self.export_scale,
            export_embed_scene: self.export_embed_scene,
            selected_element_ids: Default::default(),
            name: Some(self.project_name.clone()),
        }
    }
}
