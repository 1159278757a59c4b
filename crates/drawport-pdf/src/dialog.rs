//! Export dialog state.
//!
//! The dialog works on a snapshot of the scene taken when it opens, so the
//! drawing can keep changing underneath without affecting the export.

use crate::composer::{ExportError, ExportReport, PdfExporter};
use crate::sink::DocumentSink;
use drawport_core::{
    AnnotationLayout, AppState, BinaryFiles, ConfigError, DrawingElement, ExportConfig, Scene,
};
use drawport_render::{RasterImage, RasterOptions, RasterRequest, Rasterizer, RenderResult};

/// Export dialog over a scene snapshot.
pub struct ExportDialog {
    /// Non-deleted elements at open time.
    elements: Vec<DrawingElement>,
    app_state: AppState,
    files: BinaryFiles,
    config: ExportConfig,
    /// Message of the last failed preview render (e.g. canvas too big).
    last_render_error: Option<String>,
}

impl ExportDialog {
    /// Open the dialog on a deep copy of `scene`.
    ///
    /// `name` overrides the scene's own name as the project name.
    /// Selection-only export starts enabled when something is selected.
    pub fn open(scene: &Scene, name: Option<&str>) -> Self {
        let mut config = ExportConfig::from_app_state(&scene.app_state);
        if let Some(name) = name {
            config.set_project_name(name);
        }

        let mut dialog = Self {
            elements: scene.non_deleted_elements(),
            app_state: scene.app_state.clone(),
            files: scene.files.clone(),
            config,
            last_render_error: None,
        };
        dialog.config.export_selection_only = dialog.has_selection();
        dialog
    }

    /// Whether any snapshot element is selected.
    pub fn has_selection(&self) -> bool {
        self.elements
            .iter()
            .any(|e| self.app_state.is_selected(&e.id))
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn files(&self) -> &BinaryFiles {
        &self.files
    }

    pub fn last_render_error(&self) -> Option<&str> {
        self.last_render_error.as_deref()
    }

    pub fn set_export_background(&mut self, enabled: bool) {
        self.config.export_background = enabled;
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.config.export_dark_mode = enabled;
    }

    /// Set export scale (1, 2, or 3).
    pub fn set_export_scale(&mut self, scale: u32) -> Result<(), ConfigError> {
        self.config.set_export_scale(scale)
    }

    pub fn set_with_annotations(&mut self, enabled: bool) {
        self.config.export_with_annotations = enabled;
    }

    pub fn set_annotation_layout(&mut self, layout: AnnotationLayout) {
        self.config.annotation_layout = layout;
    }

    pub fn set_embed_scene(&mut self, enabled: bool) {
        self.config.export_embed_scene = enabled;
    }

    pub fn set_project_name(&mut self, name: &str) {
        self.config.set_project_name(name);
    }

    /// Restrict the export to selected elements. Ignored without a selection.
    pub fn set_selection_only(&mut self, enabled: bool) {
        self.config.export_selection_only = enabled;
    }

    /// Elements the export will include.
    pub fn exported_elements(&self) -> Vec<DrawingElement> {
        if self.config.export_selection_only && self.has_selection() {
            self.elements
                .iter()
                .filter(|e| self.app_state.is_selected(&e.id))
                .cloned()
                .collect()
        } else {
            self.elements.clone()
        }
    }

    /// Render a preview whose larger side fits in `max_width_or_height` pixels.
    ///
    /// A failure is also remembered in [`Self::last_render_error`] until the
    /// next successful preview.
    pub async fn preview<R: Rasterizer + ?Sized>(&mut self, rasterizer: &R, max_width_or_height: u32) -> RenderResult<RasterImage> {
        let elements = self.exported_elements();
        let options =
            RasterOptions::from_config(&self.config).with_max_width_or_height(Some(max_width_or_height));
        let result = rasterizer
            .rasterize(RasterRequest::new(&elements, &self.files, options))
            .await;

        match &result {
            Ok(_) => self.last_render_error = None,
            Err(err) => {
                log::warn!("Preview failed: {err}");
                self.last_render_error = Some(err.to_string());
            }
        }
        result
    }

    /// Render the preview as PNG, carrying the scene when embedding is on.
    pub async fn preview_png<R: Rasterizer + ?Sized>(&mut self, rasterizer: &R, max_width_or_height: u32) -> Result<Vec<u8>, ExportError> {
        let image = self.preview(rasterizer, max_width_or_height).await?;
        let metadata = if self.config.export_embed_scene {
            Some(self.snapshot_scene().to_json()?)
        } else {
            None
        };
        Ok(image.to_png(metadata.as_deref())?)
    }

    /// Export with the current settings; failures are logged, not returned.
    pub async fn export<R: Rasterizer, S: DocumentSink>(&self, exporter: &PdfExporter<R, S>) {
        let elements = self.exported_elements();
        exporter
            .export_to_pdf(&elements, &self.config, &self.files)
            .await;
    }

    /// Export with the current settings, reporting the outcome.
    pub async fn try_export<R: Rasterizer, S: DocumentSink>(&self, exporter: &PdfExporter<R, S>) -> Result<ExportReport, ExportError> {
        let elements = self.exported_elements();
        exporter
            .try_export_to_pdf(&elements, &self.config, &self.files)
            .await
    }

    fn snapshot_scene(&self) -> Scene {
        let mut scene = Scene::new(self.exported_elements());
        scene.app_state = self.config.to_app_state();
        scene.files = self.files.clone();
        scene
    }
}
