//! Scene documents: elements, app state and binary files.

use crate::element::DrawingElement;
use crate::files::BinaryFiles;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Scene loading errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Not a scene document (type {0:?})")]
    WrongType(String),
}

/// Export-related subset of the editor's app state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default = "default_view_background")]
    pub view_background_color: String,
    #[serde(default = "default_true")]
    pub export_background: bool,
    #[serde(default)]
    pub export_with_dark_mode: bool,
    #[serde(default = "default_scale")]
    pub export_scale: u32,
    #[serde(default)]
    pub export_embed_scene: bool,
    #[serde(default)]
    pub selected_element_ids: HashMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn default_view_background() -> String {
    "#ffffff".to_string()
}

fn default_true() -> bool {
    true
}

fn default_scale() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view_background_color: default_view_background(),
            export_background: true,
            export_with_dark_mode: false,
            export_scale: default_scale(),
            export_embed_scene: false,
            selected_element_ids: HashMap::new(),
            name: None,
        }
    }
}

impl AppState {
    /// Whether the element with this id is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_element_ids.get(id).copied().unwrap_or(false)
    }
}

/// A whiteboard scene as stored in `.excalidraw` JSON files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(rename = "type", default = "default_scene_type")]
    pub scene_type: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub elements: Vec<DrawingElement>,
    #[serde(default)]
    pub app_state: AppState,
    #[serde(default)]
    pub files: BinaryFiles,
}

fn default_scene_type() -> String {
    Scene::SCENE_TYPE.to_string()
}

fn default_version() -> u32 {
    2
}

impl Scene {
    /// Document type tag written to and expected in scene files.
    pub const SCENE_TYPE: &'static str = "excalidraw";

    /// Create a scene from elements with default app state and no files.
    pub fn new(elements: Vec<DrawingElement>) -> Self {
        Self {
            scene_type: default_scene_type(),
            version: default_version(),
            source: None,
            elements,
            app_state: AppState::default(),
            files: BinaryFiles::new(),
        }
    }

    /// Parse a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_json::from_str(json)?;
        if scene.scene_type != Self::SCENE_TYPE {
            return Err(SceneError::WrongType(scene.scene_type));
        }
        Ok(scene)
    }

    /// Serialize the scene to JSON.
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Elements that have not been deleted, in document order.
    pub fn non_deleted_elements(&self) -> Vec<DrawingElement> {
        self.elements
            .iter()
            .filter(|e| !e.is_deleted)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r##"{
        "type": "excalidraw",
        "version": 2,
        "source": "https://excalidraw.com",
        "elements": [
            {"id": "r", "type": "rectangle", "x": 0, "y": 0, "width": 10, "height": 10},
            {"id": "gone", "type": "ellipse", "x": 5, "y": 5, "width": 4, "height": 4, "isDeleted": true}
        ],
        "appState": {
            "viewBackgroundColor": "#fafafa",
            "exportWithDarkMode": true,
            "selectedElementIds": {"r": true}
        },
        "files": {}
    }"##;

    #[test]
    fn test_scene_from_json() {
        let scene = Scene::from_json(SCENE).unwrap();
        assert_eq!(scene.elements.len(), 2);
        assert_eq!(scene.app_state.view_background_color, "#fafafa");
        assert!(scene.app_state.export_with_dark_mode);
        assert!(scene.app_state.export_background);
        assert_eq!(scene.app_state.export_scale, 1);
        assert!(scene.app_state.is_selected("r"));
        assert!(!scene.app_state.is_selected("gone"));
    }

    #[test]
    fn test_non_deleted_elements() {
        let scene = Scene::from_json(SCENE).unwrap();
        let live = scene.non_deleted_elements();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, "r");
    }

    #[test]
    fn test_wrong_document_type() {
        let result = Scene::from_json(r#"{"type": "tldraw", "elements": []}"#);
        assert!(matches!(result, Err(SceneError::WrongType(t)) if t == "tldraw"));
    }

    #[test]
    fn test_json_roundtrip_keeps_elements() {
        let scene = Scene::from_json(SCENE).unwrap();
        let again = Scene::from_json(&scene.to_json().unwrap()).unwrap();
        assert_eq!(scene, again);
    }
}
