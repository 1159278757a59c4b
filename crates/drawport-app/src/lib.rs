//! Drawport command line.
//!
//! Loads a scene file, applies export options and writes the PDF.

use clap::{ArgAction, Parser};
use drawport_core::{AnnotationLayout, ConfigError, Scene, SceneError};
use drawport_pdf::{DirectorySink, ExportDialog, ExportError, ExportReport, PdfExporter, SaveError};
use drawport_render::SkiaRasterizer;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Preview box used when `--preview-size` is not given.
const DEFAULT_PREVIEW_SIZE: u32 = 400;

#[derive(Parser, Debug)]
#[command(name = "drawport")]
#[command(version, about = "Export whiteboard scenes to PDF")]
pub struct Cli {
    /// Scene file (.excalidraw JSON)
    #[arg(value_name = "SCENE")]
    pub scene: PathBuf,

    /// Output directory
    #[arg(long, short = 'o', value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Project name, used for the file name (defaults to the scene's name)
    #[arg(long, short = 'n', value_name = "NAME")]
    pub name: Option<String>,

    /// Add a page describing every element
    #[arg(long, short = 'a', action = ArgAction::SetTrue)]
    pub annotations: bool,

    /// Write annotations next to each shape instead of on a separate page
    #[arg(long, action = ArgAction::SetTrue, requires = "annotations")]
    pub inline_annotations: bool,

    /// Paint the scene background
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "no_background")]
    pub background: bool,

    /// Leave the background transparent
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_background: bool,

    /// Export with the dark-mode filter
    #[arg(long, short = 'd', action = ArgAction::SetTrue)]
    pub dark: bool,

    /// Export scale (1, 2 or 3)
    #[arg(long, short = 's', value_name = "N")]
    pub scale: Option<u32>,

    /// Only export selected elements
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "all_elements")]
    pub selection_only: bool,

    /// Export every element even when some are selected
    #[arg(long, action = ArgAction::SetTrue)]
    pub all_elements: bool,

    /// Attach the scene to the PDF so it can be reopened
    #[arg(long, action = ArgAction::SetTrue)]
    pub embed_scene: bool,

    /// Also write a PNG preview to this path
    #[arg(long, value_name = "FILE.png")]
    pub preview: Option<PathBuf>,

    /// Larger side of the preview, in pixels
    #[arg(long, value_name = "PX", default_value_t = DEFAULT_PREVIEW_SIZE)]
    pub preview_size: u32,

    /// Choose the destination with a native save dialog
    #[cfg(feature = "dialog")]
    #[arg(long, action = ArgAction::SetTrue)]
    pub dialog: bool,
}

/// Command line errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid scene: {0}")]
    Scene(#[from] SceneError),
    #[error("Invalid option: {0}")]
    Config(#[from] ConfigError),
    #[error("Output error: {0}")]
    Output(#[from] SaveError),
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

/// Load the scene, apply the options and export it.
pub async fn run(cli: &Cli) -> Result<ExportReport, AppError> {
    let json = fs::read_to_string(&cli.scene).map_err(|source| AppError::Read {
        path: cli.scene.clone(),
        source,
    })?;
    let scene = Scene::from_json(&json)?;
    log::info!(
        "Loaded {} ({} elements)",
        cli.scene.display(),
        scene.elements.len()
    );

    let mut dialog = ExportDialog::open(&scene, cli.name.as_deref());
    apply_options(&mut dialog, cli)?;

    let rasterizer = SkiaRasterizer::new();
    if let Some(path) = &cli.preview {
        let png = dialog.preview_png(&rasterizer, cli.preview_size).await?;
        fs::write(path, png).map_err(|source| AppError::Write {
            path: path.clone(),
            source,
        })?;
        log::info!("Wrote preview to {}", path.display());
    }

    #[cfg(feature = "dialog")]
    if cli.dialog {
        let exporter = PdfExporter::new(rasterizer, drawport_pdf::DialogSink::new());
        return Ok(dialog.try_export(&exporter).await?);
    }

    let exporter = PdfExporter::new(rasterizer, DirectorySink::new(&cli.out)?);
    Ok(dialog.try_export(&exporter).await?)
}

fn apply_options(dialog: &mut ExportDialog, cli: &Cli) -> Result<(), AppError> {
    if cli.no_background {
        dialog.set_export_background(false);
    } else if cli.background {
        dialog.set_export_background(true);
    }
    if cli.dark {
        dialog.set_dark_mode(true);
    }
    if let Some(scale) = cli.scale {
        dialog.set_export_scale(scale)?;
    }
    if cli.selection_only {
        dialog.set_selection_only(true);
    } else if cli.all_elements {
        dialog.set_selection_only(false);
    }
    if cli.embed_scene {
        dialog.set_embed_scene(true);
    }
    dialog.set_with_annotations(cli.annotations);
    if cli.inline_annotations {
        dialog.set_annotation_layout(AnnotationLayout::Inline);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    const SCENE: &str = r##"{
        "type": "excalidraw",
        "version": 2,
        "elements": [
            {"id": "r1", "type": "rectangle", "x": 0, "y": 0, "width": 120, "height": 80,
             "strokeColor": "#000000", "backgroundColor": "#ff0000"},
            {"id": "e1", "type": "ellipse", "x": 150, "y": 10, "width": 60, "height": 60}
        ],
        "appState": {"name": "Roadmap", "selectedElementIds": {"e1": true}},
        "files": {}
    }"##;

    fn write_scene(dir: &Path) -> PathBuf {
        let path = dir.join("board.excalidraw");
        fs::write(&path, SCENE).unwrap();
        path
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("drawport").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_exports_into_out_dir() {
        let dir = tempdir().unwrap();
        let scene = write_scene(dir.path());
        let out = dir.path().join("out");
        let cli = cli(&[
            scene.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--annotations",
            "--all-elements",
        ]);

        let report = pollster::block_on(run(&cli)).unwrap();
        assert_eq!(report.file_name, "Roadmap.pdf");
        assert_eq!(report.page_count, 2);
        assert_eq!(report.annotation_count, 2);
        let bytes = fs::read(out.join("Roadmap.pdf")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_selection_from_scene_is_default() {
        let dir = tempdir().unwrap();
        let scene = write_scene(dir.path());
        let cli = cli(&[
            scene.to_str().unwrap(),
            "--out",
            dir.path().to_str().unwrap(),
            "--annotations",
            "--name",
            "Selected",
        ]);

        let report = pollster::block_on(run(&cli)).unwrap();
        assert_eq!(report.file_name, "Selected.pdf");
        assert_eq!(report.annotation_count, 1);
    }

    #[test]
    fn test_writes_preview() {
        let dir = tempdir().unwrap();
        let scene = write_scene(dir.path());
        let preview = dir.path().join("preview.png");
        let cli = cli(&[
            scene.to_str().unwrap(),
            "--out",
            dir.path().to_str().unwrap(),
            "--preview",
            preview.to_str().unwrap(),
            "--preview-size",
            "64",
        ]);

        let report = pollster::block_on(run(&cli)).unwrap();
        assert_eq!(report.page_count, 1);
        let png = fs::read(&preview).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_rejects_bad_scale() {
        let dir = tempdir().unwrap();
        let scene = write_scene(dir.path());
        let cli = cli(&[scene.to_str().unwrap(), "--scale", "4"]);
        let result = pollster::block_on(run(&cli));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_scene_file() {
        let dir = tempdir().unwrap();
        let cli = cli(&[dir.path().join("missing.json").to_str().unwrap()]);
        assert!(matches!(
            pollster::block_on(run(&cli)),
            Err(AppError::Read { .. })
        ));
    }

    #[test]
    fn test_inline_requires_annotations() {
        let result = Cli::try_parse_from(["drawport", "scene.json", "--inline-annotations"]);
        assert!(result.is_err());
    }
}
