//! JSON job descriptions and their execution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clipforge_assets::AssetService;
use clipforge_media::Compositor;
use clipforge_models::{
    AudioInput, EncodingConfig, ImageInput, ImageMetadata, ImageSource, ImageUpload, VideoInput,
};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};

/// One unit of work read from a job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    OverlayImages {
        base: PathBuf,
        images: Vec<ImageInput>,
        output: PathBuf,
        #[serde(default)]
        encoding: EncodingConfig,
    },
    Concatenate {
        segments: Vec<VideoInput>,
        output: PathBuf,
        #[serde(default)]
        encoding: EncodingConfig,
    },
    OverlayAudio {
        base: PathBuf,
        audio: Vec<AudioInput>,
        output: PathBuf,
        #[serde(default)]
        encoding: EncodingConfig,
    },
    UploadImage {
        file: PathBuf,
        source: ImageSource,
        #[serde(default)]
        image_id: Option<String>,
        #[serde(default)]
        session_id: Option<String>,
        #[serde(default)]
        image_name: Option<String>,
        #[serde(default)]
        context: Option<String>,
    },
    GetImage {
        image_id: String,
    },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::OverlayImages { .. } => "overlay_images",
            Job::Concatenate { .. } => "concatenate",
            Job::OverlayAudio { .. } => "overlay_audio",
            Job::UploadImage { .. } => "upload_image",
            Job::GetImage { .. } => "get_image",
        }
    }

    /// Whether running this job needs the asset gateway.
    pub fn needs_assets(&self) -> bool {
        matches!(self, Job::UploadImage { .. } | Job::GetImage { .. })
    }

    /// Parse a job from JSON text.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("invalid job description")
    }

    /// Read and parse a job file.
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read job file {}", path.display()))?;
        Self::from_json(&text)
    }
}

/// Result printed to stdout when a job succeeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobOutcome {
    Rendered { output: PathBuf },
    Uploaded { image_id: String },
    Metadata { image: Option<ImageMetadata> },
}

/// Executes jobs against a compositor and an optional asset gateway.
pub struct JobRunner {
    compositor: Compositor,
    assets: Option<Arc<dyn AssetService>>,
}

impl JobRunner {
    pub fn new(compositor: Compositor) -> Self {
        Self {
            compositor,
            assets: None,
        }
    }

    pub fn with_assets(mut self, assets: Arc<dyn AssetService>) -> Self {
        self.assets = Some(assets);
        self
    }

    fn assets(&self) -> anyhow::Result<&dyn AssetService> {
        self.assets
            .as_deref()
            .ok_or_else(|| anyhow!("asset gateway is not configured"))
    }

    pub async fn run(&self, job: Job) -> anyhow::Result<JobOutcome> {
        let span = info_span!("job", kind = job.kind());
        self.run_inner(job).instrument(span).await
    }

    async fn run_inner(&self, job: Job) -> anyhow::Result<JobOutcome> {
        info!("Job started");
        let outcome = match job {
            Job::OverlayImages {
                base,
                images,
                output,
                encoding,
            } => {
                let output = self
                    .compositor
                    .add_image_clips_to_video(&base, &images, &output, &encoding)
                    .await?;
                JobOutcome::Rendered { output }
            }
            Job::Concatenate {
                segments,
                output,
                encoding,
            } => {
                let output = self
                    .compositor
                    .concatenate_video_clips(&segments, &output, &encoding)
                    .await?;
                JobOutcome::Rendered { output }
            }
            Job::OverlayAudio {
                base,
                audio,
                output,
                encoding,
            } => {
                let output = self
                    .compositor
                    .add_audio_clips_to_video(&base, &audio, &output, &encoding)
                    .await?;
                JobOutcome::Rendered { output }
            }
            Job::UploadImage {
                file,
                source,
                image_id,
                session_id,
                image_name,
                context,
            } => {
                let assets = self.assets()?;
                let upload = read_upload(&file, source, image_id, session_id, image_name, context)
                    .await?;
                let image_id = assets.upload_image_asset(upload).await?;
                JobOutcome::Uploaded { image_id }
            }
            Job::GetImage { image_id } => {
                let image = self
                    .assets()?
                    .get_image_metadata_with_signed_url(&image_id)
                    .await?;
                JobOutcome::Metadata { image }
            }
        };
        info!("Job finished");
        Ok(outcome)
    }
}

async fn read_upload(
    file: &Path,
    source: ImageSource,
    image_id: Option<String>,
    session_id: Option<String>,
    image_name: Option<String>,
    context: Option<String>,
) -> anyhow::Result<ImageUpload> {
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("{} has no file name", file.display()))?;
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let mut upload = ImageUpload::new(bytes, file_name, source)?;
    if let Some(id) = image_id {
        upload = upload.with_image_id(id)?;
    }
    if let Some(session_id) = session_id {
        upload = upload.with_session_id(session_id);
    }
    if let Some(name) = image_name {
        upload = upload.with_name(name);
    }
    if let Some(context) = context {
        upload = upload.with_context(context);
    }
    Ok(upload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_assets::MockAssetService;
    use clipforge_models::{HorizontalAnchor, Position, VerticalAnchor};

    #[test]
    fn test_parse_overlay_job() {
        let job = Job::from_json(
            r#"{
                "kind": "overlay_images",
                "base": "in.mp4",
                "output": "out.mp4",
                "images": [
                    {"path": "logo.png", "position": ["center", "bottom"], "height": 80},
                    {"path": "badge.png", "position": [10, 20], "duration": 2.5}
                ]
            }"#,
        )
        .unwrap();

        let Job::OverlayImages {
            images, encoding, ..
        } = &job
        else {
            panic!("unexpected job {:?}", job);
        };
        assert_eq!(
            images[0].position,
            Position::anchored(HorizontalAnchor::Center, VerticalAnchor::Bottom)
        );
        assert_eq!(images[0].height, Some(80));
        assert_eq!(images[1].position, Position::pixels(10, 20));
        assert_eq!(images[1].duration, Some(2.5));
        assert_eq!(encoding, &EncodingConfig::default());
        assert!(!job.needs_assets());
    }

    #[test]
    fn test_parse_asset_jobs() {
        let job = Job::from_json(r#"{"kind": "get_image", "image_id": "abc"}"#).unwrap();
        assert_eq!(
            job,
            Job::GetImage {
                image_id: "abc".to_string()
            }
        );
        assert!(job.needs_assets());

        let job =
            Job::from_json(r#"{"kind": "upload_image", "file": "a.png", "source": "Imagen"}"#)
                .unwrap();
        assert_eq!(job.kind(), "upload_image");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(Job::from_json(r#"{"kind": "transcode"}"#).is_err());
    }

    #[tokio::test]
    async fn test_asset_job_without_gateway_fails() {
        let runner = JobRunner::new(Compositor::new());
        let err = runner
            .run(Job::GetImage {
                image_id: "abc".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn test_upload_job_with_mock_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("logo.png");
        std::fs::write(&file, b"png").unwrap();

        let runner =
            JobRunner::new(Compositor::new()).with_assets(Arc::new(MockAssetService::new()));
        let outcome = runner
            .run(Job::UploadImage {
                file,
                source: ImageSource::Brand,
                image_id: Some("fixed".to_string()),
                session_id: None,
                image_name: None,
                context: None,
            })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            JobOutcome::Uploaded {
                image_id: "fixed".to_string()
            }
        );
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            r#"{"image_id":"fixed"}"#
        );
    }

    #[tokio::test]
    async fn test_upload_job_rejects_disallowed_type() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, b"text").unwrap();

        let runner =
            JobRunner::new(Compositor::new()).with_assets(Arc::new(MockAssetService::new()));
        let result = runner
            .run(Job::UploadImage {
                file,
                source: ImageSource::Brand,
                image_id: None,
                session_id: None,
                image_name: None,
                context: None,
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_image_job_not_found() {
        let runner =
            JobRunner::new(Compositor::new()).with_assets(Arc::new(MockAssetService::new()));
        let outcome = runner
            .run(Job::GetImage {
                image_id: "not_found".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, JobOutcome::Metadata { image: None });
    }
}
