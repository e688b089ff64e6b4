//! Blocking HTTP implementation of the archive session.
//!
//! The original deployment authenticated a process-wide client and routed it
//! through a proxy at import time; here the session is an explicit value the
//! caller constructs and injects. Remote failures map to typed errors and
//! propagate uncaught; there is no retry or backoff layer.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;

use crate::image::{Image, ImageOp};
use crate::io::service::{
    ArchiveService, AssetExportRequest, DownloadRequest, ExportTaskId, ImageDescriptor,
    SearchQuery,
};
use crate::types::{Geometry, LandError, LandResult};

/// Connection parameters for [`HttpArchiveService`].
#[derive(Debug, Clone)]
pub struct HttpServiceConfig {
    /// Service root, e.g. `https://imagery.example.com/api`.
    pub base_url: String,
    /// Bearer token attached to every request, when set.
    pub auth_token: Option<String>,
    /// Outbound proxy URL, when the deployment requires one.
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl HttpServiceConfig {
    pub fn new(base_url: impl Into<String>) -> HttpServiceConfig {
        HttpServiceConfig {
            base_url: base_url.into(),
            auth_token: None,
            proxy: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Archive session over HTTP using a blocking client.
pub struct HttpArchiveService {
    client: reqwest::blocking::Client,
    base_url: String,
    auth_token: Option<String>,
}

/// Wire form of an image: identity plus its deferred op chain. The service
/// replays the ops against the stored scene.
#[derive(Debug, Serialize)]
struct WireImage<'a> {
    id: &'a str,
    archive: &'a str,
    ops: &'a [ImageOp],
}

impl<'a> WireImage<'a> {
    fn from_image(image: &'a Image) -> WireImage<'a> {
        WireImage {
            id: image.id(),
            archive: image.sensor().profile().archive,
            ops: image.ops(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DownloadPayload<'a> {
    image: WireImage<'a>,
    region: &'a Geometry,
    crs: &'a str,
    scale: u32,
}

#[derive(Debug, Serialize)]
struct AssetExportPayload<'a> {
    image: WireImage<'a>,
    asset_id: &'a str,
    description: &'a str,
    region: &'a Geometry,
    scale: u32,
    max_pixels: u64,
}

#[derive(Debug, serde::Deserialize)]
struct AssetExportResponse {
    task_id: String,
}

impl HttpArchiveService {
    pub fn connect(config: HttpServiceConfig) -> LandResult<HttpArchiveService> {
        let mut builder = reqwest::blocking::Client::builder().timeout(config.timeout);
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        let client = builder.build()?;
        log::info!("Connected to archive service at {}", config.base_url);
        Ok(HttpArchiveService {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token,
        })
    }

    fn post(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.post(url);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        request
    }
}

impl ArchiveService for HttpArchiveService {
    fn search(&self, archive: &str, query: &SearchQuery) -> LandResult<Vec<ImageDescriptor>> {
        log::debug!("Searching {} with {:?}", archive, query);

        let response = self
            .post(&format!("archives/{}/search", archive))
            .json(query)
            .send()?;
        if !response.status().is_success() {
            return Err(LandError::Service(format!(
                "search against {} failed with status {}",
                archive,
                response.status()
            )));
        }

        let descriptors: Vec<ImageDescriptor> = response.json()?;
        log::info!("{}: {} scenes match filters", archive, descriptors.len());
        Ok(descriptors)
    }

    fn download(&self, request: &DownloadRequest<'_>) -> LandResult<()> {
        let payload = DownloadPayload {
            image: WireImage::from_image(request.image),
            region: &request.region,
            crs: &request.crs,
            scale: request.scale,
        };

        let response = self.post("images/download").json(&payload).send()?;
        if !response.status().is_success() {
            return Err(LandError::Service(format!(
                "download of {} failed with status {}",
                request.image.id(),
                response.status()
            )));
        }
        let bytes = response.bytes()?;

        // Write through a temp file in the destination directory so an
        // interrupted transfer never leaves a half-written .tif behind.
        let parent = request.destination.parent().ok_or_else(|| {
            LandError::Validation(format!(
                "destination {} has no parent directory",
                request.destination.display()
            ))
        })?;
        std::fs::create_dir_all(parent)?;
        let mut staging = tempfile::NamedTempFile::new_in(parent)?;
        staging.write_all(&bytes)?;
        staging
            .persist(request.destination)
            .map_err(|e| LandError::Io(e.error))?;

        log::info!(
            "Saved {} ({} bytes) to {}",
            request.image.id(),
            bytes.len(),
            request.destination.display()
        );
        Ok(())
    }

    fn export_to_asset(&self, request: &AssetExportRequest<'_>) -> LandResult<ExportTaskId> {
        let payload = AssetExportPayload {
            image: WireImage::from_image(request.image),
            asset_id: &request.asset_id,
            description: &request.description,
            region: &request.region,
            scale: request.scale,
            max_pixels: request.max_pixels,
        };

        let response = self.post("exports/asset").json(&payload).send()?;
        if !response.status().is_success() {
            return Err(LandError::Service(format!(
                "asset export of {} failed with status {}",
                request.image.id(),
                response.status()
            )));
        }

        let submitted: AssetExportResponse = response.json()?;
        log::info!(
            "Submitted asset export task {} for {}",
            submitted.task_id,
            request.asset_id
        );
        Ok(ExportTaskId(submitted.task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageProperties;
    use crate::sensors::Sensor;

    #[test]
    fn wire_image_carries_archive_and_ops() {
        let image = Image::new(
            "LANDSAT/LE07/C02/T1_L2/LE07_122038_20030107",
            Sensor::Landsat7,
            vec!["SR_B1".into()],
            ImageProperties::default(),
        )
        .scale_bands("SR_B.", 2.75e-5, -0.2);
        let wire = WireImage::from_image(&image);
        assert_eq!(wire.archive, "LANDSAT/LE07/C02/T1_L2");
        assert_eq!(wire.ops.len(), 1);

        let encoded = serde_json::to_value(&wire).unwrap();
        assert_eq!(encoded["ops"][0]["op"], "linear_scale");
        assert_eq!(encoded["ops"][0]["pattern"], "SR_B.");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let service =
            HttpArchiveService::connect(HttpServiceConfig::new("http://localhost:9000/api/"))
                .unwrap();
        assert_eq!(service.base_url, "http://localhost:9000/api");
    }
}
