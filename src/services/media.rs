use crate::config::Config;
use crate::error::ServiceError;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Client for the Cloudinary upload API. Image bytes arrive as base64 `data:`
/// URIs and are stored under a folder; the returned `secure_url` is what gets
/// persisted on posts and avatars.
#[derive(Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl MediaClient {
    pub fn new(config: &Config) -> Self {
        MediaClient {
            http: reqwest::Client::new(),
            cloud_name: config.cloudinary.cloud_name.clone(),
            api_key: config.cloudinary.api_key.clone(),
            api_secret: config.cloudinary.api_secret.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    /// Uploads a base64 data URI and returns the hosted URL.
    pub async fn upload_image(&self, data_uri: &str, folder: &str) -> Result<String, ServiceError> {
        if !self.is_configured() {
            return Err(ServiceError::Validation(
                "Image uploads are not available: media host is not configured".to_string(),
            ));
        }

        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder), ("timestamp", timestamp.as_str())]);

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        );
        let params = [
            ("file", data_uri),
            ("folder", folder),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<UploadResponse>()
            .await?;

        log::info!("Uploaded image to media host: {}", response.secure_url);
        Ok(response.secure_url)
    }

    /// Best-effort removal of a previously stored asset. Failures are logged
    /// and swallowed; user-facing operations never fail on cleanup.
    pub async fn delete_image(&self, secure_url: &str) {
        if !self.is_configured() {
            return;
        }
        let Some(public_id) = public_id_from_url(secure_url) else {
            log::warn!("Could not derive public id from media URL: {}", secure_url);
            return;
        };

        let timestamp = Utc::now().timestamp().to_string();
        let signature =
            self.sign(&[("public_id", public_id.as_str()), ("timestamp", timestamp.as_str())]);

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/destroy",
            self.cloud_name
        );
        let params = [
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        match self.http.post(&url).form(&params).send().await {
            Ok(resp) if resp.status().is_success() => {
                log::info!("Deleted media asset: {}", public_id);
            }
            Ok(resp) => {
                log::warn!(
                    "Media host returned {} deleting asset {}",
                    resp.status(),
                    public_id
                );
            }
            Err(err) => {
                log::warn!("Failed to delete media asset {}: {:?}", public_id, err);
            }
        }
    }

    /// SHA-256 signature over the sorted parameters, per the Cloudinary
    /// authentication scheme.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<(&str, &str)> = params.to_vec();
        sorted.sort_by_key(|(key, _)| *key);
        let to_sign = sorted
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Checks whether a stored reference points at the media host (as opposed to
/// a caller-supplied external URL, which is never deleted).
pub fn is_hosted_url(url: &str) -> bool {
    url.contains("cloudinary.com")
}

/// Validates that an inbound image payload is a base64 `data:` URI that
/// actually decodes.
pub fn validate_data_uri(data_uri: &str) -> Result<(), ServiceError> {
    let payload = data_uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| {
            ServiceError::Validation(
                "Image data must be a base64 data URI (data:<mime>;base64,...)".to_string(),
            )
        })?;

    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| ServiceError::Validation("Image data is not valid base64".to_string()))?;
    Ok(())
}

/// Derives the public id (`folder/name`) from a hosted URL like
/// `https://res.cloudinary.com/<cloud>/image/upload/v123/folder/name.jpg`.
fn public_id_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/upload/")?;
    let segments: Vec<&str> = rest
        .split('/')
        .skip_while(|segment| {
            segment.len() > 1
                && segment.starts_with('v')
                && segment[1..].chars().all(|c| c.is_ascii_digit())
        })
        .collect();
    if segments.is_empty() {
        return None;
    }
    let mut public_id = segments.join("/");
    if let Some(dot) = public_id.rfind('.') {
        public_id.truncate(dot);
    }
    Some(public_id)
}
