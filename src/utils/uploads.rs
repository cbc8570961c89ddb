use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::env;

pub const UPLOAD_FOLDER: &str = "writeora";

/// Cloudinary configuration loaded from environment variables
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub upload_preset: Option<String>,
}

impl CloudinaryConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            cloud_name: env::var("CLOUDINARY_CLOUD_NAME")
                .map_err(|_| "CLOUDINARY_CLOUD_NAME is required")?,
            api_key: env::var("CLOUDINARY_API_KEY")
                .map_err(|_| "CLOUDINARY_API_KEY is required")?,
            api_secret: env::var("CLOUDINARY_API_SECRET")
                .map_err(|_| "CLOUDINARY_API_SECRET is required")?,
            upload_preset: env::var("CLOUDINARY_UPLOAD_PRESET").ok(),
        })
    }

    pub fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        )
    }

    /// Signature over the alphabetically sorted `key=value` pairs followed by the secret.
    pub fn generate_signature(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let joined = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha1::new();
        hasher.update(format!("{}{}", joined, self.api_secret).as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Subset of the Cloudinary upload response the API hands back
#[derive(Debug, Deserialize)]
pub struct CloudinaryUploadResponse {
    pub public_id: String,
    pub secure_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudinaryError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudinaryErrorResponse {
    pub error: CloudinaryError,
}

pub struct UploadService {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl UploadService {
    pub fn new() -> Result<Self, String> {
        let config = CloudinaryConfig::from_env()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: CloudinaryConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    /// Signed image upload into `folder`
    pub async fn upload_image(
        &self,
        file: FileUpload,
        folder: &str,
    ) -> Result<CloudinaryUploadResponse, String> {
        let timestamp = chrono::Utc::now().timestamp().to_string();

        let mut params = vec![("folder", folder.to_string()), ("timestamp", timestamp.clone())];
        if let Some(ref preset) = self.config.upload_preset {
            params.push(("upload_preset", preset.clone()));
        }
        let signature = self.config.generate_signature(&params);

        let mime = file
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_part = Part::bytes(file.data)
            .file_name(file.file_name)
            .mime_str(&mime)
            .map_err(|e| format!("Failed to create file part: {}", e))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("folder", folder.to_string());

        if let Some(ref preset) = self.config.upload_preset {
            form = form.text("upload_preset", preset.clone());
        }

        let response = self
            .client
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("Failed to send upload request: {}", e))?;

        if response.status().is_success() {
            response
                .json::<CloudinaryUploadResponse>()
                .await
                .map_err(|e| format!("Failed to parse upload response: {}", e))
        } else {
            let error_response = response
                .json::<CloudinaryErrorResponse>()
                .await
                .map_err(|e| format!("Failed to parse error response: {}", e))?;
            Err(format!(
                "Cloudinary upload failed: {}",
                error_response.error.message
            ))
        }
    }
}

/// A file pulled out of a multipart request
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: String, data: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            file_name,
            data,
            content_type,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct FileValidator {
    pub allowed_extensions: Vec<String>,
    /// bytes
    pub max_file_size: usize,
    pub min_file_size: Option<usize>,
}

impl FileValidator {
    /// Images between 1 KB and 10 MB
    pub fn images() -> Self {
        Self {
            allowed_extensions: ["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_size: 10 * 1024 * 1024,
            min_file_size: Some(1024),
        }
    }

    pub fn validate(&self, file: &FileUpload) -> Result<(), String> {
        if file.data.is_empty() {
            return Err("File is empty".to_string());
        }

        let extension = file.extension().ok_or("File has no extension")?;
        if !self.allowed_extensions.contains(&extension) {
            return Err(format!(
                "Invalid file type '{}'. Allowed types: {}",
                extension,
                self.allowed_extensions.join(", ")
            ));
        }

        if file.size() > self.max_file_size {
            return Err(format!(
                "File too large. Maximum size: {}, file size: {}",
                format_size(self.max_file_size),
                format_size(file.size())
            ));
        }

        if let Some(min_size) = self.min_file_size {
            if file.size() < min_size {
                return Err(format!(
                    "File too small. Minimum size: {}, file size: {}",
                    format_size(min_size),
                    format_size(file.size())
                ));
            }
        }

        Ok(())
    }
}

pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> FileUpload {
        FileUpload::new(name.to_string(), vec![0u8; size], None)
    }

    #[test]
    fn accepts_images_within_bounds() {
        let validator = FileValidator::images();
        assert!(validator.validate(&file("cover.PNG", 4096)).is_ok());
    }

    #[test]
    fn rejects_wrong_type_size_or_missing_extension() {
        let validator = FileValidator::images();
        assert!(validator.validate(&file("notes.pdf", 4096)).is_err());
        assert!(validator.validate(&file("noextension", 4096)).is_err());
        assert!(validator.validate(&file("tiny.png", 10)).is_err());
        assert!(
            validator
                .validate(&file("huge.jpg", 10 * 1024 * 1024 + 1))
                .is_err()
        );
        assert!(validator.validate(&file("empty.jpg", 0)).is_err());
    }

    #[test]
    fn signature_sorts_params() {
        let config = CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            upload_preset: None,
        };
        let a = config.generate_signature(&[
            ("timestamp", "1700000000".to_string()),
            ("folder", "writeora".to_string()),
        ]);
        let b = config.generate_signature(&[
            ("folder", "writeora".to_string()),
            ("timestamp", "1700000000".to_string()),
        ]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
        assert_eq!(
            config.upload_url(),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
