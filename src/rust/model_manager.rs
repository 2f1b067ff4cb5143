use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, warn};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::models::{BuiltinModel, ModelInfo};

/// Environment variable overriding the model cache root.
pub const CACHE_ENV_VAR: &str = "SHOWDOWN_CACHE";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Model verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// Downloads embedding models into a local cache and checks them against
/// their published SHA-256 digests.
#[derive(Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Resolves the cache directory: `$SHOWDOWN_CACHE/models`, then the
    /// platform cache dir, then `~/.cache`, then the system temp dir.
    pub fn get_default_models_dir() -> PathBuf {
        if let Ok(path) = env::var(CACHE_ENV_VAR) {
            return PathBuf::from(path).join("models");
        }
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("showdown").join("models");
        }
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("showdown").join("models");
        }
        env::temp_dir().join("showdown").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_path(&self, model: BuiltinModel) -> PathBuf {
        self.models_dir.join(model.get_model_info().name).join("model.onnx")
    }

    pub fn get_tokenizer_path(&self, model: BuiltinModel) -> PathBuf {
        self.models_dir.join(model.get_model_info().name).join("tokenizer.json")
    }

    pub fn is_model_downloaded(&self, model: BuiltinModel) -> bool {
        let model_path = self.get_model_path(model);
        let tokenizer_path = self.get_tokenizer_path(model);
        debug!(
            "Model {:?}: model.onnx exists={}, tokenizer.json exists={}",
            model,
            model_path.exists(),
            tokenizer_path.exists()
        );
        model_path.exists() && tokenizer_path.exists()
    }

    /// Downloads whichever of the model's files are missing or fail
    /// verification. Partial downloads are removed on failure.
    pub async fn download_model(&self, model: BuiltinModel) -> Result<(), ModelError> {
        let info = model.get_model_info();
        let _lock = self.download_lock.lock().await;

        fs::create_dir_all(self.models_dir.join(&info.name))?;

        let model_result = self
            .fetch_if_needed(
                &info.model_url,
                &self.get_model_path(model),
                &info.model_hash,
                "model",
            )
            .await;
        let tokenizer_result = match model_result {
            Ok(()) => {
                self.fetch_if_needed(
                    &info.tokenizer_url,
                    &self.get_tokenizer_path(model),
                    &info.tokenizer_hash,
                    "tokenizer",
                )
                .await
            }
            Err(e) => Err(e),
        };

        match tokenizer_result {
            Ok(()) => {
                info!("Model '{}' ready to use", info.name);
                Ok(())
            }
            Err(e) => {
                error!("Failed to set up model '{}': {}", info.name, e);
                let _ = self.remove_download(model);
                Err(e)
            }
        }
    }

    async fn fetch_if_needed(
        &self,
        url: &str,
        path: &Path,
        expected_hash: &str,
        file_type: &str,
    ) -> Result<(), ModelError> {
        if path.exists() {
            if self.verify_file(path, expected_hash)? {
                debug!("Existing {} file verified at {:?}", file_type, path);
                return Ok(());
            }
            warn!("{} file at {:?} failed verification, downloading again", file_type, path);
        }
        self.download_and_verify_file(url, path, expected_hash, file_type).await
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, ModelError> {
        let bytes = fs::read(path)?;
        Ok(sha256_hex(&bytes) == expected_hash)
    }

    /// True only if both files exist and match their digests.
    pub fn verify_model(&self, model: BuiltinModel) -> Result<bool, ModelError> {
        let info = model.get_model_info();
        let model_path = self.get_model_path(model);
        let tokenizer_path = self.get_tokenizer_path(model);

        if !model_path.exists() || !tokenizer_path.exists() {
            debug!("Model '{}' is incomplete on disk", info.name);
            return Ok(false);
        }

        let model_ok = self.verify_file(&model_path, &info.model_hash)?;
        let tokenizer_ok = self.verify_file(&tokenizer_path, &info.tokenizer_hash)?;
        debug!(
            "Model '{}' verification: model={}, tokenizer={}",
            info.name, model_ok, tokenizer_ok
        );
        Ok(model_ok && tokenizer_ok)
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: &str,
        file_type: &str,
    ) -> Result<(), ModelError> {
        info!("Downloading {} file from {}", file_type, url);
        let response = reqwest::get(url).await?.error_for_status()?;
        let bytes = response.bytes().await?;

        let hash = sha256_hex(&bytes);
        if hash != expected_hash {
            return Err(ModelError::HashMismatch {
                file_type: file_type.to_string(),
                expected: expected_hash.to_string(),
                actual: hash,
            });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;

        if !self.verify_file(path, expected_hash)? {
            return Err(ModelError::VerificationFailed);
        }
        info!("{} file ({} bytes) downloaded and verified", file_type, bytes.len());
        Ok(())
    }

    pub fn remove_download(&self, model: BuiltinModel) -> Result<(), ModelError> {
        for path in [self.get_model_path(model), self.get_tokenizer_path(model)] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Downloads the model if it is missing, and downloads it again if the
    /// files on disk fail verification.
    pub async fn ensure_model_downloaded(&self, model: BuiltinModel) -> Result<(), ModelError> {
        if self.is_model_downloaded(model) {
            if self.verify_model(model)? {
                return Ok(());
            }
            warn!("Model {:?} failed verification, re-downloading", model);
            self.remove_download(model)?;
        }
        self.download_model(model).await
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_paths() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path()).unwrap();
        let model_path = manager.get_model_path(BuiltinModel::MiniLM);
        let tokenizer_path = manager.get_tokenizer_path(BuiltinModel::MiniLM);

        assert!(model_path.ends_with("minilm/model.onnx"));
        assert!(tokenizer_path.ends_with("minilm/tokenizer.json"));
    }

    #[test]
    fn test_verification_of_missing_and_corrupt_files() -> Result<(), ModelError> {
        let dir = tempfile::tempdir()?;
        let manager = ModelManager::new(dir.path())?;
        let model = BuiltinModel::MiniLM;

        assert!(!manager.is_model_downloaded(model));
        assert!(!manager.verify_model(model)?);

        let model_path = manager.get_model_path(model);
        fs::create_dir_all(model_path.parent().unwrap())?;
        fs::write(&model_path, "corrupted data")?;
        fs::write(manager.get_tokenizer_path(model), "{}")?;

        assert!(manager.is_model_downloaded(model));
        assert!(!manager.verify_model(model)?);

        manager.remove_download(model)?;
        assert!(!manager.is_model_downloaded(model));
        Ok(())
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_default_models_dir() {
        env::set_var(CACHE_ENV_VAR, "/tmp/showdown-test-cache");
        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("/tmp/showdown-test-cache/models"));
        env::remove_var(CACHE_ENV_VAR);

        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("showdown"));
    }

    #[tokio::test]
    #[ignore = "downloads the MiniLM model"]
    async fn test_model_download() -> Result<(), ModelError> {
        let manager = ModelManager::new_default()?;
        manager.ensure_model_downloaded(BuiltinModel::MiniLM).await?;
        assert!(manager.verify_model(BuiltinModel::MiniLM)?);
        Ok(())
    }
}
