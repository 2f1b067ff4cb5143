use std::fs;

use showdown::{BuiltinModel, ModelError, ModelManager};

#[tokio::test]
async fn test_corrupt_files_fail_verification() -> Result<(), ModelError> {
    let dir = tempfile::tempdir()?;
    let manager = ModelManager::new(dir.path())?;
    let model = BuiltinModel::MiniLM;

    let model_path = manager.get_model_path(model);
    fs::create_dir_all(model_path.parent().unwrap())?;
    fs::write(&model_path, b"not a model")?;
    fs::write(manager.get_tokenizer_path(model), b"{}")?;

    assert!(manager.is_model_downloaded(model));
    assert!(!manager.verify_model(model)?);

    manager.remove_download(model)?;
    assert!(!manager.is_model_downloaded(model));
    Ok(())
}

#[tokio::test]
async fn test_model_paths() -> Result<(), ModelError> {
    let dir = tempfile::tempdir()?;
    let manager = ModelManager::new(dir.path().join("nested"))?;

    assert!(manager.models_dir().is_dir());
    assert!(manager.get_model_path(BuiltinModel::MiniLM).ends_with("minilm/model.onnx"));
    assert!(manager.get_tokenizer_path(BuiltinModel::MiniLM).ends_with("minilm/tokenizer.json"));
    Ok(())
}

#[tokio::test]
#[ignore = "downloads the embedding model"]
async fn test_model_download() -> Result<(), ModelError> {
    let dir = tempfile::tempdir()?;
    let manager = ModelManager::new(dir.path())?;
    let model = BuiltinModel::MiniLM;

    assert!(!manager.is_model_downloaded(model));
    manager.download_model(model).await?;
    assert!(manager.is_model_downloaded(model));
    assert!(manager.verify_model(model)?);

    // Corrupted files are replaced on the next ensure.
    fs::write(manager.get_tokenizer_path(model), b"{}")?;
    manager.ensure_model_downloaded(model).await?;
    assert!(manager.verify_model(model)?);
    Ok(())
}
