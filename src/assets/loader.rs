use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use log::{error, info};

use super::{gltf, obj, AssetError, LoadState, LoadedAsset};

type LoadResult = Result<LoadedAsset, AssetError>;

/// Loads a model synchronously, choosing the importer by file extension
pub fn load_blocking(path: &Path) -> LoadResult {
    std::fs::metadata(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("gltf") | Some("glb") => gltf::load(path),
        Some("obj") => obj::load(path),
        _ => Err(AssetError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Spawns one background thread per load
#[derive(Debug, Default, Clone, Copy)]
pub struct AssetLoader;

impl AssetLoader {
    pub fn new() -> Self {
        Self
    }

    /// Starts loading `path` and returns immediately
    pub fn load(&self, path: impl AsRef<Path>) -> AssetHandle {
        let path = path.as_ref().to_path_buf();
        let (sender, handle) = AssetHandle::channel(path.clone());

        let thread_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("asset-loader:{}", path.display()))
            .spawn(move || {
                let result = load_blocking(&thread_path);
                if let Ok(asset) = &result {
                    info!(
                        "Loaded {} ({} vertices, {} clips)",
                        thread_path.display(),
                        asset.object.vertex_count(),
                        asset.clips.len()
                    );
                }
                // The receiver may be gone if the scene shut down first
                let _ = sender.send(result);
            });

        if let Err(err) = spawned {
            // The sender was dropped with the closure; the handle reports Cancelled
            error!("Failed to spawn loader for {}: {}", path.display(), err);
        }

        handle
    }
}

/// Completion signal for one load
///
/// Poll it without blocking through [`AssetHandle::try_take`], or `.await` it.
/// Once a final state has been returned the handle is spent and reports
/// [`AssetError::Cancelled`].
pub struct AssetHandle {
    path: PathBuf,
    receiver: Option<oneshot::Receiver<LoadResult>>,
}

impl AssetHandle {
    /// A handle paired with the sender that completes it
    pub fn channel(path: PathBuf) -> (oneshot::Sender<LoadResult>, Self) {
        let (sender, receiver) = oneshot::channel();
        (
            sender,
            Self {
                path,
                receiver: Some(receiver),
            },
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking poll
    pub fn try_take(&mut self) -> LoadState {
        let Some(receiver) = self.receiver.as_mut() else {
            return LoadState::Failed(AssetError::Cancelled);
        };

        match receiver.try_recv() {
            Ok(None) => LoadState::Pending,
            Ok(Some(result)) => {
                self.receiver = None;
                match result {
                    Ok(asset) => LoadState::Loaded(asset),
                    Err(err) => LoadState::Failed(err),
                }
            }
            Err(oneshot::Canceled) => {
                self.receiver = None;
                LoadState::Failed(AssetError::Cancelled)
            }
        }
    }
}

impl Future for AssetHandle {
    type Output = LoadResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Poll::Ready(Err(AssetError::Cancelled));
        };

        match Pin::new(receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(result) => {
                self.receiver = None;
                Poll::Ready(result.unwrap_or(Err(AssetError::Cancelled)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::Rgb;
    use crate::gfx::scene::object::{Material, Object};

    fn asset() -> LoadedAsset {
        LoadedAsset {
            object: Object::new("model", Vec::new(), Material::toon(Rgb::WHITE)),
            clips: Vec::new(),
        }
    }

    #[test]
    fn test_handle_pending_then_loaded() {
        let (sender, mut handle) = AssetHandle::channel(PathBuf::from("model.glb"));
        assert!(handle.try_take().is_pending());

        assert!(sender.send(Ok(asset())).is_ok());
        match handle.try_take() {
            LoadState::Loaded(asset) => assert_eq!(asset.object.name, "model"),
            _ => panic!("expected a loaded asset"),
        }
    }

    #[test]
    fn test_handle_reports_failure_reason() {
        let (sender, mut handle) = AssetHandle::channel(PathBuf::from("model.fbx"));
        assert!(sender
            .send(Err(AssetError::UnsupportedFormat("model.fbx".into())))
            .is_ok());

        assert!(matches!(
            handle.try_take(),
            LoadState::Failed(AssetError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_dropped_sender_is_cancelled() {
        let (sender, mut handle) = AssetHandle::channel(PathBuf::from("model.glb"));
        drop(sender);
        assert!(matches!(
            handle.try_take(),
            LoadState::Failed(AssetError::Cancelled)
        ));
    }

    #[test]
    fn test_missing_file_fails_through_loader() {
        let handle = AssetLoader::new().load("does/not/exist.glb");
        let result = pollster::block_on(handle);
        assert!(matches!(result, Err(AssetError::Io { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let path = std::env::temp_dir().join("galaxy_scene_model.fbx");
        std::fs::write(&path, b"not a model").unwrap();

        let result = load_blocking(&path);
        assert!(matches!(result, Err(AssetError::UnsupportedFormat(_))));

        let _ = std::fs::remove_file(path);
    }
}
