//! # Asset Loading
//!
//! Resolves model files into scene objects off the frame loop. A load
//! returns an [`AssetHandle`] immediately; the frame loop polls it every
//! frame and sees one of three states:
//!
//! - [`LoadState::Pending`] while the loader thread is still working
//! - [`LoadState::Loaded`] with the object and its animation clips
//! - [`LoadState::Failed`] with the reason
//!
//! Supported formats are glTF (`.gltf`, `.glb`) and Wavefront OBJ (`.obj`).
//!
//! ## Usage
//!
//! ```no_run
//! use galaxy_scene::assets::{AssetLoader, LoadState};
//!
//! let mut handle = AssetLoader::new().load("assets/models/Duck/glTF-Binary/Duck.glb");
//! match handle.try_take() {
//!     LoadState::Pending => {}
//!     LoadState::Loaded(asset) => println!("{} clips", asset.clips.len()),
//!     LoadState::Failed(err) => eprintln!("{err}"),
//! }
//! ```

pub mod gltf;
pub mod loader;
pub mod obj;

use std::path::PathBuf;

use thiserror::Error;

use crate::animation::AnimationClip;
use crate::gfx::scene::object::Object;

pub use loader::{load_blocking, AssetHandle, AssetLoader};

/// Why a model could not be loaded
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("glTF error: {0}")]
    Gltf(#[from] ::gltf::Error),

    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("{0} contains no triangle meshes")]
    Empty(String),

    #[error("loader ended before delivering a result")]
    Cancelled,
}

/// A model ready to insert into the scene
pub struct LoadedAsset {
    pub object: Object,
    pub clips: Vec<AnimationClip>,
}

/// Polling result for an [`AssetHandle`]
pub enum LoadState {
    Pending,
    Loaded(LoadedAsset),
    Failed(AssetError),
}

impl LoadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }
}
