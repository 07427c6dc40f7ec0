//! Imported animated models.
//!
//! A glTF file is read on a background thread ([`AssetLoader::spawn`]) and
//! handed back exactly once through a [`PendingAsset`]. The result is an
//! [`AnimatedAsset`]: a node hierarchy with triangle meshes and, if the file
//! has any, its first animation clip playing on a loop.

pub mod animation;
mod import;

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use glam::{Mat4, Quat, Vec3};

pub use animation::{AnimationClip, Trs};

use crate::error::ViewerError;
use crate::options::AssetOptions;
use crate::scene::MeshData;

/// One drawable primitive of an imported model.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetMesh {
    /// Triangle geometry.
    pub mesh: MeshData,
    /// Base color multiplier.
    pub base_color: [f32; 4],
    /// Index into [`AnimatedAsset::textures`] for the base color map.
    pub texture: Option<usize>,
}

/// RGBA8 image embedded in or referenced by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetTexture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

/// A node in the imported hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetNode {
    /// Bind-pose local transform.
    pub rest: Trs,
    /// Child node indices.
    pub children: Vec<usize>,
    /// Indices into [`AnimatedAsset::meshes`] drawn at this node.
    pub meshes: Vec<usize>,
}

/// A loaded model with its animation state.
#[derive(Debug, Clone)]
pub struct AnimatedAsset {
    nodes: Vec<AssetNode>,
    roots: Vec<usize>,
    meshes: Vec<AssetMesh>,
    textures: Vec<AssetTexture>,
    clip: Option<AnimationClip>,
    locals: Vec<Trs>,
    time: f32,
}

impl AnimatedAsset {
    /// Assemble an asset and pose it at time zero.
    #[must_use]
    pub fn new(
        nodes: Vec<AssetNode>,
        roots: Vec<usize>,
        meshes: Vec<AssetMesh>,
        textures: Vec<AssetTexture>,
        clip: Option<AnimationClip>,
    ) -> Self {
        let locals = nodes.iter().map(|n| n.rest).collect();
        let mut asset = Self {
            nodes,
            roots,
            meshes,
            textures,
            clip,
            locals,
            time: 0.0,
        };
        asset.pose();
        asset
    }

    /// Advance the clip by `dt` seconds and re-pose.
    pub fn update(&mut self, dt: f32) {
        if self.clip.is_none() {
            return;
        }
        self.time += dt;
        self.pose();
    }

    fn pose(&mut self) {
        for (local, node) in self.locals.iter_mut().zip(&self.nodes) {
            *local = node.rest;
        }
        if let Some(clip) = &self.clip {
            self.time = clip.wrap(self.time);
            clip.sample(self.time, &mut self.locals);
        }
    }

    /// Playback position within the clip, in seconds.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// The clip playing, if the model has one.
    #[must_use]
    pub fn clip(&self) -> Option<&AnimationClip> {
        self.clip.as_ref()
    }

    /// Drawable primitives.
    #[must_use]
    pub fn meshes(&self) -> &[AssetMesh] {
        &self.meshes
    }

    /// Images referenced by [`AssetMesh::texture`].
    #[must_use]
    pub fn textures(&self) -> &[AssetTexture] {
        &self.textures
    }

    /// Current local transform of each node.
    #[must_use]
    pub fn locals(&self) -> &[Trs] {
        &self.locals
    }

    /// Every `(mesh index, world transform)` pair to draw this frame.
    ///
    /// Nodes reachable more than once (malformed files) are drawn once.
    #[must_use]
    pub fn draw_list(&self, root: Mat4) -> Vec<(usize, Mat4)> {
        let mut out = Vec::new();
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(usize, Mat4)> =
            self.roots.iter().rev().map(|&r| (r, root)).collect();
        while let Some((index, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }
            let world = parent * self.locals[index].to_matrix();
            out.extend(node.meshes.iter().map(|&m| (m, world)));
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }
        out
    }
}

/// Root transform that places the asset in the scene.
///
/// With `face_camera`, the asset is turned about the vertical axis so its
/// +Z faces the camera at `eye`.
#[must_use]
pub fn placement(options: &AssetOptions, eye: Vec3) -> Mat4 {
    let position = Vec3::from(options.position);
    let yaw = if options.face_camera {
        let to_eye = eye - position;
        to_eye.x.atan2(to_eye.z)
    } else {
        0.0
    };
    Mat4::from_scale_rotation_translation(
        Vec3::splat(options.scale),
        Quat::from_rotation_y(yaw),
        position,
    )
}

/// Result of polling a [`PendingAsset`].
#[derive(Debug)]
pub enum AssetPoll {
    /// Still loading.
    Pending,
    /// Finished, successfully or not.
    Ready(Result<AnimatedAsset, ViewerError>),
}

/// Starts background imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetLoader;

impl AssetLoader {
    /// Import `path` on a new `asset-import` thread.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::ThreadSpawn`] if the thread cannot start.
    pub fn spawn(
        path: impl Into<PathBuf>,
    ) -> Result<PendingAsset, ViewerError> {
        let path = path.into();
        let label = path.display().to_string();
        let (tx, rx) = mpsc::channel();
        log::info!("importing {label}");
        let _handle = std::thread::Builder::new()
            .name("asset-import".into())
            .spawn(move || {
                let _ = tx.send(import::import(&path));
            })
            .map_err(ViewerError::ThreadSpawn)?;
        Ok(PendingAsset { rx, label })
    }

    /// Import `path` on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::AssetImport`] if the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<AnimatedAsset, ViewerError> {
        import::import(path)
    }
}

/// An import in flight. Yields its result exactly once.
#[derive(Debug)]
pub struct PendingAsset {
    rx: mpsc::Receiver<Result<AnimatedAsset, ViewerError>>,
    label: String,
}

impl PendingAsset {
    /// Path being imported, for logging.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Non-blocking check for the import result.
    pub fn poll(&self) -> AssetPoll {
        match self.rx.try_recv() {
            Ok(result) => AssetPoll::Ready(result),
            Err(mpsc::TryRecvError::Empty) => AssetPoll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => {
                AssetPoll::Ready(Err(ViewerError::AssetImport(format!(
                    "{}: import worker exited without a result",
                    self.label
                ))))
            }
        }
    }

    /// Block until the import finishes.
    ///
    /// # Errors
    ///
    /// Returns the import error, or [`ViewerError::AssetImport`] if the
    /// worker died.
    pub fn wait(self) -> Result<AnimatedAsset, ViewerError> {
        self.rx.recv().unwrap_or_else(|_| {
            Err(ViewerError::AssetImport(format!(
                "{}: import worker exited without a result",
                self.label
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::animation::{Channel, ChannelValues, Interpolation};
    use super::*;

    fn two_node_asset() -> AnimatedAsset {
        let parent = AssetNode {
            rest: Trs {
                translation: Vec3::new(0.0, 1.0, 0.0),
                ..Trs::default()
            },
            children: vec![1],
            meshes: vec![0],
        };
        let child = AssetNode {
            rest: Trs {
                translation: Vec3::new(1.0, 0.0, 0.0),
                ..Trs::default()
            },
            children: Vec::new(),
            meshes: vec![1],
        };
        let mesh = AssetMesh {
            mesh: MeshData::plane(1.0, 0.0),
            base_color: [1.0; 4],
            texture: None,
        };
        let clip = AnimationClip::new(
            None,
            vec![Channel {
                node: 1,
                times: vec![0.0, 2.0],
                values: ChannelValues::Translation(vec![
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(3.0, 0.0, 0.0),
                ]),
                interpolation: Interpolation::Linear,
            }],
        );
        AnimatedAsset::new(
            vec![parent, child],
            vec![0],
            vec![mesh.clone(), mesh],
            Vec::new(),
            Some(clip),
        )
    }

    #[test]
    fn draw_list_composes_hierarchy() {
        let asset = two_node_asset();
        let list = asset.draw_list(Mat4::IDENTITY);
        assert_eq!(list.len(), 2);
        let child_origin = list[1].1.transform_point3(Vec3::ZERO);
        assert_eq!(child_origin, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn update_advances_and_loops() {
        let mut asset = two_node_asset();
        asset.update(1.0);
        assert_eq!(asset.locals()[1].translation.x, 2.0);
        asset.update(1.5);
        assert!((asset.time() - 0.5).abs() < 1e-6);
        assert!((asset.locals()[1].translation.x - 1.5).abs() < 1e-6);
    }

    #[test]
    fn cyclic_hierarchy_terminates() {
        let node = AssetNode {
            rest: Trs::default(),
            children: vec![0],
            meshes: vec![0],
        };
        let asset =
            AnimatedAsset::new(vec![node], vec![0], Vec::new(), Vec::new(), None);
        assert_eq!(asset.draw_list(Mat4::IDENTITY).len(), 1);
    }

    #[test]
    fn placement_faces_camera() {
        let options = AssetOptions::default();
        let eye = Vec3::new(0.0, 1.2, 5.0);
        let m = placement(&options, eye);
        let origin = m.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(-3.0, -1.6, 0.0)).length() < 1e-5);

        let facing = m.transform_vector3(Vec3::Z).normalize();
        let mut to_eye = eye - origin;
        to_eye.y = 0.0;
        assert!((facing - to_eye.normalize()).length() < 1e-5);
        assert!((m.transform_vector3(Vec3::Y).length() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn missing_file_reports_import_error() {
        let pending =
            AssetLoader::spawn("/definitely/not/here/model.glb").unwrap();
        match pending.wait() {
            Err(ViewerError::AssetImport(msg)) => {
                assert!(msg.contains("model.glb"));
            }
            other => panic!("expected import error, got {other:?}"),
        }
    }
}
