// Copyright 2026 Unisearch Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Spatial search capability.
//!
//! No backend ships with the crate yet. [`UnsupportedScene`] answers every
//! call with an empty collection, which callers treat as "unsupported"
//! rather than as a failure.

use serde::Serialize;

use crate::model::SearchResult;

/// Opaque handle to a host scene or spatial index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SceneHandle(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialResult {
    #[serde(flatten)]
    pub result: SearchResult,
    pub distance: f32,
    pub bounding_box: BoundingBox,
}

pub trait SpatialSearch: Send + Sync {
    fn set_scene(&mut self, _scene: SceneHandle) {}

    fn search_in_3d(&self, _query: &str, _radius: Option<f32>) -> Vec<SpatialResult> {
        Vec::new()
    }

    fn highlight_results(&mut self, _results: &[SpatialResult]) {}

    fn clear_highlights(&mut self) {}

    fn focus_on_result(&mut self, _result: &SpatialResult, _camera: Option<&Camera>) {}

    /// Whether this backend actually indexes spatial nodes.
    fn is_supported(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct UnsupportedScene {
    scene: Option<SceneHandle>,
}

impl UnsupportedScene {
    pub fn scene(&self) -> Option<&SceneHandle> {
        self.scene.as_ref()
    }
}

impl SpatialSearch for UnsupportedScene {
    fn set_scene(&mut self, scene: SceneHandle) {
        tracing::debug!(scene = %scene.0, "spatial search is not supported; scene ignored");
        self.scene = Some(scene);
    }
}
