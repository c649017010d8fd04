//! Interactive hit testing for point clouds.
//!
//! Maps the pointer to the points under it once per frame, throttled to
//! periods of recent pointer activity, and reports hover, click and double
//! click with the indices of the points hit. Lookups go through an octree
//! built in the background for every new geometry snapshot.

pub mod engine;
pub mod errors;
pub mod rpc;

pub use errors::{HitTestError, Result};

pub mod prelude {
    pub use crate::engine::camera::{BevyCamera, CameraProjection, Pick, PickCamera, pick};
    pub use crate::engine::core::plugin::{HitTestPlugin, HitTestSystems};
    pub use crate::engine::events::{HitTestEvent, HitTestEventKind, ListenerId, PointerSnapshot};
    pub use crate::engine::hit_test::{HitTest, HitTestBuilder, IndexState};
    pub use crate::engine::interaction::{InteractionPhase, Scheduler, VirtualScheduler};
    pub use crate::engine::point_cloud::{
        CameraMotion, CameraMotionFlag, PointCloudView, PointSource, SharedPointCloud,
    };
    pub use crate::engine::point_set::PointSet;
    pub use crate::engine::settings::HitTestSettings;
    pub use crate::engine::spatial::{OctreeConfig, PointOctree, RayHit};
    pub use crate::errors::{HitTestError, Result};
    pub use crate::rpc::HitTestRpcPlugin;
}
