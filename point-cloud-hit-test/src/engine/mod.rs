//! Hit testing engine.
//!
//! ```text
//! device input ──> interaction (Idle/Active, clicks, timers)
//!                        │
//! frame tick ──> HitTest::update ──> camera::pick ──> spatial::PointOctree
//!                        │
//!                        └──> events::EventBus ──> subscribers / rpc
//! ```

pub mod camera;
pub mod core;
pub mod events;
pub mod interaction;
pub mod loading;
pub mod mesh;
pub mod point_cloud;
pub mod point_set;
pub mod scene;
pub mod settings;
pub mod spatial;
pub mod systems;
