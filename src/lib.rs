//! Interaction layer for a 3D scene-graph editor viewport.
//!
//! This crate turns raw viewport input (pointer, touch, keyboard, drag-drop,
//! gizmo and camera-control notifications) into mutations of a scene graph.
//! Every mutation a user can make goes through a reversible [`command::Command`]
//! recorded on an undo/redo [`history::History`]. The host owns rendering and
//! UI; it feeds [`input::InputEvent`]s in and receives [`engine::Action`]s back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`scene`] | Scene graph model: nodes, transforms, geometry, cameras, helpers |
//! | [`camera`] | Perspective camera, ray construction, focus and view-cube orbit |
//! | [`hit`] | Ray casting and visibility-aware hit-testing |
//! | [`listener`] | Listener registry over heterogeneous event targets |
//! | [`input`] | Input event vocabulary and the pointer gesture state |
//! | [`selection`] | Selection/hover state and click/hover resolution |
//! | [`command`] | Reversible scene commands |
//! | [`history`] | Undo/redo stack |
//! | [`transform`] | Transform-drag coordinator |
//! | [`shortcut`] | Keyboard and gesture dispatch rules |
//! | [`config`] | Event configuration with documented defaults |
//! | [`throttle`] | Instance-scoped throttle used by hover evaluation |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod command;
pub mod config;
pub mod consts;
pub mod engine;
pub mod history;
pub mod hit;
pub mod input;
pub mod listener;
pub mod scene;
pub mod selection;
pub mod shortcut;
pub mod throttle;
pub mod transform;
