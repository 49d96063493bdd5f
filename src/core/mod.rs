//! Platform-independent scene logic.
//!
//! Nothing in here touches the browser: capability probing goes through
//! [`EnvironmentProbe`], side effects are returned as [`Effect`] lists and
//! GPU objects are abstracted behind [`Disposable`]. The wasm front-end wires
//! these pieces to real DOM events and a WebGPU device.

pub mod capability;
pub mod config;
pub mod controller;
pub mod error;
pub mod idle;
pub mod janitor;
pub mod mesh;
pub mod queue;
pub mod render_loop;
pub mod scroll;
pub mod throttle;
pub mod tier;

pub use capability::*;
pub use config::*;
pub use controller::*;
pub use error::*;
pub use idle::*;
pub use janitor::*;
pub use mesh::*;
pub use queue::*;
pub use render_loop::*;
pub use scroll::*;
pub use throttle::*;
pub use tier::*;
