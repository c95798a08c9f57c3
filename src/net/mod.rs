//! Networking (C7, C8, C9, C10): transport, command buffering, server-side
//! snapshot assembly, client-side reconciliation and remote interpolation,
//! and the anti-cheat divergence checks that tie them together.

pub mod anticheat;
pub mod command_buffer;
pub mod interpolation;
pub mod join;
pub mod reconciliation;
pub mod server_state;
pub mod snapshot;
pub mod transport;

pub use command_buffer::CommandBuffer;
pub use interpolation::{RemoteInterpolator, RemoteSnapshot, RenderState};
pub use join::handle_join;
pub use reconciliation::{reconcile, Reconciliation};
pub use server_state::{ClientConnection, ServerState};
pub use snapshot::{build_snapshot, TickVoxelDeltas};
pub use transport::Transport;
