//! NPC mutation surface.

/// Handle to one NPC, implemented by the host's entity layer.
///
/// The scheduler only ever calls these two entry points and never reads
/// NPC state back; everything else about an NPC (sprites, movement,
/// emotes) stays on the host's side of the boundary.
pub trait NpcHandle {
    /// Marks the NPC as sick from `timestamp` (seconds into the round).
    ///
    /// A `death_timestamp` means this sickness will culminate in death at
    /// that time; the host scales the NPC's health decline so it bottoms
    /// out on schedule. `None` is an ordinary sickness the NPC survives.
    fn get_sick(&mut self, timestamp: f32, death_timestamp: Option<f32>);

    /// Kills the NPC.
    fn die(&mut self);
}
