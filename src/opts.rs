/// Options that control how a [`crate::Captions`] engine is driven.
///
/// This is *library-level configuration*. Hosts map their own settings into this type so the
/// engine stays reusable from games, players and tests alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opts {
    /// Whether the engine runs in slave mode.
    ///
    /// When enabled:
    /// - The engine never touches a clock; the host advances it with externally sourced time.
    /// - A track's duration is the `end` of its last line.
    ///
    /// When disabled (the default) the engine owns playback through a [`crate::Clock`], and
    /// construction fails without one.
    pub slave: bool,
}

impl Opts {
    /// Options for an engine driven purely by the host.
    pub fn slave() -> Self {
        Self { slave: true }
    }
}
