//! Stage mode state machine.
//!
//! A stage is in one of four modes, selected by the pre-stage and
//! follower-stage flags:
//!
//! | Mode        | pre   | follower | inputs     | outputs    |
//! |-------------|-------|----------|------------|------------|
//! | Single      | false | false    | Vi         | Vo         |
//! | Pre         | true  | false    | Vi         | Va, Ri     |
//! | Follower    | false | true     | Va, Ri     | Vo         |
//! | PreFollower | true  | true     | Va, Ri     | Va, Ri     |
//!
//! A pre stage skips the output high-pass (it is part of the next stage's
//! RC network) and hands its anode voltage plus its signal-dependent output
//! resistance to the follower. Modes only change through the flag setters.

use std::fmt;

/// Processing mode of a triode stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StageMode {
    /// Stand-alone stage
    #[default]
    Single,
    /// Feeds a following stage
    Pre,
    /// Fed by a previous stage
    Follower,
    /// Link in the middle of a cascade
    PreFollower,
}

impl StageMode {
    /// Select the mode for a pair of flags.
    pub const fn from_flags(pre_stage: bool, follower_stage: bool) -> Self {
        match (pre_stage, follower_stage) {
            (false, false) => StageMode::Single,
            (true, false) => StageMode::Pre,
            (false, true) => StageMode::Follower,
            (true, true) => StageMode::PreFollower,
        }
    }

    /// Whether the stage feeds a following stage.
    pub const fn is_pre(self) -> bool {
        matches!(self, StageMode::Pre | StageMode::PreFollower)
    }

    /// Whether the stage is fed by a previous stage.
    pub const fn is_follower(self) -> bool {
        matches!(self, StageMode::Follower | StageMode::PreFollower)
    }

    /// Same follower flag, new pre flag.
    pub const fn with_pre(self, pre_stage: bool) -> Self {
        Self::from_flags(pre_stage, self.is_follower())
    }

    /// Same pre flag, new follower flag.
    pub const fn with_follower(self, follower_stage: bool) -> Self {
        Self::from_flags(self.is_pre(), follower_stage)
    }

    /// Number of input ports: Vi, or Va and Ri of the previous stage.
    pub const fn input_ports(self) -> usize {
        if self.is_follower() {
            2
        } else {
            1
        }
    }

    /// Number of output ports: Vo, or Va and Ri for the next stage.
    pub const fn output_ports(self) -> usize {
        if self.is_pre() {
            2
        } else {
            1
        }
    }
}

impl fmt::Display for StageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageMode::Single => "single",
            StageMode::Pre => "pre",
            StageMode::Follower => "follower",
            StageMode::PreFollower => "pre/follower",
        };
        f.write_str(name)
    }
}
