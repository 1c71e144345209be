// Component lifecycle hooks driven by the Application.
//
// Components take &self: the loop is single threaded and cooperative, so
// state lives in Cell/RefCell and a component can be shared with the
// collaborators that call into it (e.g. interval locks).

use core::fmt;

/// Setup ordering tiers. Lower tiers are set up first; ties keep
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SetupPriority {
    /// Bus and power plumbing other components rely on
    Bus = 0,
    Io = 1,
    Hardware = 2,
    Data = 3,
    Processor = 4,
    AfterConnection = 5,
    Late = 6,
}

impl SetupPriority {
    pub const fn name(self) -> &'static str {
        match self {
            SetupPriority::Bus => "bus",
            SetupPriority::Io => "io",
            SetupPriority::Hardware => "hardware",
            SetupPriority::Data => "data",
            SetupPriority::Processor => "processor",
            SetupPriority::AfterConnection => "after_connection",
            SetupPriority::Late => "late",
        }
    }
}

impl fmt::Display for SetupPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait Component {
    /// Short tag used in log lines.
    fn name(&self) -> &'static str;

    fn setup_priority(&self) -> SetupPriority {
        SetupPriority::Data
    }

    /// Runs once, in priority order, before the first tick.
    fn setup(&self) {}

    /// Runs once per main loop pass.
    fn tick(&self) {}

    fn dump_config(&self) {}
}
