//! Control transfer requested by Panic- and Fatal-level records

/// Exit status used by Fatal-level records.
pub const FATAL_EXIT_CODE: i32 = 1;

/// The effect a Panic or Fatal record carries once it has been routed.
///
/// [`Logger::emit_terminal`](crate::Logger::emit_terminal) returns it
/// without acting on it; the `panic*` and `fatal*` entry points call
/// [`Termination::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Unwind the calling thread with the formatted message as payload.
    Unwind(String),
    /// Terminate the process with this status.
    Exit(i32),
}

impl Termination {
    /// The effect attached to `level`, if any.
    pub fn for_level(level: super::Level, message: &str) -> Option<Self> {
        match level {
            super::Level::Panic => Some(Termination::Unwind(message.to_string())),
            super::Level::Fatal => Some(Termination::Exit(FATAL_EXIT_CODE)),
            _ => None,
        }
    }

    pub fn execute(self) -> ! {
        match self {
            Termination::Unwind(message) => std::panic::panic_any(message),
            Termination::Exit(code) => std::process::exit(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Level;

    #[test]
    fn test_effect_per_level() {
        assert_eq!(
            Termination::for_level(Level::Panic, "boom"),
            Some(Termination::Unwind("boom".to_string()))
        );
        assert_eq!(
            Termination::for_level(Level::Fatal, "boom"),
            Some(Termination::Exit(1))
        );
        for level in [Level::Debug, Level::Info, Level::Warn, Level::Error] {
            assert_eq!(Termination::for_level(level, "x"), None);
        }
    }

    #[test]
    fn test_unwind_carries_message() {
        let payload = std::panic::catch_unwind(|| {
            Termination::Unwind("disk on fire".to_string()).execute()
        })
        .unwrap_err();
        assert_eq!(payload.downcast_ref::<String>().unwrap(), "disk on fire");
    }
}
