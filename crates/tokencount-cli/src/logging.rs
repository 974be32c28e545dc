use stderrlog::Timestamp;

/// Logging setup arg group.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence log messages.
    #[clap(short, long)]
    pub quiet: bool,

    /// Log more (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Timestamp log messages.
    #[clap(short, long)]
    pub ts: bool,
}

impl LogArgs {
    /// The `stderrlog` level for the flags; `-v` counts up from `default`.
    fn level(
        &self,
        default: u8,
    ) -> stderrlog::LogLevelNum {
        match default.saturating_add(self.verbose) {
            0 => stderrlog::LogLevelNum::Off,
            1 => stderrlog::LogLevelNum::Error,
            2 => stderrlog::LogLevelNum::Warn,
            3 => stderrlog::LogLevelNum::Info,
            4 => stderrlog::LogLevelNum::Debug,
            _ => stderrlog::LogLevelNum::Trace,
        }
    }

    /// Install the global logger.
    pub fn setup_logging(
        &self,
        default: u8,
    ) -> Result<(), Box<dyn std::error::Error>> {
        stderrlog::new()
            .quiet(self.quiet)
            .verbosity(self.level(default))
            .timestamp(if self.ts {
                Timestamp::Second
            } else {
                Timestamp::Off
            })
            .init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_args(verbose: u8) -> LogArgs {
        LogArgs {
            quiet: false,
            verbose,
            ts: false,
        }
    }

    #[test]
    fn test_level_counts_up_from_default() {
        assert!(matches!(log_args(0).level(2), stderrlog::LogLevelNum::Warn));
        assert!(matches!(log_args(1).level(2), stderrlog::LogLevelNum::Info));
        assert!(matches!(log_args(2).level(2), stderrlog::LogLevelNum::Debug));
        assert!(matches!(log_args(9).level(2), stderrlog::LogLevelNum::Trace));
        assert!(matches!(log_args(0).level(0), stderrlog::LogLevelNum::Off));
        assert!(matches!(log_args(u8::MAX).level(2), stderrlog::LogLevelNum::Trace));
    }
}
