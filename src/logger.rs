use std::io::Write;

use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

/// Installs the stderr logger. Fails if another logger is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let tag = match record.level() {
                Level::Error => "ERROR",
                Level::Warn => "WARN ",
                Level::Info => "INFO ",
                Level::Debug => "DEBUG",
                Level::Trace => "TRACE",
            };
            let stderr = std::io::stderr();
            let mut handle = stderr.lock();
            let _ = if record.level() >= Level::Debug {
                writeln!(handle, "[{}] {}: {}", tag, record.target(), record.args())
            } else {
                writeln!(handle, "[{}] {}", tag, record.args())
            };
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
