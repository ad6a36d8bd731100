//! Logging setup for stacklint
//!
//! Built on `log` and `env_logger`. Levels are used as follows:
//!
//! - `warn!` - files that could not be analyzed
//! - `info!` - per-file progress
//! - `debug!` - pass entry and finding counts
//! - `trace!` - classifications, scope transitions and pattern hits
//!
//! `RUST_LOG` works as usual and can target a single pass:
//!
//! ```bash
//! RUST_LOG=checks::auto_variables=trace stacklint check src/*.c
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging at Warn. Later calls are no-ops.
pub fn init() {
    init_with_level(LevelFilter::Warn);
}

/// Initialize logging at `level`. Later calls are no-ops.
pub fn init_with_level(level: LevelFilter) {
    INIT.call_once(|| {
        Builder::new()
            .filter_level(level)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{:5}] {} - {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .init();
    });
}

/// Initialize from `RUST_LOG`, defaulting to Warn.
pub fn init_from_env() {
    INIT.call_once(|| {
        Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    });
}

/// Level for a count of `-v` flags
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// `-v` flags win over `RUST_LOG`; without any the environment decides.
pub fn init_for_verbosity(verbose: u8) {
    if verbose == 0 {
        init_from_env();
    } else {
        init_with_level(level_for_verbosity(verbose));
    }
}

/// Test logger; quiet unless `RUST_LOG` is set.
pub fn init_test() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .is_test(true)
        .try_init();
}
