//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                     |
//! |------|-------------------------------------------------------------|
//! | 0    | Success                                                     |
//! | 2    | Usage or configuration error (bad args, config, stop words) |
//! | 3    | Schema error (a source lacks a key column)                  |
//! | 4    | Input error (unreadable file, malformed CSV, write failure) |

use goldmerge_recon::{ErrorKind, ReconError};

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, invalid config, missing stop-word resource.
pub const EXIT_USAGE: u8 = 2;

/// A source is missing one or more key columns.
pub const EXIT_SCHEMA: u8 = 3;

/// A source or output file could not be read, parsed or written.
pub const EXIT_INPUT: u8 = 4;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err.kind() {
        ErrorKind::Configuration => EXIT_USAGE,
        ErrorKind::Schema => EXIT_SCHEMA,
        ErrorKind::Input => EXIT_INPUT,
    }
}
