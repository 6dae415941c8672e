//! Error handling and exit codes.

use sheetcalc_core::constants::exit_codes;
use sheetcalc_core::CalcError;

/// Map a configuration error to the appropriate exit code.
pub fn handle_error(err: &CalcError) -> i32 {
    match err {
        CalcError::DependencyCycle(_)
        | CalcError::UnknownDependency { .. }
        | CalcError::Config(_) => exit_codes::ERROR_CONFIG,
    }
}
