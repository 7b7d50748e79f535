//! Process exit codes.

/// Normal completion, including `/?` and dry runs.
pub const SUCCESS: i32 = 0;
/// Duplicate, unknown, or extra argument; invalid environment setting.
pub const ARGUMENT: i32 = 1;
/// The timeout could not be parsed as a date or as a number of seconds.
pub const TIMEOUT_PARSE: i32 = 2;
/// A defect in the program itself (misdeclared flag set).
pub const INTERNAL: i32 = 70;
