/*!
 * Validation of subtitle documents.
 *
 * - `timecodes`: timing integrity and readability checks, used by `check`
 */

pub mod timecodes;

// Re-export main types
pub use timecodes::{TimecodeIssue, TimecodeReport, TimecodeValidator, TimecodeValidatorConfig};
