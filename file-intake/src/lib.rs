//! File intake for the developer assistant.
//!
//! Takes files from a drop or a picker, checks them against an
//! [`AcceptList`], and then either decodes each accepted file locally or
//! uploads it to the analysis backend. Every accepted file produces exactly
//! one [`FileOutcome`].

pub mod accept;
pub mod candidate;
pub mod errors;
pub mod intake;

pub use accept::{AcceptList, READ_LOCAL_MAX_BYTES, Rejection, UPLOAD_MAX_BYTES};
pub use candidate::{FileCandidate, FileId, UploadedFile, decode_text, guess_mime};
pub use errors::{IntakeError, IntakeResult, UnknownIntakeMode};
pub use intake::{
    BatchSummary, DEFAULT_CONCURRENCY, FileIntake, FileOutcome, IntakeMode, OutcomePayload,
    READ_FAILED_MESSAGE, UPLOAD_FAILED_MESSAGE,
};
