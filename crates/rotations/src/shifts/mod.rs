//! Shift generation for a single rotation.
//!
//! [`ShiftGenerator`] lays out the rotation's nominal shifts back to back from
//! `starts_at` and hands them out round-robin over the roster. With an active
//! period, each contiguous active window is one shift, owned by the nominal
//! shift that holds the window's last instant. Everything is clipped to the
//! requested window and `ends_at`. Output is produced lazily by [`ShiftIter`]
//! so callers can stop pulling once they have enough.

mod generator;
mod iter;


pub use self::generator::ShiftGenerator;
pub use self::iter::ShiftIter;
