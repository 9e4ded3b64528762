//! Candidate extraction: role-marker windows split into names, and case
//! numbers matched over the whole publication

pub mod marker;
pub mod process_number;
pub mod shredder;

pub use marker::{CandidateList, MarkerExtractor, MarkerWindow};
pub use process_number::{extract_process_numbers, find_process_numbers, ProcessMatch, ProcessPattern};
pub use shredder::Shredder;
