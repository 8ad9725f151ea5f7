//! Rule-based scanning primitives for heuristic receipt extraction.

pub mod amounts;
pub mod dates;
pub mod patterns;

pub use amounts::scan_amounts;
pub use dates::scan_receipt_date;
pub use patterns::*;
