//! Utility functions and data structures.
//!
//! ## Modules
//!
//! - [`letters`] - Alphagrams and letter statistics
//! - [`letter_bag`] - Tile distribution, point values and draw counts
//! - [`encoding`] - Little-endian integers and the CRC-16 checksum
//! - [`app_data`] - Engine configuration in the app data directory
//! - [`progress`] - Terminal spinners
//!
//! ## Key Functions
//!
//! ```no_run
//! use lexdex::utils::{LetterBag, alphagram};
//!
//! assert_eq!(alphagram("STARE"), "AERST");
//! let bag = LetterBag::default();
//! let draws = bag.num_combinations("AERST");
//! ```

pub mod app_data;
pub mod encoding;
pub mod letter_bag;
pub mod letters;
pub mod progress;

pub use app_data::*;
pub use encoding::*;
pub use letter_bag::*;
pub use letters::*;
pub use progress::Spinner;
