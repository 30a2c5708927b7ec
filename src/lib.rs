pub mod error;
pub mod models;
pub mod scrapers;
pub mod utils;

pub use error::ScrapeError;
pub use models::{BetType, OddsLine};
pub use scrapers::veribet::VeriBetScraper;
pub use utils::diff::{diff_cycles, ChangeReport};
