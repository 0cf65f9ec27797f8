mod listing;
mod root;
mod run;

pub use listing::{demo_records, open_listing, Listing, ListingArgs};
pub use root::{Cli, Commands};
pub use run::RunCommand;
