pub mod account;
pub mod directory;
pub mod profile;

pub use account::Account;
pub use directory::{AreaRecord, ContactRecord};
pub use profile::Profile;
