//! Sign-up profile data and the store holding it until the account exists.

pub mod model;
pub mod store;

pub use model::{AccountPatch, Currency, Language, PendingProfileFields, UserAccount, UserAccountDto};
pub use store::{PendingProfileStore, RegistrationState, RegistrationStore};
