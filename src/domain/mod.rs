mod interest_name;
mod user_email;

pub use interest_name::{CareerLink, CompanyName, RoleName};
pub use user_email::UserEmail;
