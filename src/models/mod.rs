mod identifier;
mod subscription;
mod user;

pub use identifier::*;
pub use subscription::*;
pub use user::*;
