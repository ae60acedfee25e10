mod money;

pub mod op;
mod secret;

pub use money::{Money, CURRENCY_CODE};
pub use secret::Secret;
