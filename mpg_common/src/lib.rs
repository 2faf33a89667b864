pub mod helpers;
mod money;

pub mod op;
mod secret;

pub use money::{
    MoneyConversionError,
    Usd,
    Vnd,
    USD_CURRENCY_CODE,
    VND_CURRENCY_CODE,
    VND_PER_USD,
};
pub use secret::Secret;
