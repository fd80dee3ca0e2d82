mod price;
mod secret;

pub use price::{Price, PriceConversionError, CURRENCY_CODE, CURRENCY_CODE_LOWER};
pub use secret::Secret;
