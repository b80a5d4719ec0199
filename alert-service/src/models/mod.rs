pub mod alert;

pub use alert::{discount_between, Channel, DeliveryStatus, PriceDropAlert};
