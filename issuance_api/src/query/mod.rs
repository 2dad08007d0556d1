mod common;
pub use self::common::{DateRange, Query};

mod payment;
pub use self::payment::PaymentQuery;
