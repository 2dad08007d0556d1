pub(crate) mod loose;

mod envelope;
pub use self::envelope::{decode_list, Envelope};

mod reference;
pub use self::reference::{Identified, Reference};

mod payment;
pub use self::payment::{Breakdown, Party, PaymentRecord, PricingInput};

mod vehicle;
pub use self::vehicle::VehicleRecord;
