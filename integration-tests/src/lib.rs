pub mod shipping {
    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    /// A mock shipping rate calculator, used for integration tests.
    ///
    /// Rates are a flat fee per zone plus a per-kilogram charge.
    pub fn shipping_cost(parcel: Parcel, zone: Zone) -> Result<Quote, ShippingError> {
        if parcel.weight_grams == 0 {
            return Err(ShippingError::EmptyParcel);
        }
        if parcel.weight_grams > MAX_WEIGHT_GRAMS {
            return Err(ShippingError::TooHeavy(parcel.weight_grams));
        }

        let (base, per_kg) = match zone {
            Zone::Local => (300, 100),
            Zone::National => (500, 200),
            Zone::International => (1500, 600),
        };
        let kilograms = parcel.weight_grams.div_ceil(1000);

        Ok(Quote {
            cents: base + per_kg * kilograms,
            express: parcel.express,
        })
    }

    /// The heaviest parcel accepted, in grams.
    pub const MAX_WEIGHT_GRAMS: u32 = 30_000;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Parcel {
        pub weight_grams: u32,
        #[serde(default)]
        pub express: bool,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Zone {
        Local,
        National,
        International,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Quote {
        pub cents: u32,
        pub express: bool,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum ShippingError {
        #[error("parcel has no weight")]
        EmptyParcel,
        #[error("parcel weighs {0} g, over the limit")]
        TooHeavy(u32),
        #[error("rate service unavailable")]
        Unavailable,
        #[error("rate service circuit is open")]
        CircuitOpen,
    }
}

pub mod service {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::shipping::{Parcel, Quote, ShippingError, Zone, shipping_cost};

    /// A remote rate service that can be switched offline.
    ///
    /// Counts every request it receives, so tests can tell when a call was
    /// short-circuited.
    #[derive(Debug, Default)]
    pub struct RateService {
        offline: AtomicBool,
        requests: AtomicUsize,
    }

    impl RateService {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        pub fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        pub fn rate(&self, parcel: Parcel, zone: Zone) -> Result<Quote, ShippingError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(ShippingError::Unavailable);
            }
            shipping_cost(parcel, zone)
        }
    }
}
