//! Cross-cutting concerns built from hook closures.
//!
//! The decorator itself keeps no state. Every pattern here keeps its state
//! (a cache, a failure counter, an audit log) inside the closures it installs.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    thread,
};

use hitch_core::{Decorator, Function, decorate};
use integration_tests::{
    service::RateService,
    shipping::{MAX_WEIGHT_GRAMS, Parcel, Quote, ShippingError, Zone, shipping_cost},
};

fn parcel(weight_grams: u32) -> Parcel {
    Parcel {
        weight_grams,
        express: false,
    }
}

/// Wraps a method call on a shared service as a plain function.
fn rate_fn(service: Arc<RateService>) -> impl Fn(Parcel, Zone) -> Result<Quote, ShippingError> {
    move |parcel, zone| service.rate(parcel, zone)
}

#[test]
fn undecorated_matches_base() {
    let wrapped = decorate(shipping_cost);

    for (parcel, zone) in [
        (parcel(2500), Zone::Local),
        (parcel(1), Zone::International),
        (parcel(0), Zone::National),
        (parcel(MAX_WEIGHT_GRAMS + 1), Zone::Local),
    ] {
        assert_eq!(wrapped.call((parcel, zone)), shipping_cost(parcel, zone));
    }
}

#[test]
fn validation_rejects_before_the_remote_call() {
    let service = Arc::new(RateService::new());

    let validated = Decorator::new(rate_fn(Arc::clone(&service)))
        .named("rate")
        .on_input(|_, (parcel, zone)| {
            if parcel.weight_grams > MAX_WEIGHT_GRAMS {
                Err(ShippingError::TooHeavy(parcel.weight_grams))
            } else {
                Ok((parcel, zone))
            }
        })
        .build()
        .unwrap();

    assert_eq!(
        validated.call((parcel(45_000), Zone::Local)),
        Err(ShippingError::TooHeavy(45_000))
    );
    assert_eq!(service.requests(), 0);

    assert!(validated.call((parcel(1000), Zone::Local)).is_ok());
    assert_eq!(service.requests(), 1);
}

#[test]
fn express_surcharge_is_an_output_transform() {
    let with_surcharge = Decorator::new(shipping_cost)
        .on_output(|_, quote, _| {
            if quote.express {
                Ok(Quote {
                    cents: quote.cents * 3 / 2,
                    ..quote
                })
            } else {
                Ok(quote)
            }
        })
        .example(
            (parcel(2500), Zone::Local),
            Quote {
                cents: 600,
                express: false,
            },
        )
        .example(
            (
                Parcel {
                    weight_grams: 2500,
                    express: true,
                },
                Zone::Local,
            ),
            Quote {
                cents: 900,
                express: true,
            },
        )
        .build()
        .unwrap();

    let quote = with_surcharge
        .call((
            Parcel {
                weight_grams: 1000,
                express: true,
            },
            Zone::National,
        ))
        .unwrap();
    assert_eq!(quote.cents, 1050);
}

#[test]
fn last_known_rate_is_served_when_the_service_is_down() {
    let service = Arc::new(RateService::new());
    let cache: Arc<Mutex<HashMap<(Parcel, Zone), Quote>>> = Arc::default();

    let cached = Decorator::new(rate_fn(Arc::clone(&service)))
        .on_output({
            let cache = Arc::clone(&cache);
            move |_, quote, &(parcel, zone)| {
                cache.lock().unwrap().insert((parcel, zone), quote);
                Ok(quote)
            }
        })
        .on_error({
            let cache = Arc::clone(&cache);
            move |_, error, &(parcel, zone)| {
                match cache.lock().unwrap().get(&(parcel, zone)) {
                    Some(quote) => Ok(*quote),
                    None => Err(error),
                }
            }
        })
        .build()
        .unwrap();

    let fresh = cached.call((parcel(2500), Zone::Local)).unwrap();

    service.set_offline(true);
    assert_eq!(cached.call((parcel(2500), Zone::Local)), Ok(fresh));
    assert_eq!(
        cached.call((parcel(2500), Zone::National)),
        Err(ShippingError::Unavailable)
    );
    assert_eq!(service.requests(), 3);
}

#[derive(Debug, Default)]
struct Breaker {
    consecutive_failures: u32,
}

const TRIP_AFTER: u32 = 3;

#[test]
fn circuit_breaker_stops_calling_a_failing_service() {
    let service = Arc::new(RateService::new());
    let breaker = Arc::new(Mutex::new(Breaker::default()));

    let guarded = Decorator::new(rate_fn(Arc::clone(&service)))
        .on_input({
            let breaker = Arc::clone(&breaker);
            move |_, args| {
                if breaker.lock().unwrap().consecutive_failures >= TRIP_AFTER {
                    Err(ShippingError::CircuitOpen)
                } else {
                    Ok(args)
                }
            }
        })
        .on_output({
            let breaker = Arc::clone(&breaker);
            move |_, quote, _| {
                breaker.lock().unwrap().consecutive_failures = 0;
                Ok(quote)
            }
        })
        .on_error({
            let breaker = Arc::clone(&breaker);
            move |_, error, _| {
                breaker.lock().unwrap().consecutive_failures += 1;
                Err(error)
            }
        })
        .build()
        .unwrap();

    let args = (parcel(1000), Zone::Local);

    // One failure followed by a success resets the count.
    service.set_offline(true);
    assert_eq!(guarded.call(args), Err(ShippingError::Unavailable));
    service.set_offline(false);
    assert!(guarded.call(args).is_ok());
    assert_eq!(breaker.lock().unwrap().consecutive_failures, 0);

    service.set_offline(true);
    for _ in 0..TRIP_AFTER {
        assert_eq!(guarded.call(args), Err(ShippingError::Unavailable));
    }
    let requests_when_tripped = service.requests();

    // Rejections from the input hook do not reach the service or the error hook.
    assert_eq!(guarded.call(args), Err(ShippingError::CircuitOpen));
    assert_eq!(guarded.call(args), Err(ShippingError::CircuitOpen));
    assert_eq!(service.requests(), requests_when_tripped);
    assert_eq!(breaker.lock().unwrap().consecutive_failures, TRIP_AFTER);
}

#[test]
fn audit_log_records_what_the_base_saw() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let audited = Decorator::new(shipping_cost)
        .on_input(|_, (parcel, zone)| {
            // Parcels are billed in whole 100 g steps.
            let rounded = parcel.weight_grams.div_ceil(100) * 100;
            Ok((
                Parcel {
                    weight_grams: rounded,
                    ..parcel
                },
                zone,
            ))
        })
        .on_output({
            let log = Arc::clone(&log);
            move |_, quote, (parcel, zone)| {
                log.lock()
                    .unwrap()
                    .push(format!("{} g {zone:?}: {}", parcel.weight_grams, quote.cents));
                Ok(quote)
            }
        })
        .build()
        .unwrap();

    audited.call((parcel(1234), Zone::Local)).unwrap();
    audited.call((parcel(0), Zone::Local)).unwrap_err();

    assert_eq!(*log.lock().unwrap(), vec!["1300 g Local: 500".to_string()]);
}

#[test]
fn concurrent_calls_are_independent() {
    let wrapped = Decorator::new(shipping_cost)
        .on_output(|_, quote, _| {
            Ok(Quote {
                cents: quote.cents + 1,
                ..quote
            })
        })
        .build()
        .unwrap();

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (1..=4)
            .map(|kilograms| {
                let wrapped = &wrapped;
                scope.spawn(move || wrapped.call((parcel(kilograms * 1000), Zone::Local)))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap().cents)
            .collect()
    });

    assert_eq!(results, vec![401, 501, 601, 701]);
}
