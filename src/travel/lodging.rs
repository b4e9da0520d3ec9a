//! Lodging search and bookings.

use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{FunctionSchema, indexed};

pub const POSSIBLE_AMENITIES: [&str; 5] = ["Free WiFi", "Parking", "Breakfast", "Pool", "Gym"];

/// Number of lodgings every location has.
pub const LODGINGS_PER_LOCATION: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FunctionSchema)]
pub struct Lodging {
    /// `LODGE0` .. `LODGE9`
    pub id: String,
    pub name: String,
    pub location: String,
    /// Price per night.
    pub price: f64,
    /// 1.0 to 5.0
    pub rating: f64,
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FunctionSchema)]
pub struct Booking {
    pub id: String,
    pub lodging_id: String,
    pub user_id: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Default)]
struct BookingBook {
    next_id: usize,
    bookings: Vec<Booking>,
}

static BOOKINGS: Lazy<Mutex<BookingBook>> = Lazy::new(|| Mutex::new(BookingBook::default()));

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn generate(rng: &mut impl Rng, location: &str) -> Vec<Lodging> {
    (0..LODGINGS_PER_LOCATION)
        .map(|i| {
            let suffix: String = (0..5).map(|_| char::from(rng.gen_range(b'A'..=b'Z'))).collect();
            let count = rng.gen_range(1..=POSSIBLE_AMENITIES.len());
            Lodging {
                id: format!("LODGE{i}"),
                name: format!("Lodge-{suffix}"),
                location: location.to_string(),
                price: round_to(rng.gen_range(50.0..=200.0), 2),
                rating: round_to(rng.gen_range(1.0..=5.0), 1),
                amenities: POSSIBLE_AMENITIES
                    .choose_multiple(rng, count)
                    .map(|a| a.to_string())
                    .collect(),
            }
        })
        .collect()
}

#[indexed]
/// Returns list of lodging options for a given location, e.g. "London". The
/// response includes hotels, guest houses, B&Bs and hostels.
pub fn get_all_lodgings(location: String) -> Vec<Lodging> {
    generate(&mut rand::thread_rng(), &location)
}

#[indexed]
/// Returns a specific lodging based on its id, e.g. "LODGE0", or nothing if no
/// such lodging exists.
pub fn get_lodging_by_id(lodging_id: String) -> Option<Lodging> {
    // dummy data: every lodging is in London
    get_all_lodgings("London".to_string())
        .into_iter()
        .find(|l| l.id == lodging_id)
}

#[indexed]
/// Filters the list of lodgings by price and returns lodgings in the given
/// price range.
pub fn filter_lodgings_by_price(
    lodgings: Vec<Lodging>,
    min_price: f64,
    max_price: f64,
) -> Vec<Lodging> {
    lodgings
        .into_iter()
        .filter(|l| (min_price..=max_price).contains(&l.price))
        .collect()
}

#[indexed]
/// Filters the list of lodgings by rating and returns lodgings with a rating
/// greater than or equal to the given rating.
pub fn filter_lodgings_by_rating(lodgings: Vec<Lodging>, min_rating: f64) -> Vec<Lodging> {
    lodgings
        .into_iter()
        .filter(|l| l.rating >= min_rating)
        .collect()
}

#[indexed]
/// Filters the list of lodgings by amenities and returns lodgings that offer
/// all the given amenities, e.g. ["Free WiFi", "Parking"].
pub fn filter_lodgings_by_amenities(
    lodgings: Vec<Lodging>,
    amenities: Vec<String>,
) -> Vec<Lodging> {
    lodgings
        .into_iter()
        .filter(|l| amenities.iter().all(|a| l.amenities.contains(a)))
        .collect()
}

#[indexed]
/// Sorts the list of lodgings by price, ascending unless told otherwise.
pub fn sort_lodgings_by_price(
    mut lodgings: Vec<Lodging>,
    ascending: Option<bool>,
) -> Vec<Lodging> {
    if ascending.unwrap_or(true) {
        lodgings.sort_by(|a, b| a.price.total_cmp(&b.price));
    } else {
        lodgings.sort_by(|a, b| b.price.total_cmp(&a.price));
    }
    lodgings
}

#[indexed]
/// Sorts the list of lodgings by rating, descending unless told otherwise.
pub fn sort_lodgings_by_rating(
    mut lodgings: Vec<Lodging>,
    ascending: Option<bool>,
) -> Vec<Lodging> {
    if ascending.unwrap_or(false) {
        lodgings.sort_by(|a, b| a.rating.total_cmp(&b.rating));
    } else {
        lodgings.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    }
    lodgings
}

#[indexed]
/// Creates a booking for a specific lodging. Dates are YYYY-MM-DD.
pub fn book_lodging(
    lodging_id: String,
    user_id: String,
    start_date: String,
    end_date: String,
) -> Booking {
    let mut book = BOOKINGS.lock().unwrap_or_else(PoisonError::into_inner);
    let booking = Booking {
        id: format!("BOOKING{}", book.next_id),
        lodging_id,
        user_id,
        start_date,
        end_date,
    };
    book.next_id += 1;
    book.bookings.push(booking.clone());
    booking
}

#[indexed]
/// Cancels a specific booking, e.g. "BOOKING0". Returns whether the
/// cancellation was successful.
pub fn cancel_booking(booking_id: String) -> bool {
    let mut book = BOOKINGS.lock().unwrap_or_else(PoisonError::into_inner);
    match book.bookings.iter().position(|b| b.id == booking_id) {
        Some(i) => {
            book.bookings.remove(i);
            true
        }
        None => false,
    }
}

#[indexed]
/// Returns all bookings for a specific user, e.g. "USER123".
pub fn get_user_bookings(user_id: String) -> Vec<Booking> {
    BOOKINGS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .bookings
        .iter()
        .filter(|b| b.user_id == user_id)
        .cloned()
        .collect()
}
