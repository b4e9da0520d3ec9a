//! Trip organisation: distances, transportation options and costs between
//! two locations, plus booking and cancelling trips.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::indexed;

pub const TRANSPORTATION_TYPES: [&str; 4] = ["car", "bus", "train", "plane"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripBooking {
    pub location1: String,
    pub location2: String,
    pub transportation_type: String,
    pub cost: u32,
    pub date: String,
}

static TRIP_BOOKINGS: Lazy<Mutex<HashMap<String, TripBooking>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn random_transportation(rng: &mut impl Rng) -> Vec<String> {
    let count = rng.gen_range(1..=TRANSPORTATION_TYPES.len());
    TRANSPORTATION_TYPES[..count]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

#[indexed]
/// Find the distance between two locations in kilometers.
pub fn distance_between_two_locations(location1: String, location2: String) -> u32 {
    let _ = (location1, location2);
    rand::thread_rng().gen_range(1..=1000)
}

#[indexed]
/// Provides transportation options between two locations. Possible values are
/// "car", "bus", "train", and "plane".
pub fn types_of_transportation_between_two_locations(
    location1: String,
    location2: String,
) -> Vec<String> {
    let _ = (location1, location2);
    random_transportation(&mut rand::thread_rng())
}

#[indexed]
/// Find the cost of transportation between two locations within the same
/// geographical region, in the given currency (default "$").
pub fn cost_of_transportation_between_two_locations(
    location1: String,
    location2: String,
    transportation_type: String,
    currency: Option<String>,
) -> String {
    let _ = (location1, location2, transportation_type);
    let currency = currency.unwrap_or_else(|| "$".to_string());
    format!("{} {currency}", rand::thread_rng().gen_range(1..=1000))
}

#[indexed]
/// Book a trip between two locations. The date is a string in the format
/// "YYYY-MM-DD HH:MM:SS". Returns the booking information.
pub fn book_trip(
    location1: String,
    location2: String,
    transportation_type: String,
    cost: u32,
    date: String,
) -> String {
    let booking_id = Uuid::new_v4().to_string();
    let summary = format!(
        "Booking ID: {booking_id}\n\
         Location 1: {location1}\n\
         Location 2: {location2}\n\
         Transportation Type: {transportation_type}\n\
         Cost: {cost}"
    );

    let booking = TripBooking {
        location1,
        location2,
        transportation_type,
        cost,
        date,
    };
    TRIP_BOOKINGS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(booking_id, booking);

    summary
}

#[indexed]
/// Cancel a trip by booking ID.
pub fn cancel_trip(booking_id: String) -> String {
    let removed = TRIP_BOOKINGS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&booking_id);
    match removed {
        Some(_) => format!("Booking ID: {booking_id} cancelled."),
        None => format!("Booking ID: {booking_id} not found."),
    }
}
