pub mod bookings;
pub mod cards;
pub mod checkin;
pub mod lostcard;
pub mod offers;
pub mod payments;
pub mod properties;
pub mod reports;
pub mod reservations;
