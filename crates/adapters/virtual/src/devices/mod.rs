//! Virtual device implementations — document store and servo.
//!
//! Every device is a cheap handle over shared state, so a clone kept by a
//! test observes what the application did with the original.

mod servo;
mod store;

pub use servo::{ServoError, VirtualServo, VirtualServoBank};
pub use store::{VirtualConnection, VirtualStore};

fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
