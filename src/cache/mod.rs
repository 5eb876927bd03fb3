pub mod expiring;
