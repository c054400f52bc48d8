pub mod deliberation;

pub use deliberation::DeliberationService;
