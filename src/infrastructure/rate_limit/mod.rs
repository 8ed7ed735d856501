mod fixed_window;

pub use fixed_window::FixedWindowLimiter;
