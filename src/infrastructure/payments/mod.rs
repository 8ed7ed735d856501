mod razorpay;
mod stripe;

pub use razorpay::RazorpayGateway;
pub use stripe::StripeGateway;
