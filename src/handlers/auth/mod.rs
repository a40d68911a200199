mod login;
mod me;
mod register;

pub use login::login;
pub use me::me;
pub use register::register;
