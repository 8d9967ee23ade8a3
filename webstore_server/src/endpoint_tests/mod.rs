mod credits;
mod helpers;
mod mocks;
mod orders;
mod users;
