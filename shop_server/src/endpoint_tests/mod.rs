mod helpers;
mod mocks;

mod cart;
mod misc;
mod orders;
mod payments;
