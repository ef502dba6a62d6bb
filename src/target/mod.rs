pub mod cidr;

pub use cidr::{Addresses, CidrBlock};
