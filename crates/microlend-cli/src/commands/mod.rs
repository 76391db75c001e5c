pub mod emi;
pub mod restructure;
pub mod sensitivity;
