//! Filter normalizers shared by searchable entities.

pub mod normalizers;

pub use normalizers::*;
