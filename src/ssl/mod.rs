mod check;

pub use check::{CertificateInfo, parse_certificate};

#[cfg(test)]
pub(crate) use check::tests;
