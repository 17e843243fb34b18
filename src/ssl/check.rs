use chrono::{DateTime, Utc};
use std::borrow::Cow::{self, Borrowed};
use tabled::Tabled;
use x509_parser::pem::parse_x509_pem;

#[derive(Debug, Clone)]
pub struct CertificateInfo {
    subject: String,
    issuer: String,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    days_remaining: i64,
    renew_before_days: i64,
}

impl Tabled for CertificateInfo {
    const LENGTH: usize = 6;
    fn headers() -> Vec<Cow<'static, str>> {
        vec![
            Borrowed("Subject"),
            Borrowed("Issuer"),
            Borrowed("Valid From"),
            Borrowed("Valid To"),
            Borrowed("Days Remaining"),
            Borrowed("Fresh"),
        ]
    }
    fn fields(&self) -> Vec<Cow<'_, str>> {
        let valid_from = self.valid_from.format("%Y-%m-%d %H:%M").to_string();
        let valid_to = self.valid_to.format("%Y-%m-%d %H:%M").to_string();
        vec![
            self.subject.as_str().into(),
            self.issuer.as_str().into(),
            valid_from.into(),
            valid_to.into(),
            self.days_remaining.to_string().into(),
            if self.is_fresh() { "yes" } else { "no" }.into(),
        ]
    }
}

impl CertificateInfo {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn valid_to(&self) -> DateTime<Utc> {
        self.valid_to
    }

    pub fn days_remaining(&self) -> i64 {
        self.days_remaining
    }

    /// Still has at least `renew_before_days` whole days left.
    pub fn is_fresh(&self) -> bool {
        self.days_remaining >= self.renew_before_days
    }

    pub fn need_update(&self) -> bool {
        !self.is_fresh()
    }
}

/// Parse the first certificate of a PEM bundle and measure its remaining
/// validity against `now`.
pub fn parse_certificate(
    pem: &str,
    renew_before_days: i64,
    now: DateTime<Utc>,
) -> crate::Result<CertificateInfo> {
    let (_, pem) = parse_x509_pem(pem.as_bytes())?;
    let (_, cert) = x509_parser::parse_x509_certificate(&pem.contents)?;

    let validity = cert.validity();
    let valid_from = DateTime::from_timestamp(validity.not_before.timestamp(), 0)
        .ok_or("invalid notBefore timestamp")?;
    let valid_to = DateTime::from_timestamp(validity.not_after.timestamp(), 0)
        .ok_or("invalid notAfter timestamp")?;
    let days_remaining = (valid_to - now).num_days();

    Ok(CertificateInfo {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        valid_from,
        valid_to,
        days_remaining,
        renew_before_days,
    })
}
