//! Turns the typed amount plus saved settings into a pay URL
//!
//! Every call re-reads the settings and builds a fresh request; nothing is
//! cached between generations.

use chrono::{DateTime, Utc};
use rand::Rng;
use url::Url;

use crate::amount::{format_two_decimals, parse_amount};
use crate::request::{build_pay_url, pay_base_url, reference, transaction_id, PaymentRequest};
use crate::settings::SettingsStore;
use crate::{Error, Result};

/// Builds payment requests against one settings repository and pay page
#[derive(Debug)]
pub struct Generator<S> {
    store: S,
    base: Url,
}

impl<S: SettingsStore> Generator<S> {
    pub fn new(store: S, base: Url) -> Self {
        Self { store, base }
    }

    /// Generator whose pay page is derived from the app page URL
    pub fn for_app_url(store: S, app_url: &str) -> Result<Self> {
        Ok(Self::new(store, pay_base_url(app_url)?))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Validate inputs and build a request stamped with the current time.
    pub fn prepare(&self, amount_text: &str) -> Result<PaymentRequest> {
        self.prepare_at(amount_text, Utc::now(), &mut rand::thread_rng())
    }

    /// Validate inputs and build a request.
    ///
    /// # Errors
    /// `MissingSettings` when no name or IBAN is saved, `InvalidAmount`
    /// when the amount does not parse to a strictly positive number.
    pub fn prepare_at<R: Rng + ?Sized>(
        &self,
        amount_text: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<PaymentRequest> {
        let settings = self.store.load();
        if !settings.is_complete() {
            return Err(Error::MissingSettings);
        }

        let value = parse_amount(amount_text);
        if value <= 0.0 {
            return Err(Error::InvalidAmount(amount_text.to_string()));
        }

        let request = PaymentRequest {
            payer_name: settings.name,
            payer_iban: settings.iban,
            amount: format_two_decimals(value),
            reference: reference(now.date_naive(), rng),
            transaction_id: transaction_id(now, rng),
        };
        tracing::debug!(
            reference = %request.reference,
            amount = %request.amount,
            "payment request prepared"
        );
        Ok(request)
    }

    pub fn pay_url(&self, request: &PaymentRequest) -> Url {
        build_pay_url(&self.base, request)
    }

    /// `prepare` followed by `pay_url`
    pub fn generate(&self, amount_text: &str) -> Result<(PaymentRequest, Url)> {
        let request = self.prepare(amount_text)?;
        let url = self.pay_url(&request);
        Ok((request, url))
    }
}
