use url::Url;

use super::{common::DateRange, Query};

/// Query for `GET /api/payments`.
///
/// `populate` asks the backend to embed referenced documents (vehicle,
/// insurance company, issuing employee) instead of returning bare ids.
#[derive(Clone, Debug)]
pub struct PaymentQuery {
    pub range: Option<DateRange>,
    pub populate: bool,
}

impl Default for PaymentQuery {
    fn default() -> Self {
        Self {
            range: None,
            populate: true,
        }
    }
}

impl Query for PaymentQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = match &self.range {
            Some(range) => range.add_to_url(url),
            None => url.clone(),
        };
        if self.populate {
            url.query_pairs_mut().append_pair("populate", "true");
        }
        url
    }
}

impl PaymentQuery {
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_populate(mut self, populate: bool) -> Self {
        self.populate = populate;
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use url::Url;

    use crate::query::{DateRange, PaymentQuery, Query};

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_payment_query() {
        let url = Url::parse("https://erp.example.com/api/payments").unwrap();
        insta::assert_snapshot!(
            PaymentQuery::default().add_to_url(&url).to_string(),
            @"https://erp.example.com/api/payments?populate=true"
        );
        insta::assert_snapshot!(
            PaymentQuery::default().with_range(range()).add_to_url(&url).to_string(),
            @"https://erp.example.com/api/payments?from=2024-01-01&to=2024-01-31&populate=true"
        );
        insta::assert_snapshot!(
            PaymentQuery::default()
                .with_range(range())
                .with_populate(false)
                .add_to_url(&url)
                .to_string(),
            @"https://erp.example.com/api/payments?from=2024-01-01&to=2024-01-31"
        );
    }
}
